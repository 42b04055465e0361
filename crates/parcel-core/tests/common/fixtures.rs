//! Test database and parcel fixtures

use std::path::PathBuf;

use parcel_core::{parcel::timestamp, Parcel, Schema};
use rusqlite::Connection;
use tempfile::TempDir;

/// A file-backed database that lives as long as the fixture
#[allow(dead_code)]
pub struct TestDb {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestDb {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("tracker.db")
    }

    /// Open a fresh connection with the schema in place
    pub fn connect(&self) -> Connection {
        let conn = Connection::open(self.path()).expect("Failed to open test database");
        Schema::initialize(&conn).expect("Failed to initialize schema");
        conn
    }
}

/// In-memory database with the schema in place
#[allow(dead_code)]
pub fn memory_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to open in-memory database");
    Schema::initialize(&conn).expect("Failed to initialize schema");
    conn
}

/// A registered parcel for client 1000 created now
#[allow(dead_code)]
pub fn test_parcel() -> Parcel {
    Parcel::new(1000, "test", timestamp(chrono::Utc::now()))
}
