//! SQLite schema for parcel storage

use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;

/// Schema version for migrations
pub const SCHEMA_VERSION: u32 = 1;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Get the complete schema SQL
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Parcels; AUTOINCREMENT keeps numbers of deleted parcels from being reused
CREATE TABLE IF NOT EXISTS parcel (
    number INTEGER PRIMARY KEY AUTOINCREMENT,
    client INTEGER NOT NULL,
    status TEXT NOT NULL,
    address TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_parcel_client ON parcel(client);
"#
    }

    /// Get migration SQL for a specific version
    pub fn migration(from_version: u32, to_version: u32) -> Option<&'static str> {
        match (from_version, to_version) {
            // (1, 2) => Some("ALTER TABLE parcel ..."),
            _ => None,
        }
    }

    /// Create or migrate the schema on a caller-owned connection
    pub fn initialize(conn: &Connection) -> Result<()> {
        let current_version = Self::version(conn)?.unwrap_or(0);

        if current_version == 0 {
            conn.execute_batch(Self::create_tables())?;
            Self::set_version(conn, SCHEMA_VERSION)?;
            tracing::debug!(version = SCHEMA_VERSION, "created parcel schema");
        } else if current_version < SCHEMA_VERSION {
            for version in current_version..SCHEMA_VERSION {
                if let Some(migration) = Self::migration(version, version + 1) {
                    conn.execute_batch(migration)?;
                }
            }
            Self::set_version(conn, SCHEMA_VERSION)?;
            tracing::info!(
                from = current_version,
                to = SCHEMA_VERSION,
                "migrated parcel schema"
            );
        }

        Ok(())
    }

    /// Recorded schema version, `None` for a fresh database
    pub fn version(conn: &Connection) -> Result<Option<u32>> {
        let has_table: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Ok(None);
        }

        let version = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version)
    }

    fn set_version(conn: &Connection, version: u32) -> Result<()> {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
        Ok(())
    }
}
