//! Parcel Core - Postal parcel tracking
//!
//! This crate provides the core functionality for the parcel tracker:
//!
//! - **Parcel**: Parcel records with a status lifecycle (Registered→Sent→Delivered)
//! - **Persistence**: SQLite schema bootstrap and the parcel store
//! - **Service**: Tracker workflows (register, list, advance status, change address, delete)
//! - **Config**: Database and logging settings loaded from TOML
//!
//! The store never opens connections itself. Callers own the
//! `rusqlite::Connection` and lend it out:
//!
//! ```rust,ignore
//! use parcel_core::{Parcel, ParcelStore, Schema};
//!
//! let conn = rusqlite::Connection::open("tracker.db")?;
//! Schema::initialize(&conn)?;
//!
//! let store = ParcelStore::new(&conn);
//! let number = store.add(&Parcel::registered_now(1000, "Main St 1"))?;
//! store.set_address(number, "Main St 2")?;
//! ```

pub mod config;
pub mod error;
pub mod parcel;
pub mod persistence;
pub mod service;

pub use config::{DatabaseConfig, LoggingConfig, TrackerConfig};
pub use error::{ConfigError, ParcelError, Result, StateError};
pub use parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus, UnknownStatus};
pub use persistence::{ParcelStore, Schema, SCHEMA_VERSION};
pub use service::ParcelService;
