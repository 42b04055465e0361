//! Persistence layer for parcels
//!
//! Provides the SQLite schema bootstrap and the parcel store. Both work on a
//! connection opened and owned by the caller.

mod schema;
mod store;

pub use schema::{Schema, SCHEMA_VERSION};
pub use store::ParcelStore;
