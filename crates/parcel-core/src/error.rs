//! Error types for parcel-core

use thiserror::Error;

use crate::parcel::{ParcelNumber, ParcelStatus};

/// Result type alias for parcel operations
pub type Result<T> = std::result::Result<T, ParcelError>;

/// Main error type for parcel operations
#[derive(Error, Debug)]
pub enum ParcelError {
    /// No parcel with this number exists
    #[error("Parcel not found: {0}")]
    NotFound(ParcelNumber),

    /// The operation is not allowed in the parcel's current status
    #[error("Invalid state: {0}")]
    InvalidState(#[from] StateError),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying SQLite failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl ParcelError {
    /// Whether this error means the parcel does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ParcelError::NotFound(_))
    }

    /// Whether this error is a status rule violation
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ParcelError::InvalidState(_))
    }
}

/// Status rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Address can only change while the parcel is registered
    #[error("address of parcel {number} cannot change in status {status}")]
    AddressFrozen {
        number: ParcelNumber,
        status: ParcelStatus,
    },

    /// Only registered parcels can be deleted
    #[error("parcel {number} cannot be deleted in status {status}")]
    NotDeletable {
        number: ParcelNumber,
        status: ParcelStatus,
    },

    /// Status transition that skips a step, goes backwards, or leaves a terminal status
    #[error("parcel {number} cannot move from {from} to {to}")]
    IllegalTransition {
        number: ParcelNumber,
        from: ParcelStatus,
        to: ParcelStatus,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}
