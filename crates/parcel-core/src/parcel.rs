//! Parcel record and status lifecycle
//!
//! Status transitions:
//! ```text
//! Registered → Sent → Delivered
//! ```
//!
//! Only forward single steps are allowed. Address changes and deletion are
//! only allowed while a parcel is `Registered`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ParcelError, Result};

/// Store-assigned parcel identifier
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel
pub type ClientId = i64;

/// Lifecycle status of a parcel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParcelStatus {
    /// Accepted, not yet handed to the carrier
    Registered,
    /// In transit
    Sent,
    /// Handed to the recipient
    Delivered,
}

impl ParcelStatus {
    /// All statuses in lifecycle order
    pub const ALL: [ParcelStatus; 3] = [
        ParcelStatus::Registered,
        ParcelStatus::Sent,
        ParcelStatus::Delivered,
    ];

    /// Check if a status transition is valid
    pub fn can_transition_to(&self, target: &ParcelStatus) -> bool {
        self.next().as_ref() == Some(target)
    }

    /// The single status reachable from this one, if any
    pub fn next(&self) -> Option<ParcelStatus> {
        match self {
            ParcelStatus::Registered => Some(ParcelStatus::Sent),
            ParcelStatus::Sent => Some(ParcelStatus::Delivered),
            ParcelStatus::Delivered => None,
        }
    }

    /// The status a parcel must be in to move to this one
    pub fn previous(&self) -> Option<ParcelStatus> {
        match self {
            ParcelStatus::Registered => None,
            ParcelStatus::Sent => Some(ParcelStatus::Registered),
            ParcelStatus::Delivered => Some(ParcelStatus::Sent),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Address and deletion are both frozen once the parcel leaves `Registered`
    pub fn is_mutable(&self) -> bool {
        matches!(self, ParcelStatus::Registered)
    }

    /// Text form used in storage and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelStatus::Registered => "registered",
            ParcelStatus::Sent => "sent",
            ParcelStatus::Delivered => "delivered",
        }
    }
}

impl Default for ParcelStatus {
    fn default() -> Self {
        ParcelStatus::Registered
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status text that names no known status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized parcel status: {0:?}")]
pub struct UnknownStatus(pub String);

impl From<UnknownStatus> for ParcelError {
    fn from(err: UnknownStatus) -> Self {
        ParcelError::Validation(err.to_string())
    }
}

impl FromStr for ParcelStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registered" => Ok(ParcelStatus::Registered),
            "sent" => Ok(ParcelStatus::Sent),
            "delivered" => Ok(ParcelStatus::Delivered),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl ToSql for ParcelStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ParcelStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: UnknownStatus| FromSqlError::Other(Box::new(e)))
    }
}

/// A tracked parcel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Assigned by the store; zero until the parcel has been added
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    pub address: String,
    /// RFC 3339 timestamp, stored verbatim
    pub created_at: String,
}

impl Parcel {
    /// Create an unsaved, registered parcel
    pub fn new(client: ClientId, address: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Create an unsaved, registered parcel stamped with the current UTC time
    pub fn registered_now(client: ClientId, address: impl Into<String>) -> Self {
        Self::new(client, address, timestamp(Utc::now()))
    }

    /// Check the caller-supplied fields before the parcel is stored
    pub fn validate(&self) -> Result<()> {
        validate_address(&self.address)?;

        if self.created_at.trim().is_empty() {
            return Err(ParcelError::Validation("created_at must not be empty".into()));
        }
        DateTime::parse_from_rfc3339(&self.created_at).map_err(|e| {
            ParcelError::Validation(format!(
                "created_at {:?} is not an RFC 3339 timestamp: {}",
                self.created_at, e
            ))
        })?;

        Ok(())
    }
}

impl fmt::Display for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} client={} status={} address={:?} created_at={}",
            self.number, self.client, self.status, self.address, self.created_at
        )
    }
}

/// Format a timestamp the way parcels store it
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn validate_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(ParcelError::Validation("address must not be empty".into()));
    }
    Ok(())
}
