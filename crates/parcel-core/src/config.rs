//! Configuration for the parcel tracker
//!
//! Settings come from built-in defaults, then an optional TOML file, then the
//! `PARCEL_TRACKER_DB` environment variable. Command-line flags are applied
//! on top by the binary.
//!
//! ```toml
//! [database]
//! path = "/var/lib/parcels/tracker.db"
//! busy_timeout_ms = 5000
//!
//! [logging]
//! filter = "info,parcel_core=debug"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding the database path
pub const DB_ENV_VAR: &str = "PARCEL_TRACKER_DB";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
    /// How long to wait on a locked database before failing
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tracker.db"),
            busy_timeout_ms: 5000,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Default config file location, `<config dir>/parcel-tracker/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parcel-tracker").join("config.toml"))
    }

    /// Resolve configuration from an explicit file, the default file if it
    /// exists, and the environment.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve_with(explicit, std::env::var(DB_ENV_VAR).ok())
    }

    /// Like [`TrackerConfig::resolve`], with the `PARCEL_TRACKER_DB` value passed in
    pub fn resolve_with(
        explicit: Option<&Path>,
        env_db: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "loading default config");
                    Self::load(&path)?
                }
                None => Self::default(),
            },
        };

        if let Some(db) = env_db {
            config.override_database_path(db);
        }

        config.validate()?;
        Ok(config)
    }

    /// Replace the database path when the override is non-empty
    pub fn override_database_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !path.as_os_str().is_empty() {
            self.database.path = path;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("database.path".to_string()));
        }

        if self.database.busy_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange(
                "database.busy_timeout_ms must be positive".to_string(),
            ));
        }

        // SQLite takes the timeout as an i32 of milliseconds
        if self.database.busy_timeout_ms > i32::MAX as u64 {
            return Err(ConfigError::OutOfRange(format!(
                "database.busy_timeout_ms must be at most {}",
                i32::MAX
            )));
        }

        Ok(())
    }
}
