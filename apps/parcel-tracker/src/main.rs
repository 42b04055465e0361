//! Parcel Tracker - command-line front end
//!
//! Owns the SQLite connection, configuration, and logging, and hands the
//! connection to the parcel store for each command.

mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use parcel_core::{ParcelService, ParcelStore, Schema, TrackerConfig};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

/// Track postal parcels from registration to delivery
#[derive(Parser)]
#[command(name = "parcel-tracker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file (overrides config and PARCEL_TRACKER_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: <config dir>/parcel-tracker/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print parcels as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a new parcel
    Register {
        /// Owning client
        #[arg(long)]
        client: i64,

        /// Delivery address
        #[arg(long)]
        address: String,
    },

    /// Show one parcel
    Get {
        number: i64,
    },

    /// List the parcels of a client
    List {
        #[arg(long)]
        client: i64,
    },

    /// Move a parcel to its next status
    NextStatus {
        number: i64,
    },

    /// Set the status of a parcel (registered, sent, delivered)
    SetStatus {
        number: i64,
        status: String,
    },

    /// Change the delivery address of a registered parcel
    SetAddress {
        number: i64,
        address: String,
    },

    /// Delete a registered parcel
    Delete {
        number: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TrackerConfig::resolve(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.override_database_path(db);
    }

    init_logging(&config.logging.filter);

    let conn = Connection::open(&config.database.path)?;
    conn.busy_timeout(config.database.busy_timeout())?;
    Schema::initialize(&conn)?;
    tracing::debug!(path = %config.database.path.display(), "opened parcel database");

    let service = ParcelService::new(ParcelStore::new(&conn));
    commands::run(cli.command, &service, cli.json)
}

/// Log to stderr so command output on stdout stays clean.
/// `RUST_LOG` wins over the configured filter.
fn init_logging(filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}
