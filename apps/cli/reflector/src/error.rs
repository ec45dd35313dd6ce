use common::ErrorLocation;
use daemon_client::{ConfigError, DaemonClientError, ErrorKind};

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the command-line host.
///
/// Daemon failures keep their kind so the exit log says which of the five
/// failure classes occurred, not just the message.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum CliError {
    /// Error from this App
    #[error("Reflector Error: {message} {location}")]
    Reflector {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration file could not be read, written or validated
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// A daemon operation failed
    #[error("Daemon Error [{kind}]: {message} {location}")]
    Daemon {
        kind: ErrorKind,
        message: String,
        location: ErrorLocation,
    },
}

impl From<DaemonClientError> for CliError {
    fn from(error: DaemonClientError) -> Self {
        CliError::Daemon {
            kind: error.kind(),
            message: error.message().to_string(),
            location: error.location(),
        }
    }
}

impl From<ConfigError> for CliError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        CliError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
