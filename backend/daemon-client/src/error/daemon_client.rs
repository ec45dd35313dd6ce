//! Error taxonomy for every daemon-facing operation.
//!
//! Transport and protocol failures are translated into one of five kinds at
//! the HTTP boundary; raw `reqwest` or `serde_json` errors never reach callers.

use common::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;

use serde::Serialize;
use thiserror::Error as ThisError;

/// Machine-readable error kind, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DaemonUnavailable,
    #[serde(rename = "daemon_version_mismatch")]
    VersionMismatch,
    DaemonError,
    ScopeUnverified,
    MissingScope,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DaemonUnavailable => "daemon_unavailable",
            ErrorKind::VersionMismatch => "daemon_version_mismatch",
            ErrorKind::DaemonError => "daemon_error",
            ErrorKind::ScopeUnverified => "scope_unverified",
            ErrorKind::MissingScope => "missing_scope",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, ThisError, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum DaemonClientError {
    /// Transport failure, or the daemon is not there.
    #[error("Daemon Unavailable Error: {message} {location}")]
    DaemonUnavailable {
        message: String,
        location: ErrorLocation,
    },

    /// Daemon is older than the minimum supported version.
    #[error("Version Mismatch Error: {message} {location}")]
    VersionMismatch {
        message: String,
        location: ErrorLocation,
    },

    /// Daemon answered with a status or body this client does not expect.
    #[error("Daemon Error: {message} {location}")]
    DaemonError {
        message: String,
        location: ErrorLocation,
    },

    /// Scope exists but still waits for approval in the daemon UI.
    #[error("Scope Unverified Error: {message} {location}")]
    ScopeUnverified {
        message: String,
        location: ErrorLocation,
    },

    /// No scope exists for this caller; `connect` first.
    #[error("Missing Scope Error: {message} {location}")]
    MissingScope {
        message: String,
        location: ErrorLocation,
    },
}

impl DaemonClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DaemonClientError::DaemonUnavailable { .. } => ErrorKind::DaemonUnavailable,
            DaemonClientError::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            DaemonClientError::DaemonError { .. } => ErrorKind::DaemonError,
            DaemonClientError::ScopeUnverified { .. } => ErrorKind::ScopeUnverified,
            DaemonClientError::MissingScope { .. } => ErrorKind::MissingScope,
        }
    }

    /// Human-readable message, without the location suffix.
    pub fn message(&self) -> &str {
        match self {
            DaemonClientError::DaemonUnavailable { message, .. }
            | DaemonClientError::VersionMismatch { message, .. }
            | DaemonClientError::DaemonError { message, .. }
            | DaemonClientError::ScopeUnverified { message, .. }
            | DaemonClientError::MissingScope { message, .. } => message,
        }
    }

    pub fn location(&self) -> ErrorLocation {
        match self {
            DaemonClientError::DaemonUnavailable { location, .. }
            | DaemonClientError::VersionMismatch { location, .. }
            | DaemonClientError::DaemonError { location, .. }
            | DaemonClientError::ScopeUnverified { location, .. }
            | DaemonClientError::MissingScope { location, .. } => *location,
        }
    }
}

impl From<reqwest::Error> for DaemonClientError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        let location = ErrorLocation::from(Location::caller());

        if error.is_decode() {
            DaemonClientError::DaemonError {
                message: format!("Malformed daemon response: {error}"),
                location,
            }
        } else {
            DaemonClientError::DaemonUnavailable {
                message: format!("Daemon is not reachable: {error}"),
                location,
            }
        }
    }
}

impl From<url::ParseError> for DaemonClientError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        DaemonClientError::DaemonError {
            message: format!("Invalid daemon endpoint: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for DaemonClientError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        DaemonClientError::DaemonError {
            message: format!("Malformed daemon response: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
