pub mod config;
pub mod daemon_client;

pub use config::ConfigError;
pub use daemon_client::{DaemonClientError, ErrorKind};
