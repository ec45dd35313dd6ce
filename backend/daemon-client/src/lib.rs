//! Control-plane client for a locally running reflector daemon.
//!
//! [`DaemonClient`] negotiates a session with the daemon (version gate plus
//! scope handshake), tracks its authorization state by polling, and mirrors the
//! daemon's instance pool locally. Callers observe both through subscriber
//! callbacks.

pub mod client;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use client::{DaemonClient, PollSettings, SubscriptionId};
pub use error::{ConfigError, DaemonClientError, ErrorKind};

pub const DAEMON_HOSTNAME: &str = "127.0.0.1";
pub const DAEMON_PORT: u16 = 3307;
pub const DAEMON_BASE_URL: &str =
    const_format::concatcp!("http://", DAEMON_HOSTNAME, ":", DAEMON_PORT);
