//! Domain models for the reflector daemon protocol.
//!
//! Pure data structures shared by the client core and its hosts. Nothing in
//! here performs I/O:
//!
//! - [`Instance`]: one tunnel mapping the daemon manages
//! - [`ClientState`]: the client's view of its authorization scope
//! - [`Options`]: who the client is and which daemon it talks to
//! - [`DaemonVersion`]: version negotiation
//! - [`ScopeRequest`] / [`ScopeUpdate`]: authorization request bodies

pub mod error;
pub mod instance;
pub mod options;
pub mod scope;
pub mod state;
pub mod version;

pub use error::model_error::ModelError;
pub use instance::{EPHEMERAL_LOCAL_ADDR, Instance, InstanceRequest, LATENCY_UNUSABLE};
pub use options::Options;
pub use options::builder::OptionsBuilder;
pub use scope::{Feature, PingfallSettings, ScopeRequest, ScopeSettings, ScopeUpdate};
pub use state::ClientState;
pub use version::{DaemonVersion, MINIMUM_DAEMON_VERSION};

#[cfg(test)]
mod tests;
