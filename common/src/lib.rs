//! Shared plumbing for the reflector workspace.
//!
//! Nothing in here knows about the daemon protocol. It holds the small
//! utilities every other crate leans on:
//!
//! - [`ErrorLocation`]: call-site capture embedded in every error variant
//! - [`HttpStatusCode`]: status classification without pulling in an HTTP stack

pub mod error;
pub mod http_status;

pub use error::error_location::ErrorLocation;
pub use http_status::HttpStatusCode;

#[cfg(test)]
mod tests;
