//! Authorization scope payloads.
//!
//! A scope ties a caller (by name) to permission to create instances. The
//! daemon keys scopes by the request's `Origin` header, so the body carries
//! [`HOST_IN_HEADER`] instead of a host value.

use serde::{Deserialize, Serialize};

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Placeholder telling the daemon to take the host from the request header.
pub const HOST_IN_HEADER: &str = "IN_HEADER";

/// Initial state of a freshly requested scope.
pub const SCOPE_STATE_PENDING: &str = "pending";

/// Capabilities a scope can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Plain WebSocket reflection.
    Basic,
    /// Daemon drops instances whose remote fails latency probes.
    Pingfall,
}

impl Display for Feature {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Feature::Basic => formatter.write_str("basic"),
            Feature::Pingfall => formatter.write_str("pingfall"),
        }
    }
}

/// Sub-configuration for [`Feature::Pingfall`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingfallSettings {
    /// Remote status codes that drop the instance. Empty means any failure status.
    #[serde(default)]
    pub fail_status: Vec<u16>,
    /// Drop the instance when the probe fails without a status (transport error).
    #[serde(default)]
    pub drop_unknown: bool,
}

/// Per-feature settings sent alongside the feature list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pingfall: Option<PingfallSettings>,
}

impl ScopeSettings {
    pub fn is_empty(&self) -> bool {
        self.pingfall.is_none()
    }
}

fn no_settings(settings: &&ScopeSettings) -> bool {
    settings.is_empty()
}

/// Body of `POST /connect`.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeRequest<'a> {
    pub name: &'a str,
    pub features: &'a [Feature],
    pub host: &'static str,
    pub state: &'static str,
    #[serde(skip_serializing_if = "no_settings")]
    pub settings: &'a ScopeSettings,
}

impl<'a> ScopeRequest<'a> {
    pub fn new(name: &'a str, features: &'a [Feature], settings: &'a ScopeSettings) -> Self {
        Self {
            name,
            features,
            host: HOST_IN_HEADER,
            state: SCOPE_STATE_PENDING,
            settings,
        }
    }
}

/// Body of `PATCH /connect`: refreshes name and features of an existing scope.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeUpdate<'a> {
    pub name: &'a str,
    pub features: &'a [Feature],
    #[serde(skip_serializing_if = "no_settings")]
    pub settings: &'a ScopeSettings,
}
