use serde::{Deserialize, Serialize};

/// Bind address asking the daemon to pick a free port.
pub const EPHEMERAL_LOCAL_ADDR: &str = "127.0.0.1:0";

/// Latency sentinel the daemon reports for an unreachable remote.
pub const LATENCY_UNUSABLE: i32 = -1;

/// A tunnel mapping managed by the daemon.
///
/// `local` is the unique key for lookups and deletion. `remote` is the dedup
/// key on creation. `latency` is owned by the daemon and only ever read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub remote: String,
    pub local: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<i32>,
}

impl Instance {
    pub fn new(remote: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            label: None,
            remote: remote.into(),
            local: local.into(),
            latency: None,
        }
    }

    /// Instance bound to [`EPHEMERAL_LOCAL_ADDR`]; the daemon resolves the port.
    pub fn ephemeral(remote: impl Into<String>) -> Self {
        Self::new(remote, EPHEMERAL_LOCAL_ADDR)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// False only when the daemon has marked the remote unreachable.
    pub fn is_usable(&self) -> bool {
        self.latency != Some(LATENCY_UNUSABLE)
    }
}

/// Body of a `POST /pool` creation request.
///
/// Deliberately has no latency field.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    pub remote: &'a str,
    pub local: &'a str,
}

impl<'a> From<&'a Instance> for InstanceRequest<'a> {
    fn from(instance: &'a Instance) -> Self {
        Self {
            label: instance.label.as_deref(),
            remote: &instance.remote,
            local: &instance.local,
        }
    }
}
