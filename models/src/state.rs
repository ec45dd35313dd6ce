use serde::{Deserialize, Serialize};

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Authorization state of a client towards the daemon.
///
/// Derived entirely from the most recent probe; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientState {
    /// No usable scope: the daemon is gone, too old, or never granted one.
    #[default]
    Invalid,
    /// A scope exists but the user has not approved it in the daemon UI yet.
    Pending,
    /// The scope is approved; pool operations are allowed.
    Usable,
}

impl ClientState {
    pub fn is_usable(&self) -> bool {
        matches!(self, ClientState::Usable)
    }
}

impl Display for ClientState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            ClientState::Invalid => "invalid",
            ClientState::Pending => "pending",
            ClientState::Usable => "usable",
        };
        formatter.write_str(name)
    }
}
