use crate::ModelError;

use common::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::str::FromStr;

/// Oldest daemon release this client can talk to.
pub const MINIMUM_DAEMON_VERSION: DaemonVersion = DaemonVersion::new(0, 4, 0);

/// Numeric `major.minor.patch` daemon version.
///
/// Parsing accepts a leading `v`, fewer than three components (missing parts
/// are zero) and ignores pre-release or build suffixes, so `"0.4"`,
/// `"v0.4.2"` and `"0.5.0-beta.1"` are all valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DaemonVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl DaemonVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn is_compatible(&self) -> bool {
        *self >= MINIMUM_DAEMON_VERSION
    }
}

impl FromStr for DaemonVersion {
    type Err = ModelError;

    #[track_caller]
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let core = trimmed
            .split(['-', '+'])
            .next()
            .unwrap_or_default();

        if core.is_empty() {
            return Err(ModelError::Validation {
                message: format!("Empty daemon version: {raw:?}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut parts = [0u64; 3];
        for (index, component) in core.split('.').enumerate() {
            if index >= parts.len() {
                return Err(ModelError::Validation {
                    message: format!("Too many version components: {raw:?}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            parts[index] = component.parse().map_err(|_| ModelError::Validation {
                message: format!("Invalid version component {component:?} in {raw:?}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl Display for DaemonVersion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
