//! On-disk client configuration.
//!
//! A small JSON file describing which daemon to talk to and how to present
//! this client to it. Hosts load it once and turn it into runtime
//! [`Options`] and [`PollSettings`].

use crate::DAEMON_BASE_URL;
use crate::client::PollSettings;
use crate::error::config::ConfigError;

use common::ErrorLocation;
use models::{Feature, Options, OptionsBuilder, PingfallSettings};

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "client.json";
const CONFIG_DIR_NAME: &str = "reflector";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_sync_every")]
    pub sync_every: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            sync_every: default_sync_every(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Scope name shown in the daemon UI.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_api")]
    pub api: String,

    /// Sent as the `Origin` header so the daemon can key the scope.
    #[serde(default)]
    pub origin: Option<String>,

    #[serde(default = "default_features")]
    pub features: Vec<Feature>,

    #[serde(default)]
    pub pingfall: Option<PingfallSettings>,

    #[serde(default)]
    pub poll: PollConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            name: default_name(),
            api: default_api(),
            origin: None,
            features: default_features(),
            pingfall: None,
            poll: PollConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_name() -> String {
    CONFIG_DIR_NAME.to_string()
}
fn default_api() -> String {
    DAEMON_BASE_URL.to_string()
}
fn default_features() -> Vec<Feature> {
    vec![Feature::Basic]
}
fn default_interval_ms() -> u64 {
    PollSettings::default().interval.as_millis() as u64
}
fn default_sync_every() -> u32 {
    PollSettings::default().sync_every
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ClientConfig {
    /// Platform config directory for this client, e.g. `~/.config/reflector`.
    #[track_caller]
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or_else(|| ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
            })
    }

    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE_NAME)
    }

    /// Load config from {config_dir}/client.json.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::path(config_dir);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: ClientConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/client.json using atomic write.
    ///
    /// Uses temp file + rename so a crash never leaves a half-written file.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = Self::path(config_dir);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// Structural checks only; [`to_options`](Self::to_options) applies the
    /// full option validation on top.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "name cannot be empty".to_string(),
            });
        }

        if !self.api.starts_with("http://") && !self.api.starts_with("https://") {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid API URL format: {}", self.api),
            });
        }

        if self.poll.interval_ms == 0 || self.poll.sync_every == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Poll values must be non-zero (interval_ms={}, sync_every={})",
                    self.poll.interval_ms, self.poll.sync_every
                ),
            });
        }

        Ok(())
    }

    pub fn to_options(&self) -> Result<Options, ConfigError> {
        let mut builder = OptionsBuilder::default()
            .with_name(&self.name)
            .with_api(&self.api)
            .with_features(self.features.iter().copied());

        if let Some(ref origin) = self.origin {
            builder = builder.with_origin(origin);
        }
        if let Some(ref pingfall) = self.pingfall {
            builder = builder.with_pingfall(pingfall.clone());
        }

        Ok(builder.build()?)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll.interval_ms),
            sync_every: self.poll.sync_every,
        }
    }
}
