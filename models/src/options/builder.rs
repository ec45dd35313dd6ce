use crate::error::model_error::ModelError;
use crate::options::Options;
use crate::scope::{Feature, PingfallSettings, ScopeSettings};

use common::ErrorLocation;

use std::panic::Location;

use url::Url;

/// Builder for validated [`Options`].
#[derive(Debug, Default)]
pub struct OptionsBuilder {
    name: Option<String>,
    api: Option<String>,
    features: Vec<Feature>,
    pingfall: Option<PingfallSettings>,
    origin: Option<String>,
}

impl OptionsBuilder {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = Some(api.into());
        self
    }

    /// Replace the requested feature list.
    pub fn with_features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.features = features.into_iter().collect();
        self
    }

    /// Request one more feature; duplicates are ignored.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
        self
    }

    pub fn with_pingfall(mut self, settings: PingfallSettings) -> Self {
        self.pingfall = Some(settings);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Build the Options with validation.
    ///
    /// An empty feature list defaults to [`Feature::Basic`]. The API URL gains
    /// a trailing `/` so endpoint paths resolve beneath it rather than
    /// replacing its last segment.
    #[track_caller]
    pub fn build(self) -> Result<Options, ModelError> {
        let name = self.name.ok_or_else(|| ModelError::Validation {
            message: String::from("Scope name is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if name.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Scope name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let api = self.api.ok_or_else(|| ModelError::Validation {
            message: String::from("Daemon API URL is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let mut api = Url::parse(&api).map_err(|e| ModelError::Validation {
            message: format!("Invalid daemon API URL {api}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if api.scheme() != "http" && api.scheme() != "https" {
            return Err(ModelError::Validation {
                message: format!("Invalid daemon API URL scheme: {api}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !api.path().ends_with('/') {
            let path = format!("{}/", api.path());
            api.set_path(&path);
        }

        let features = if self.features.is_empty() {
            vec![Feature::Basic]
        } else {
            self.features
        };

        if self.pingfall.is_some() && !features.contains(&Feature::Pingfall) {
            return Err(ModelError::Validation {
                message: String::from("Pingfall settings require the pingfall feature"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(ref origin) = self.origin {
            Url::parse(origin).map_err(|e| ModelError::Validation {
                message: format!("Invalid origin {origin}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        Ok(Options {
            name,
            api,
            features,
            settings: ScopeSettings {
                pingfall: self.pingfall,
            },
            origin: self.origin,
        })
    }
}
