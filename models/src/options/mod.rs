pub mod builder;

use crate::scope::{Feature, ScopeRequest, ScopeSettings, ScopeUpdate};

use url::Url;

/// Client identity and daemon location.
///
/// Immutable by replacement: build a new value with
/// [`OptionsBuilder`](builder::OptionsBuilder) and hand it to the client
/// wholesale. Replacing options never re-runs the handshake on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    name: String,
    api: Url,
    features: Vec<Feature>,
    settings: ScopeSettings,
    origin: Option<String>,
}

impl Options {
    /// Scope name shown in the daemon UI.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Daemon API base URL, always ending in `/`.
    pub fn api(&self) -> &Url {
        &self.api
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn settings(&self) -> &ScopeSettings {
        &self.settings
    }

    /// Value sent as the `Origin` header; the daemon derives the scope from it.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn scope_request(&self) -> ScopeRequest<'_> {
        ScopeRequest::new(&self.name, &self.features, &self.settings)
    }

    pub fn scope_update(&self) -> ScopeUpdate<'_> {
        ScopeUpdate {
            name: &self.name,
            features: &self.features,
            settings: &self.settings,
        }
    }
}
