//! Session negotiation: version gate, scope handshake and state probe.

use crate::client::DaemonClient;
use crate::error::{DaemonClientError, ErrorKind};

use common::{ErrorLocation, HttpStatusCode};
use models::{ClientState, DaemonVersion, MINIMUM_DAEMON_VERSION, ModelError};

use std::panic::Location;

use log::{debug, info, warn};
use reqwest::Method;
use serde::Deserialize;

const VERSION_ENDPOINT: &str = "version";
const CONNECT_ENDPOINT: &str = "connect";
const POPUP_ENDPOINT: &str = "popup";

const STATUS_SCOPE_PENDING: u16 = 201;
const STATUS_SCOPE_USABLE: u16 = 202;
const STATUS_SCOPE_MISSING: u16 = 403;
const STATUS_NOT_FOUND: u16 = 404;

/// `/version` answers either `{"version": "x.y.z"}` or a bare `"x.y.z"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum VersionPayload {
    Tagged { version: String },
    Bare(String),
}

impl VersionPayload {
    fn into_raw(self) -> String {
        match self {
            VersionPayload::Tagged { version } | VersionPayload::Bare(version) => version,
        }
    }
}

/// Map a `GET /connect` status to a state, or to the error the probe reports.
#[track_caller]
pub(crate) fn classify_probe(status: HttpStatusCode) -> Result<ClientState, DaemonClientError> {
    let location = ErrorLocation::from(Location::caller());

    match status.as_u16() {
        STATUS_SCOPE_USABLE => Ok(ClientState::Usable),
        STATUS_SCOPE_PENDING => Err(DaemonClientError::ScopeUnverified {
            message: String::from(
                "The scope is waiting for approval, please allow it in the daemon window",
            ),
            location,
        }),
        STATUS_SCOPE_MISSING => Err(DaemonClientError::MissingScope {
            message: String::from("No scope exists for this site, connect to the daemon first"),
            location,
        }),
        STATUS_NOT_FOUND => Err(DaemonClientError::DaemonUnavailable {
            message: String::from("The daemon does not serve the connect endpoint"),
            location,
        }),
        _ => Err(DaemonClientError::DaemonError {
            message: format!("Unexpected probe status HTTP {status}"),
            location,
        }),
    }
}

/// State implied by a failed probe. Only an unverified scope keeps a scope alive.
fn state_after_error(error: &DaemonClientError) -> ClientState {
    match error.kind() {
        ErrorKind::ScopeUnverified => ClientState::Pending,
        _ => ClientState::Invalid,
    }
}

impl DaemonClient {
    /// Check that the daemon is recent enough to talk to.
    ///
    /// # Errors
    ///
    /// - [`DaemonClientError::VersionMismatch`] if the daemon reports a version
    ///   below [`MINIMUM_DAEMON_VERSION`] or has no version endpoint (HTTP 404)
    /// - [`DaemonClientError::DaemonError`] for any other failure status or an
    ///   unreadable version
    /// - [`DaemonClientError::DaemonUnavailable`] if the request cannot complete
    ///
    /// Every failure also demotes the state to [`ClientState::Invalid`].
    pub async fn check_version(&self) -> Result<DaemonVersion, DaemonClientError> {
        let result = self.fetch_version().await;
        if let Err(ref error) = result {
            warn!("Daemon version check failed: {error}");
            self.transition(ClientState::Invalid).await;
        }
        result
    }

    async fn fetch_version(&self) -> Result<DaemonVersion, DaemonClientError> {
        let response = self
            .request(Method::GET, VERSION_ENDPOINT)
            .await?
            .send()
            .await?;
        let status = HttpStatusCode::from(response.status().as_u16());
        debug!("GET /{VERSION_ENDPOINT} -> {status}");

        if status.as_u16() == STATUS_NOT_FOUND {
            return Err(DaemonClientError::VersionMismatch {
                message: format!(
                    "The minimum required daemon version is {MINIMUM_DAEMON_VERSION}, please update the daemon"
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !status.is_success() {
            return Err(DaemonClientError::DaemonError {
                message: format!(
                    "HTTP {status} - {}",
                    response.text().await.unwrap_or_default()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let raw = response.json::<VersionPayload>().await?.into_raw();
        let version: DaemonVersion =
            raw.parse()
                .map_err(|e: ModelError| DaemonClientError::DaemonError {
                    message: format!("Unrecognised daemon version {raw:?}: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        if !version.is_compatible() {
            return Err(DaemonClientError::VersionMismatch {
                message: format!(
                    "Daemon version {version} is too old, the minimum required version is {MINIMUM_DAEMON_VERSION}, please update the daemon"
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!("Daemon version {version} is compatible");
        Ok(version)
    }

    /// Probe the authorization state of this client's scope.
    ///
    /// Always records the outcome as the new state: `Usable` on success,
    /// `Pending` alongside [`DaemonClientError::ScopeUnverified`], `Invalid`
    /// alongside every other error.
    pub async fn check(&self) -> Result<ClientState, DaemonClientError> {
        let outcome = self.probe().await;
        let next = match &outcome {
            Ok(state) => *state,
            Err(error) => state_after_error(error),
        };
        self.transition(next).await;
        outcome
    }

    async fn probe(&self) -> Result<ClientState, DaemonClientError> {
        let response = self
            .request(Method::GET, CONNECT_ENDPOINT)
            .await?
            .send()
            .await?;
        let status = HttpStatusCode::from(response.status().as_u16());
        debug!("GET /{CONNECT_ENDPOINT} -> {status}");

        classify_probe(status)
    }

    /// Establish a session and start polling.
    ///
    /// Runs the version gate, probes the current scope and requests a new one
    /// only when the probe leaves the client `Invalid`. A client that is
    /// already `Pending` or `Usable` never re-issues the handshake. Any running
    /// poll loop is replaced by a fresh one.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Version gate errors as in [`check_version`](Self::check_version);
    /// [`DaemonClientError::DaemonUnavailable`] if the handshake fails, in
    /// which case the state is `Invalid` and no poll loop is started.
    pub async fn connect(&self) -> Result<ClientState, DaemonClientError> {
        self.check_version().await?;

        if let Err(error) = self.check().await {
            debug!("Probe before handshake: {error}");
        }

        if self.state().await == ClientState::Invalid {
            self.request_scope().await?;
        }

        self.start_polling();
        Ok(self.state().await)
    }

    async fn request_scope(&self) -> Result<(), DaemonClientError> {
        let result = self.send_scope_request().await;
        match result {
            Ok(()) => {
                info!("Scope requested, waiting for approval in the daemon");
                self.transition(ClientState::Pending).await;
            }
            Err(ref error) => {
                warn!("Scope request failed: {error}");
                self.transition(ClientState::Invalid).await;
            }
        }
        result
    }

    async fn send_scope_request(&self) -> Result<(), DaemonClientError> {
        let options = self.options().await;
        let request = self.request(Method::POST, CONNECT_ENDPOINT).await?;

        let response = request
            .json(&options.scope_request())
            .send()
            .await
            .map_err(|e| DaemonClientError::DaemonUnavailable {
                message: format!("Failed to request a scope: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        let status = HttpStatusCode::from(response.status().as_u16());
        debug!("POST /{CONNECT_ENDPOINT} -> {status}");

        if !status.is_success() {
            return Err(DaemonClientError::DaemonUnavailable {
                message: format!(
                    "The daemon refused the scope request: HTTP {status} - {}",
                    response.text().await.unwrap_or_default()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Push the current name, features and settings to the existing scope.
    ///
    /// This is how an options replacement reaches the daemon without asking
    /// the user to approve a new scope.
    ///
    /// # Errors
    ///
    /// [`DaemonClientError::MissingScope`] (state becomes `Invalid`) when the
    /// daemon has no scope for this client, `DaemonUnavailable` on transport
    /// failure, `DaemonError` for any other status.
    pub async fn update_scope(&self) -> Result<(), DaemonClientError> {
        let options = self.options().await;
        let response = self
            .request(Method::PATCH, CONNECT_ENDPOINT)
            .await?
            .json(&options.scope_update())
            .send()
            .await?;
        let status = HttpStatusCode::from(response.status().as_u16());
        debug!("PATCH /{CONNECT_ENDPOINT} -> {status}");

        if status.as_u16() == STATUS_SCOPE_MISSING {
            self.transition(ClientState::Invalid).await;
            return Err(DaemonClientError::MissingScope {
                message: String::from("No scope exists for this site, connect to the daemon first"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !status.is_success() {
            return Err(DaemonClientError::DaemonError {
                message: format!(
                    "HTTP {status} - {}",
                    response.text().await.unwrap_or_default()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!("Scope updated as {}", options.name());
        Ok(())
    }

    /// Ask the daemon to raise its window, typically so the user can approve
    /// a pending scope.
    pub async fn request_popup(&self) -> Result<(), DaemonClientError> {
        let response = self
            .request(Method::POST, POPUP_ENDPOINT)
            .await?
            .send()
            .await?;
        let status = HttpStatusCode::from(response.status().as_u16());
        debug!("POST /{POPUP_ENDPOINT} -> {status}");

        if !status.is_success() {
            return Err(DaemonClientError::DaemonError {
                message: format!(
                    "HTTP {status} - {}",
                    response.text().await.unwrap_or_default()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
