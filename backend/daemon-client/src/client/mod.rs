//! The daemon client and its shared state.
//!
//! # Shared state
//!
//! A [`DaemonClient`] is a cheap handle around one `Arc`'d inner value. Three
//! pieces of it are mutable and each has exactly one writer:
//!
//! - `state`: written only by [`DaemonClient::transition`]
//! - `instances`: written only by `sync`, `add` and `delete`
//! - `poller`: written only by `start_polling` / `stop_polling`
//!
//! Overlapping operations are not serialized. Each cache write happens under
//! the cache lock in one step, so readers never see a partial pool; two racing
//! `sync` calls resolve last-write-wins.

mod observers;
mod poll;
mod pool;
mod session;

pub use observers::SubscriptionId;
pub use poll::PollSettings;

pub(crate) use observers::ObserverRegistry;
#[cfg(test)]
pub(crate) use pool::pool_differs;
#[cfg(test)]
pub(crate) use session::classify_probe;

use crate::error::DaemonClientError;

use common::ErrorLocation;
use models::{ClientState, Instance, Options};

use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info};
use reqwest::header::ORIGIN;
use reqwest::{Client, Method, RequestBuilder};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

const DEFAULT_TIMEOUT_DURATION: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct DaemonClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    http: Client,
    options: RwLock<Options>,
    state: RwLock<ClientState>,
    instances: RwLock<Vec<Instance>>,
    state_observers: ObserverRegistry<ClientState>,
    pool_observers: ObserverRegistry<[Instance]>,
    poller: Mutex<Option<JoinHandle<()>>>,
    poll_settings: PollSettings,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = poller.take() {
            handle.abort();
        }
    }
}

impl DaemonClient {
    /// Create a client with the default poll cadence.
    ///
    /// The client starts in [`ClientState::Invalid`] with an empty pool and
    /// performs no I/O until [`connect`](Self::connect) or another operation
    /// is called.
    pub fn new(options: Options) -> Result<Self, DaemonClientError> {
        Self::with_poll_settings(options, PollSettings::default())
    }

    #[track_caller]
    pub fn with_poll_settings(
        options: Options,
        poll_settings: PollSettings,
    ) -> Result<Self, DaemonClientError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT_DURATION)
            .build()
            .map_err(|e| DaemonClientError::DaemonUnavailable {
                message: format!("Failed to initialise HTTP transport: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                options: RwLock::new(options),
                state: RwLock::new(ClientState::Invalid),
                instances: RwLock::new(Vec::new()),
                state_observers: ObserverRegistry::new(),
                pool_observers: ObserverRegistry::new(),
                poller: Mutex::new(None),
                poll_settings,
            }),
        })
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    pub async fn state(&self) -> ClientState {
        *self.inner.state.read().await
    }

    pub async fn options(&self) -> Options {
        self.inner.options.read().await.clone()
    }

    /// Replace the options wholesale.
    ///
    /// Takes effect for the next request. The daemon is not told: call
    /// [`connect`](Self::connect) or [`update_scope`](Self::update_scope).
    pub async fn set_options(&self, options: Options) {
        *self.inner.options.write().await = options;
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.inner.poll_settings
    }

    /// Subscribe to state transitions. Fires only when the state actually changes.
    pub fn on_state_change<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(ClientState) + Send + Sync + 'static,
    {
        let id = self
            .inner
            .state_observers
            .subscribe(Arc::new(move |state: &ClientState| observer(*state)));
        debug!(
            "State observer subscribed ({} total)",
            self.inner.state_observers.len()
        );
        id
    }

    /// Subscribe to pool changes. Receives the full pool after the change.
    pub fn on_instances_change<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&[Instance]) + Send + Sync + 'static,
    {
        let id = self.inner.pool_observers.subscribe(Arc::new(observer));
        debug!(
            "Pool observer subscribed ({} total)",
            self.inner.pool_observers.len()
        );
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.state_observers.unsubscribe(id) || self.inner.pool_observers.unsubscribe(id)
    }

    /// The single writer of `state`. Notifies observers only on change.
    pub(crate) async fn transition(&self, next: ClientState) {
        let previous = {
            let mut state = self.inner.state.write().await;
            std::mem::replace(&mut *state, next)
        };

        if previous != next {
            info!("Daemon client state changed: {previous} -> {next}");
            self.inner.state_observers.notify(&next);
        }
    }

    pub(crate) async fn request(
        &self,
        method: Method,
        endpoint: &str,
    ) -> Result<RequestBuilder, DaemonClientError> {
        let options = self.inner.options.read().await;
        let url = options.api().join(endpoint)?;

        let mut request = self.inner.http.request(method, url);
        if let Some(origin) = options.origin() {
            request = request.header(ORIGIN, origin);
        }
        Ok(request)
    }
}
