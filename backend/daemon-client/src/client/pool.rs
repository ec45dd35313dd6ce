//! Pool synchronizer: local mirror of the daemon's instance pool.

use crate::client::DaemonClient;
use crate::error::DaemonClientError;

use common::{ErrorLocation, HttpStatusCode};
use models::{Instance, InstanceRequest};

use std::collections::HashSet;
use std::panic::Location;

use log::{debug, info};
use reqwest::{Method, Response};
use serde::Serialize;

const POOL_ENDPOINT: &str = "pool";

#[derive(Serialize)]
struct DeleteRequest<'a> {
    local: &'a str,
}

/// True when some `local` key exists on one side only.
///
/// Non-key fields such as latency are ignored on purpose: a latency-only
/// refresh must not wake pool observers.
pub(crate) fn pool_differs(cached: &[Instance], fetched: &[Instance]) -> bool {
    let cached_keys: HashSet<&str> = cached.iter().map(|i| i.local.as_str()).collect();
    let fetched_keys: HashSet<&str> = fetched.iter().map(|i| i.local.as_str()).collect();
    cached_keys != fetched_keys
}

#[track_caller]
fn pool_request_failed(action: &str, error: reqwest::Error) -> DaemonClientError {
    DaemonClientError::DaemonError {
        message: format!("Failed to {action}: {error}"),
        location: ErrorLocation::from(Location::caller()),
    }
}

async fn ensure_success(action: &str, response: Response) -> Result<Response, DaemonClientError> {
    let status = HttpStatusCode::from(response.status().as_u16());
    if status.is_success() {
        return Ok(response);
    }

    Err(DaemonClientError::DaemonError {
        message: format!(
            "Failed to {action}: HTTP {status} - {}",
            response.text().await.unwrap_or_default()
        ),
        location: ErrorLocation::from(Location::caller()),
    })
}

impl DaemonClient {
    /// Reconcile the local cache with the daemon's pool.
    ///
    /// The fetched pool replaces the cache wholesale. Pool observers fire once
    /// with the new pool only if the set of `local` keys changed.
    ///
    /// # Errors
    ///
    /// [`DaemonClientError::DaemonError`] on any failure; the cache is left
    /// untouched.
    pub async fn sync(&self) -> Result<Vec<Instance>, DaemonClientError> {
        let response = self
            .request(Method::GET, POOL_ENDPOINT)
            .await?
            .send()
            .await
            .map_err(|e| pool_request_failed("sync instances", e))?;
        let response = ensure_success("sync instances", response).await?;
        let fetched: Vec<Instance> = response.json().await?;

        let changed = {
            let mut cache = self.inner.instances.write().await;
            let changed = pool_differs(&cache, &fetched);
            *cache = fetched.clone();
            changed
        };

        if changed {
            info!("Instance pool changed: {} instance(s)", fetched.len());
            self.inner.pool_observers.notify(&fetched);
        } else {
            debug!("Instance pool unchanged: {} instance(s)", fetched.len());
        }

        Ok(fetched)
    }

    /// Ask the daemon to create an instance.
    ///
    /// Idempotent by `remote`: if the cache already holds an instance for the
    /// same remote it is returned without contacting the daemon. Otherwise the
    /// daemon's answer, which carries the resolved `local` address, is cached,
    /// observers are notified and the instance is returned. If a concurrent
    /// `sync` already cached that `local`, the entry is replaced in place and
    /// no second notification fires.
    pub async fn add(&self, instance: Instance) -> Result<Instance, DaemonClientError> {
        let existing = self
            .inner
            .instances
            .read()
            .await
            .iter()
            .find(|cached| cached.remote == instance.remote)
            .cloned();
        if let Some(existing) = existing {
            debug!(
                "Instance for {} already exists on {}",
                existing.remote, existing.local
            );
            return Ok(existing);
        }

        let response = self
            .request(Method::POST, POOL_ENDPOINT)
            .await?
            .json(&InstanceRequest::from(&instance))
            .send()
            .await
            .map_err(|e| pool_request_failed("add instance", e))?;
        let response = ensure_success("add instance", response).await?;
        let created: Instance = response.json().await?;

        // A sync that finished while the POST was in flight may already hold it
        let snapshot = {
            let mut cache = self.inner.instances.write().await;
            match cache.iter_mut().find(|cached| cached.local == created.local) {
                Some(cached) => {
                    *cached = created.clone();
                    None
                }
                None => {
                    cache.push(created.clone());
                    Some(cache.clone())
                }
            }
        };

        match snapshot {
            Some(snapshot) => {
                info!("Instance added: {} -> {}", created.local, created.remote);
                self.inner.pool_observers.notify(&snapshot);
            }
            None => debug!(
                "Instance {} was already synced, cache entry refreshed",
                created.local
            ),
        }
        Ok(created)
    }

    /// Ask the daemon to remove the instance bound to `local`.
    ///
    /// The cache is only touched after the daemon confirms; a failed request
    /// leaves it as it was.
    pub async fn delete(&self, local: &str) -> Result<(), DaemonClientError> {
        let response = self
            .request(Method::DELETE, POOL_ENDPOINT)
            .await?
            .json(&DeleteRequest { local })
            .send()
            .await
            .map_err(|e| pool_request_failed("delete instance", e))?;
        ensure_success("delete instance", response).await?;

        let snapshot = {
            let mut cache = self.inner.instances.write().await;
            cache.retain(|cached| cached.local != local);
            cache.clone()
        };

        info!("Instance deleted: {local}");
        self.inner.pool_observers.notify(&snapshot);
        Ok(())
    }

    /// Cached instance bound to `local`. Never touches the network.
    pub async fn get(&self, local: &str) -> Option<Instance> {
        self.inner
            .instances
            .read()
            .await
            .iter()
            .find(|cached| cached.local == local)
            .cloned()
    }

    /// Cached pool. Never touches the network.
    pub async fn list(&self) -> Vec<Instance> {
        self.inner.instances.read().await.clone()
    }
}
