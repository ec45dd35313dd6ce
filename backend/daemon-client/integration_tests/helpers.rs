//! Test helpers for daemon client integration tests.
//!
//! This module provides utilities for driving a client against a mock daemon:
//! - Building clients with a fast poll cadence
//! - Mounting the common daemon endpoints
//! - Recording observer notifications
//! - Counting requests the daemon received

use daemon_client::{DaemonClient, PollSettings};
use models::{ClientState, Options, OptionsBuilder};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SCOPE_NAME: &str = "ctf.example.org";
pub const SITE_ORIGIN: &str = "https://ctf.example.org";

/// Poll fast enough for tests to observe several ticks quickly.
pub fn fast_polling() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(25),
        sync_every: 1,
    }
}

/// Fast cadence that reconciles the pool on every `sync_every`th usable tick.
pub fn polling_every(sync_every: u32) -> PollSettings {
    PollSettings {
        sync_every,
        ..fast_polling()
    }
}

pub fn options_for(server: &MockServer) -> Options {
    OptionsBuilder::default()
        .with_name(SCOPE_NAME)
        .with_api(server.uri())
        .with_origin(SITE_ORIGIN)
        .build()
        .expect("Failed to build test options")
}

pub fn client_for(server: &MockServer) -> DaemonClient {
    DaemonClient::with_poll_settings(options_for(server), fast_polling())
        .expect("Failed to build test client")
}

pub fn client_with(server: &MockServer, settings: PollSettings) -> DaemonClient {
    DaemonClient::with_poll_settings(options_for(server), settings)
        .expect("Failed to build test client")
}

pub async fn mount_version(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": version })))
        .mount(server)
        .await;
}

pub async fn mount_probe(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Answer the next `times` probes with `status`. Mounted sequences are served
/// in mounting order, each one until exhausted.
pub async fn mount_probe_times(server: &MockServer, status: u16, times: u64) {
    Mock::given(method("GET"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

pub async fn mount_pool(server: &MockServer, pool: Value) {
    Mock::given(method("GET"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool))
        .mount(server)
        .await;
}

/// Add `created` to the client's cache through a one-shot `POST /pool`.
pub async fn seed_instance(client: &DaemonClient, server: &MockServer, created: Value) {
    let _guard = Mock::given(method("POST"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created.clone()))
        .expect(1)
        .mount_as_scoped(server)
        .await;

    let remote = created["remote"].as_str().expect("seed needs a remote");
    let local = created["local"].as_str().expect("seed needs a local");
    client
        .add(models::Instance::new(remote, local))
        .await
        .expect("Failed to seed instance");
}

pub fn record_states(client: &DaemonClient) -> Arc<Mutex<Vec<ClientState>>> {
    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&states);
    client.on_state_change(move |state| sink.lock().unwrap().push(state));
    states
}

pub fn count_pool_changes(client: &DaemonClient) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    client.on_instances_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    calls
}

pub async fn count_requests(server: &MockServer, http_method: &str, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| {
            request.method.as_str() == http_method && request.url.path() == endpoint
        })
        .count()
}

pub async fn settle(ticks: u32) {
    tokio::time::sleep(fast_polling().interval * ticks).await;
}

/// Paths of every `/connect` and `/pool` request, in arrival order.
pub async fn request_trail(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .filter(|endpoint| endpoint == "/connect" || endpoint == "/pool")
        .collect()
}

/// Wait for the poll loop to stop on its own, failing after `max_ticks` intervals.
pub async fn wait_until_stopped(client: &DaemonClient, max_ticks: u32) {
    for _ in 0..max_ticks {
        if !client.is_polling() {
            return;
        }
        settle(1).await;
    }
    panic!("Poll loop still running after {max_ticks} ticks");
}
