use crate::helpers::{
    client_for, client_with, count_pool_changes, count_requests, mount_pool, mount_probe,
    mount_probe_times, mount_version, polling_every, record_states, request_trail, settle,
    wait_until_stopped,
};

use models::{ClientState, Instance};

use std::sync::atomic::Ordering;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Poll loop behaviour, observed through the requests the daemon receives
// ============================================================================

/// **VALUE**: Verifies the poll loop stops itself once the scope is invalid.
///
/// **WHY THIS MATTERS**: A denied site would otherwise probe the daemon every
/// second forever, flooding its logs.
///
/// **BUG THIS CATCHES**: Would catch a loop that keeps ticking after Invalid.
#[tokio::test]
async fn given_denied_scope_when_polling_then_loop_stops_after_one_probe() {
    // GIVEN: A daemon that accepts the handshake but never knows the scope
    let server = MockServer::start().await;
    mount_version(&server, "0.4.2").await;
    mount_probe(&server, 403).await;
    Mock::given(method("POST"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let client = client_for(&server);

    // WHEN: Connecting and letting several intervals pass
    let state = client.connect().await.unwrap();
    settle(8).await;

    // THEN: One probe from connect, one from the first tick, then silence
    assert_eq!(state, ClientState::Pending);
    assert_eq!(count_requests(&server, "GET", "/connect").await, 2);
    assert_eq!(client.state().await, ClientState::Invalid);
    assert!(!client.is_polling());
}

/// **VALUE**: Verifies a usable scope gets its pool reconciled by the loop.
///
/// **WHY THIS MATTERS**: After approval the page must see existing instances
/// without calling `sync` itself.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Usable ticks never sync
/// - Repeated identical syncs re-notify observers
#[tokio::test]
async fn given_usable_scope_when_polling_then_pool_is_synced() {
    // GIVEN: An approved scope and one instance on the daemon
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe(&server, 202).await;
    mount_pool(
        &server,
        json!([{ "remote": "wss://ctf.example.org/a", "local": "127.0.0.1:40001" }]),
    )
    .await;
    let client = client_for(&server);
    let changes = count_pool_changes(&client);

    // WHEN: Connecting and letting the loop tick a few times
    client.connect().await.unwrap();
    settle(6).await;
    client.stop_polling();

    // THEN: The pool arrived once
    assert!(count_requests(&server, "GET", "/pool").await >= 1);
    assert_eq!(changes.load(Ordering::SeqCst), 1);
    assert_eq!(
        client.list().await,
        vec![Instance::new("wss://ctf.example.org/a", "127.0.0.1:40001")]
    );
}

/// Requests expected from `connect` followed by the given ticks, where each
/// tick is `true` when it reconciles the pool.
fn expected_trail(ticks: &[bool]) -> Vec<String> {
    let mut trail = vec![String::from("/connect")];
    for &syncs in ticks {
        trail.push(String::from("/connect"));
        if syncs {
            trail.push(String::from("/pool"));
        }
    }
    trail
}

/// **VALUE**: Verifies the pool is reconciled on every Nth usable tick, starting
/// with the first.
///
/// **WHY THIS MATTERS**: Syncing every second would hammer the daemon, while a
/// counter that starts late leaves a freshly approved page with an empty pool
/// for a whole period.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The first usable tick does not sync
/// - The counter never wraps, or wraps at the wrong value
#[tokio::test]
async fn given_sync_every_three_when_polling_then_syncs_on_ticks_zero_three_six() {
    // GIVEN: Seven usable ticks after connect, then a revoked scope
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe_times(&server, 202, 8).await;
    mount_probe(&server, 403).await;
    mount_pool(&server, json!([])).await;
    let client = client_with(&server, polling_every(3));

    // WHEN: Connecting and letting the loop run until the scope is gone
    client.connect().await.unwrap();
    wait_until_stopped(&client, 200).await;

    // THEN: Ticks 0, 3 and 6 synced, then the 403 tick ended the loop
    let usable = [true, false, false, true, false, false, true];
    let mut expected = expected_trail(&usable);
    expected.push(String::from("/connect"));
    assert_eq!(request_trail(&server).await, expected);
    assert_eq!(client.state().await, ClientState::Invalid);
}

/// **VALUE**: Verifies pending ticks do not advance the sync counter.
///
/// **WHY THIS MATTERS**: Only time spent usable counts toward the sync period.
/// Counting pending ticks would sync at arbitrary points after re-approval.
///
/// **BUG THIS CATCHES**: Would catch incrementing the counter on every tick
/// instead of on usable ticks only.
#[tokio::test]
async fn given_pending_ticks_between_usable_ticks_when_polling_then_counter_holds() {
    // GIVEN: usable, pending, pending, usable x3, then a revoked scope
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe_times(&server, 202, 2).await;
    mount_probe_times(&server, 201, 2).await;
    mount_probe_times(&server, 202, 3).await;
    mount_probe(&server, 403).await;
    mount_pool(&server, json!([])).await;
    let client = client_with(&server, polling_every(3));
    let states = record_states(&client);

    // WHEN: Connecting and letting the loop run out
    client.connect().await.unwrap();
    wait_until_stopped(&client, 200).await;

    // THEN: Usable ticks 0 and 3 synced; the pending ticks in between did not count
    let ticks = [true, false, false, false, false, true];
    let mut expected = expected_trail(&ticks);
    expected.push(String::from("/connect"));
    assert_eq!(request_trail(&server).await, expected);
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            ClientState::Usable,
            ClientState::Pending,
            ClientState::Usable,
            ClientState::Invalid
        ]
    );
}

/// **VALUE**: Verifies a failed sync demotes the client and stops polling.
///
/// **WHY THIS MATTERS**: A daemon that cannot list its pool is broken; carrying
/// on as Usable would show a stale pool as live.
///
/// **BUG THIS CATCHES**: Would catch a sync failure that is only logged.
#[tokio::test]
async fn given_failing_pool_when_polling_then_invalid_and_stopped() {
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe(&server, 202).await;
    Mock::given(method("GET"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = client_for(&server);
    let states = record_states(&client);

    client.connect().await.unwrap();
    settle(8).await;

    assert_eq!(
        *states.lock().unwrap(),
        vec![ClientState::Usable, ClientState::Invalid]
    );
    assert!(!client.is_polling());
    assert_eq!(count_requests(&server, "GET", "/pool").await, 1);
}

/// **VALUE**: Verifies reconnecting replaces the running loop.
///
/// **WHY THIS MATTERS**: Each orphaned loop doubles the probe rate. Pages that
/// reconnect on focus would pile up loops.
///
/// **BUG THIS CATCHES**: Would catch `start_polling` spawning without aborting
/// the previous task.
#[tokio::test]
async fn given_second_connect_when_stopping_then_no_loop_survives() {
    // GIVEN: A scope pending approval and two connects
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe(&server, 201).await;
    let client = client_for(&server);
    assert_eq!(client.connect().await.unwrap(), ClientState::Pending);
    assert_eq!(client.connect().await.unwrap(), ClientState::Pending);
    assert!(client.is_polling());

    // WHEN: Stopping the one loop the client knows about
    assert!(client.stop_polling());
    settle(2).await;
    let probes = count_requests(&server, "GET", "/connect").await;
    settle(6).await;

    // THEN: Nothing is probing any more
    assert_eq!(count_requests(&server, "GET", "/connect").await, probes);
    assert_eq!(count_requests(&server, "POST", "/connect").await, 0);
}

#[tokio::test]
async fn given_dropped_client_when_waiting_then_loop_ends() {
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe(&server, 201).await;
    let client = client_for(&server);
    client.connect().await.unwrap();
    settle(3).await;

    drop(client);
    settle(2).await;
    let probes = count_requests(&server, "GET", "/connect").await;
    settle(6).await;

    assert!(probes >= 2);
    assert_eq!(count_requests(&server, "GET", "/connect").await, probes);
}
