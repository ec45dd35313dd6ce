use crate::helpers::{client_for, count_pool_changes, count_requests, mount_pool, seed_instance};

use daemon_client::ErrorKind;
use models::Instance;

use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REMOTE_A: &str = "wss://ctf.example.org/a";
const REMOTE_B: &str = "wss://ctf.example.org/b";
const LOCAL_A: &str = "127.0.0.1:40001";
const LOCAL_B: &str = "127.0.0.1:40002";

// ============================================================================
// Public API tests for the pool synchronizer
// ============================================================================

// ----------------------------------------------------------------------------
// add()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies `add` caches the daemon's answer, not the request.
///
/// **WHY THIS MATTERS**: Callers ask for `127.0.0.1:0` and need the port the
/// daemon actually bound to connect their WebSocket.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The requested instance is cached instead of the created one
/// - Latency leaks into the creation body
/// - Pool observers are not notified
#[tokio::test]
async fn given_ephemeral_instance_when_adding_then_caches_resolved_local() {
    // GIVEN: A daemon that binds the instance on a concrete port
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pool"))
        .and(body_json(json!({
            "label": "challenge-a",
            "remote": REMOTE_A,
            "local": "127.0.0.1:0"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "label": "challenge-a",
            "remote": REMOTE_A,
            "local": LOCAL_A,
            "latency": 12
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);
    let changes = count_pool_changes(&client);

    // WHEN: Adding an ephemeral instance
    let mut requested = Instance::ephemeral(REMOTE_A).with_label("challenge-a");
    requested.latency = Some(99);
    let created = client.add(requested).await.unwrap();

    // THEN: The resolved instance is returned, cached and announced
    assert_eq!(created.local, LOCAL_A);
    assert_eq!(created.latency, Some(12));
    assert_eq!(client.get(LOCAL_A).await, Some(created));
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

/// **VALUE**: Verifies an `add` racing a `sync` leaves one cache entry per local.
///
/// **WHY THIS MATTERS**: The poll loop syncs on its own schedule. A sync that
/// lands while the creation request is in flight already caches the new
/// instance, and `local` must stay unique in the cache.
///
/// **BUG THIS CATCHES**: Would catch `add` pushing its answer unconditionally,
/// which duplicates the entry and re-notifies observers with that duplicate.
#[tokio::test]
async fn given_sync_completing_during_add_when_both_finish_then_single_entry() {
    // GIVEN: A slow creation and a pool that already reports the new instance
    let server = MockServer::start().await;
    let created = json!({ "remote": REMOTE_A, "local": LOCAL_A });
    Mock::given(method("POST"))
        .and(path("/pool"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(created.clone())
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_pool(&server, json!([created])).await;
    let client = client_for(&server);
    let changes = count_pool_changes(&client);

    // WHEN: A sync completes while the add is still waiting on the daemon
    let (added, synced) = tokio::join!(client.add(Instance::ephemeral(REMOTE_A)), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.sync().await
    });

    // THEN: One entry, announced once by the sync
    assert_eq!(added.unwrap().local, LOCAL_A);
    assert_eq!(synced.unwrap().len(), 1);
    assert_eq!(client.list().await, vec![Instance::new(REMOTE_A, LOCAL_A)]);
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

/// **VALUE**: Verifies `add` is idempotent by remote.
///
/// **WHY THIS MATTERS**: Pages re-run their setup on reload. Each reload would
/// otherwise open another local port to the same remote.
///
/// **BUG THIS CATCHES**: Would catch dedup keyed on `local` instead of `remote`.
#[tokio::test]
async fn given_cached_remote_when_adding_again_then_returns_cached_without_request() {
    // GIVEN: A daemon that answers exactly one creation
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pool"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "remote": REMOTE_A, "local": LOCAL_A })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    // WHEN: Adding the same remote twice with different local requests
    let first = client.add(Instance::ephemeral(REMOTE_A)).await.unwrap();
    let second = client.add(Instance::new(REMOTE_A, LOCAL_B)).await.unwrap();

    // THEN: Both calls yield the first instance
    assert_eq!(first, second);
    assert_eq!(client.list().await.len(), 1);
}

#[tokio::test]
async fn given_daemon_rejects_when_adding_then_daemon_error_and_cache_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(409).set_body_string("address in use"))
        .mount(&server)
        .await;
    let client = client_for(&server);
    let changes = count_pool_changes(&client);

    let error = client.add(Instance::new(REMOTE_A, LOCAL_A)).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::DaemonError);
    assert!(error.message().contains("address in use"));
    assert!(client.list().await.is_empty());
    assert_eq!(changes.load(Ordering::SeqCst), 0);
}

// ----------------------------------------------------------------------------
// sync()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies a sync with different keys replaces the cache and fires once.
///
/// **WHY THIS MATTERS**: Instances created or removed from the daemon window
/// must show up in the page, and exactly one re-render should follow.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The fetched pool is merged into the cache instead of replacing it
/// - Observers fire per instance
#[tokio::test]
async fn given_different_pool_when_syncing_then_replaces_cache_and_notifies_once() {
    // GIVEN: A cache holding B while the daemon holds A
    let server = MockServer::start().await;
    let client = client_for(&server);
    seed_instance(&client, &server, json!({ "remote": REMOTE_B, "local": LOCAL_B })).await;
    mount_pool(&server, json!([{ "remote": REMOTE_A, "local": LOCAL_A }])).await;
    let changes = count_pool_changes(&client);

    // WHEN: Syncing
    let fetched = client.sync().await.unwrap();

    // THEN: The cache mirrors the daemon and observers fired once
    assert_eq!(fetched, vec![Instance::new(REMOTE_A, LOCAL_A)]);
    assert_eq!(client.list().await, fetched);
    assert_eq!(client.get(LOCAL_B).await, None);
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

/// **VALUE**: Verifies a latency-only change updates the cache silently.
///
/// **WHY THIS MATTERS**: Latency moves on every daemon probe. Treating it as a
/// pool change would notify observers on every sync.
///
/// **BUG THIS CATCHES**: Would catch comparing whole instances instead of keys,
/// and also skipping the cache swap when keys match.
#[tokio::test]
async fn given_latency_only_change_when_syncing_then_refreshes_without_notifying() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    seed_instance(&client, &server, json!({ "remote": REMOTE_A, "local": LOCAL_A })).await;
    mount_pool(
        &server,
        json!([{ "remote": REMOTE_A, "local": LOCAL_A, "latency": -1 }]),
    )
    .await;
    let changes = count_pool_changes(&client);

    client.sync().await.unwrap();

    let cached = client.get(LOCAL_A).await.unwrap();
    assert_eq!(cached.latency, Some(-1));
    assert!(!cached.is_usable());
    assert_eq!(changes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_pool_endpoint_failure_when_syncing_then_daemon_error_and_cache_untouched() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    seed_instance(&client, &server, json!({ "remote": REMOTE_A, "local": LOCAL_A })).await;
    Mock::given(method("GET"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let error = client.sync().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::DaemonError);
    assert_eq!(client.list().await, vec![Instance::new(REMOTE_A, LOCAL_A)]);
}

// ----------------------------------------------------------------------------
// delete()
// ----------------------------------------------------------------------------

#[tokio::test]
async fn given_cached_instance_when_deleting_then_removes_and_notifies() {
    // GIVEN: Two cached instances
    let server = MockServer::start().await;
    let client = client_for(&server);
    seed_instance(&client, &server, json!({ "remote": REMOTE_A, "local": LOCAL_A })).await;
    seed_instance(&client, &server, json!({ "remote": REMOTE_B, "local": LOCAL_B })).await;
    Mock::given(method("DELETE"))
        .and(path("/pool"))
        .and(body_json(json!({ "local": LOCAL_A })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let changes = count_pool_changes(&client);

    // WHEN: Deleting A
    client.delete(LOCAL_A).await.unwrap();

    // THEN: Only B remains
    assert_eq!(client.list().await, vec![Instance::new(REMOTE_B, LOCAL_B)]);
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

/// **VALUE**: Verifies a failed delete leaves the cache alone.
///
/// **WHY THIS MATTERS**: Dropping the entry optimistically would hide a tunnel
/// that is still bound on the daemon side.
///
/// **BUG THIS CATCHES**: Would catch removing from the cache before the daemon
/// confirms.
#[tokio::test]
async fn given_daemon_failure_when_deleting_then_daemon_error_and_cache_kept() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    seed_instance(&client, &server, json!({ "remote": REMOTE_A, "local": LOCAL_A })).await;
    Mock::given(method("DELETE"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let changes = count_pool_changes(&client);

    let error = client.delete(LOCAL_A).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::DaemonError);
    assert!(client.get(LOCAL_A).await.is_some());
    assert_eq!(changes.load(Ordering::SeqCst), 0);
}

// ----------------------------------------------------------------------------
// get() / list() / unsubscribe()
// ----------------------------------------------------------------------------

#[tokio::test]
async fn given_cached_pool_when_reading_then_no_requests_are_made() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    seed_instance(&client, &server, json!({ "remote": REMOTE_A, "local": LOCAL_A })).await;
    let before = server.received_requests().await.unwrap_or_default().len();

    let listed = client.list().await;
    let found = client.get(LOCAL_A).await;
    let missing = client.get(LOCAL_B).await;

    assert_eq!(listed.len(), 1);
    assert!(found.is_some());
    assert!(missing.is_none());
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), before);
    assert_eq!(count_requests(&server, "GET", "/pool").await, 0);
}

#[tokio::test]
async fn given_unsubscribed_observer_when_pool_changes_then_not_called() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let changes = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = std::sync::Arc::clone(&changes);
    let id = client.on_instances_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(client.unsubscribe(id));
    seed_instance(&client, &server, json!({ "remote": REMOTE_A, "local": LOCAL_A })).await;

    assert_eq!(changes.load(Ordering::SeqCst), 0);
    assert!(!client.unsubscribe(id));
}
