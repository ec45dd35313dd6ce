use crate::helpers::{
    SCOPE_NAME, SITE_ORIGIN, client_for, count_requests, mount_probe, mount_version,
    options_for, record_states,
};

use daemon_client::{DaemonClient, ErrorKind};
use models::{ClientState, DaemonVersion, OptionsBuilder};

use std::net::TcpListener;

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Public API tests for session negotiation
// These test the PUBLIC interface from an external consumer's perspective
// ============================================================================

// ----------------------------------------------------------------------------
// check_version()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies a daemon below the minimum version blocks `connect`.
///
/// **WHY THIS MATTERS**: An old daemon speaks a different scope protocol.
/// Requesting a scope from it could create an entry the user can never approve.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - `connect` skips the version gate
/// - The handshake POST is issued before the gate resolves
/// - Versions are compared as strings
#[tokio::test]
async fn given_old_daemon_when_connecting_then_version_mismatch_without_handshake() {
    // GIVEN: A daemon reporting 0.3.9 as a bare JSON string
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("0.3.9")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server);

    // WHEN: Connecting
    let result = client.connect().await;

    // THEN: VersionMismatch, Invalid, no poll loop, no handshake
    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::VersionMismatch);
    assert!(error.message().contains("0.4.0"));
    assert_eq!(client.state().await, ClientState::Invalid);
    assert!(!client.is_polling());
    assert_eq!(count_requests(&server, "GET", "/connect").await, 0);
}

/// **VALUE**: Verifies a daemon without a version endpoint counts as too old.
///
/// **WHY THIS MATTERS**: Daemons predating version negotiation answer 404 there.
/// Reporting that as "unavailable" would tell users to start a daemon that is
/// already running.
///
/// **BUG THIS CATCHES**: Would catch folding 404 into the generic failure path.
#[tokio::test]
async fn given_missing_version_endpoint_when_checking_then_version_mismatch() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let error = client.check_version().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::VersionMismatch);
}

#[tokio::test]
async fn given_version_endpoint_failure_when_checking_then_daemon_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let error = client.check_version().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::DaemonError);
    assert!(error.message().contains("500"));
}

#[tokio::test]
async fn given_compatible_daemon_when_checking_then_returns_version() {
    let server = MockServer::start().await;
    mount_version(&server, "0.5.1").await;
    let client = client_for(&server);

    let version = client.check_version().await.unwrap();

    assert_eq!(version, DaemonVersion::new(0, 5, 1));
}

/// **VALUE**: Verifies transport failures surface as DaemonUnavailable.
///
/// **WHY THIS MATTERS**: "Daemon not running" is the most common failure and the
/// UI shows a dedicated hint for it. A raw reqwest error would lose that.
///
/// **BUG THIS CATCHES**: Would catch connection errors mapped to DaemonError.
#[tokio::test]
async fn given_no_daemon_listening_when_checking_then_daemon_unavailable() {
    // GIVEN: A port nothing listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let options = OptionsBuilder::default()
        .with_name(SCOPE_NAME)
        .with_api(format!("http://127.0.0.1:{port}"))
        .build()
        .unwrap();
    let client = DaemonClient::new(options).unwrap();

    // WHEN: Checking version and probing
    let version_error = client.check_version().await.unwrap_err();
    let probe_error = client.check().await.unwrap_err();

    // THEN: Both are DaemonUnavailable and the state is Invalid
    assert_eq!(version_error.kind(), ErrorKind::DaemonUnavailable);
    assert_eq!(probe_error.kind(), ErrorKind::DaemonUnavailable);
    assert_eq!(client.state().await, ClientState::Invalid);
}

// ----------------------------------------------------------------------------
// check()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies equal consecutive probes notify state observers once.
///
/// **WHY THIS MATTERS**: The poll loop probes every second. Notifying on every
/// probe would re-render the UI each tick for no change.
///
/// **BUG THIS CATCHES**: Would catch if the transition skips the equality check.
#[tokio::test]
async fn given_usable_scope_when_probed_twice_then_state_observer_fires_once() {
    // GIVEN: A daemon reporting an approved scope
    let server = MockServer::start().await;
    mount_probe(&server, 202).await;
    let client = client_for(&server);
    let states = record_states(&client);

    // WHEN: Probing twice
    assert_eq!(client.check().await.unwrap(), ClientState::Usable);
    assert_eq!(client.check().await.unwrap(), ClientState::Usable);

    // THEN: One notification
    assert_eq!(*states.lock().unwrap(), vec![ClientState::Usable]);
}

/// **VALUE**: Verifies a pending scope sets Pending and reports ScopeUnverified.
///
/// **WHY THIS MATTERS**: This is the signal for the UI to ask the user to
/// approve the site in the daemon window.
///
/// **BUG THIS CATCHES**: Would catch a pending probe demoting to Invalid, which
/// would stop polling before the user gets a chance to approve.
#[tokio::test]
async fn given_pending_scope_when_probed_then_pending_with_scope_unverified() {
    let server = MockServer::start().await;
    mount_probe(&server, 201).await;
    let client = client_for(&server);

    let error = client.check().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ScopeUnverified);
    assert_eq!(client.state().await, ClientState::Pending);
}

#[tokio::test]
async fn given_missing_scope_when_probed_then_invalid_with_missing_scope() {
    let server = MockServer::start().await;
    mount_probe(&server, 202).await;
    let client = client_for(&server);
    client.check().await.unwrap();
    server.reset().await;
    mount_probe(&server, 403).await;

    let error = client.check().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::MissingScope);
    assert_eq!(client.state().await, ClientState::Invalid);
}

#[tokio::test]
async fn given_absent_connect_endpoint_when_probed_then_daemon_unavailable() {
    let server = MockServer::start().await;
    mount_probe(&server, 404).await;
    let client = client_for(&server);

    let error = client.check().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::DaemonUnavailable);
    assert_eq!(client.state().await, ClientState::Invalid);
}

// ----------------------------------------------------------------------------
// connect()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies the handshake body and Origin header sent for a new scope.
///
/// **WHY THIS MATTERS**: The daemon keys scopes by the Origin header and expects
/// `host: "IN_HEADER"`. A host in the body or a missing header creates a scope
/// under the wrong key.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The body fields are renamed or the host is sent in the body
/// - The Origin header is dropped
/// - The client stays Invalid after a successful handshake
#[tokio::test]
async fn given_no_scope_when_connecting_then_requests_pending_scope() {
    // GIVEN: A compatible daemon with no scope for us
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe(&server, 403).await;
    Mock::given(method("POST"))
        .and(path("/connect"))
        .and(header("origin", SITE_ORIGIN))
        .and(body_json(json!({
            "name": SCOPE_NAME,
            "features": ["basic"],
            "host": "IN_HEADER",
            "state": "pending"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = DaemonClient::new(options_for(&server)).unwrap();
    let states = record_states(&client);

    // WHEN: Connecting
    let state = client.connect().await.unwrap();

    // THEN: Pending, polling, and exactly one handshake
    assert_eq!(state, ClientState::Pending);
    assert!(client.is_polling());
    assert!(client.stop_polling());
    assert_eq!(*states.lock().unwrap(), vec![ClientState::Pending]);
}

/// **VALUE**: Verifies connecting while Usable does not re-issue the handshake.
///
/// **WHY THIS MATTERS**: A second scope request for an approved site would put
/// it back in the daemon's approval queue.
///
/// **BUG THIS CATCHES**: Would catch an unconditional POST in `connect`.
#[tokio::test]
async fn given_usable_scope_when_connecting_then_no_handshake() {
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe(&server, 202).await;
    Mock::given(method("POST"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = DaemonClient::new(options_for(&server)).unwrap();

    let first = client.connect().await.unwrap();
    let second = client.connect().await.unwrap();

    assert_eq!(first, ClientState::Usable);
    assert_eq!(second, ClientState::Usable);
    client.stop_polling();
}

/// **VALUE**: Verifies connecting while Pending does not re-issue the handshake.
///
/// **WHY THIS MATTERS**: The scope already sits in the daemon's approval queue.
/// Requesting it again would stack a duplicate prompt in front of the user.
///
/// **BUG THIS CATCHES**: Would catch a handshake guarded by "not Usable" instead
/// of "Invalid".
#[tokio::test]
async fn given_pending_scope_when_connecting_then_no_handshake() {
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe(&server, 201).await;
    Mock::given(method("POST"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = DaemonClient::new(options_for(&server)).unwrap();

    let state = client.connect().await.unwrap();

    assert_eq!(state, ClientState::Pending);
    assert!(client.is_polling());
    client.stop_polling();
}

/// **VALUE**: Verifies a refused handshake fails, demotes to Invalid and does not poll.
///
/// **WHY THIS MATTERS**: Polling a daemon that refused us would spin on 403s and
/// hide the actual failure from the caller.
///
/// **BUG THIS CATCHES**: Would catch starting the poll loop before checking the
/// handshake result.
#[tokio::test]
async fn given_refused_handshake_when_connecting_then_daemon_unavailable_and_not_polling() {
    let server = MockServer::start().await;
    mount_version(&server, "0.4.0").await;
    mount_probe(&server, 403).await;
    Mock::given(method("POST"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let error = client.connect().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::DaemonUnavailable);
    assert_eq!(client.state().await, ClientState::Invalid);
    assert!(!client.is_polling());
}

// ----------------------------------------------------------------------------
// update_scope() / request_popup() / set_options()
// ----------------------------------------------------------------------------

#[tokio::test]
async fn given_replaced_options_when_updating_scope_then_patches_new_name() {
    // GIVEN: A client whose options were replaced after construction
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/connect"))
        .and(body_partial_json(json!({ "name": "renamed.example.org" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);
    let renamed = OptionsBuilder::default()
        .with_name("renamed.example.org")
        .with_api(server.uri())
        .with_origin(SITE_ORIGIN)
        .build()
        .unwrap();

    // WHEN: Replacing options, then pushing them
    client.set_options(renamed.clone()).await;
    assert_eq!(count_requests(&server, "POST", "/connect").await, 0);
    client.update_scope().await.unwrap();

    // THEN: The new options are in effect
    assert_eq!(client.options().await, renamed);
}

#[tokio::test]
async fn given_unknown_scope_when_updating_then_missing_scope() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let error = client.update_scope().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::MissingScope);
    assert_eq!(client.state().await, ClientState::Invalid);
}

#[tokio::test]
async fn given_daemon_when_requesting_popup_then_posts_popup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/popup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    client.request_popup().await.unwrap();
}
