use reflector::cli::Cli;
use reflector::commands::run;
use reflector::error::CliError;

use daemon_client::ErrorKind;
use daemon_client::config::ClientConfig;

use std::path::Path;

use clap::Parser;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(config_dir: &Path, api: &str, args: &[&str]) -> Cli {
    let config_dir = config_dir.to_string_lossy().into_owned();
    let mut argv = vec!["reflector", "--config-dir", config_dir.as_str(), "--api", api];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("Failed to parse test arguments")
}

async fn usable_daemon() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.4.0" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    server
}

// ----------------------------------------------------------------------------
// init
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies `init` writes overrides and protects an existing file.
///
/// **WHY THIS MATTERS**: A hand-tuned client.json holds the scope name the
/// daemon approved. Silently replacing it would orphan that scope.
///
/// **BUG THIS CATCHES**: Would catch `init` ignoring the existing file or the
/// `--force` flag.
#[tokio::test]
async fn given_existing_config_when_init_without_force_then_refuses() {
    // GIVEN: An empty config directory
    let temp_dir = TempDir::new().unwrap();
    let api = "http://127.0.0.1:4000";

    // WHEN: Initializing twice, then forcing
    run(parse(temp_dir.path(), api, &["init"])).await.unwrap();
    let second = run(parse(temp_dir.path(), api, &["init"])).await;
    let forced = run(parse(temp_dir.path(), api, &["init", "--force"])).await;

    // THEN: Only the unforced rerun fails and the override was persisted
    assert!(matches!(second, Err(CliError::Config { .. })));
    assert!(forced.is_ok());
    let config = ClientConfig::load(temp_dir.path()).unwrap();
    assert_eq!(config.api, api);
}

// ----------------------------------------------------------------------------
// list / add / delete
// ----------------------------------------------------------------------------

#[tokio::test]
async fn given_usable_scope_when_listing_then_syncs_pool() {
    let server = usable_daemon().await;
    Mock::given(method("GET"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "remote": "wss://ctf.example.org/a", "local": "127.0.0.1:40001", "latency": 3 }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    run(parse(temp_dir.path(), &server.uri(), &["list"]))
        .await
        .unwrap();
}

/// **VALUE**: Verifies one-shot commands never request a scope.
///
/// **WHY THIS MATTERS**: Only `watch` stays around long enough to see approval.
/// A scope requested by `add` would sit pending with nobody polling it.
///
/// **BUG THIS CATCHES**: Would catch pool commands calling `connect`.
#[tokio::test]
async fn given_pending_scope_when_adding_then_fails_without_touching_pool() {
    // GIVEN: A daemon whose scope for us awaits approval
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("0.4.0")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/connect"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Adding an instance
    let result = run(parse(
        temp_dir.path(),
        &server.uri(),
        &["add", "--remote", "wss://ctf.example.org/a"],
    ))
    .await;

    // THEN: The scope error surfaces with its kind
    match result {
        Err(CliError::Daemon { kind, .. }) => assert_eq!(kind, ErrorKind::ScopeUnverified),
        other => panic!("Expected a scope error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_remote_already_in_pool_when_adding_then_reuses_instance() {
    let server = usable_daemon().await;
    Mock::given(method("GET"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "remote": "wss://ctf.example.org/a", "local": "127.0.0.1:40001" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pool"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    run(parse(
        temp_dir.path(),
        &server.uri(),
        &["add", "--remote", "wss://ctf.example.org/a"],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn given_usable_scope_when_deleting_then_sends_local_key() {
    let server = usable_daemon().await;
    Mock::given(method("DELETE"))
        .and(path("/pool"))
        .and(body_json(json!({ "local": "127.0.0.1:40001" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    run(parse(
        temp_dir.path(),
        &server.uri(),
        &["delete", "--local", "127.0.0.1:40001"],
    ))
    .await
    .unwrap();
}
