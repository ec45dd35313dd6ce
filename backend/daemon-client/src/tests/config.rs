// Unit tests for the client configuration file

use crate::DAEMON_BASE_URL;
use crate::config::ClientConfig;
use crate::error::ConfigError;

use models::{Feature, PingfallSettings};

use std::time::Duration;

/// **VALUE**: Verifies a missing config file yields defaults instead of an error.
///
/// **WHY THIS MATTERS**: First runs have no config. Failing there would force
/// every user through `init` before anything works.
///
/// **BUG THIS CATCHES**: Would catch treating "not found" as a read error.
#[test]
fn given_missing_file_when_loading_then_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let config = ClientConfig::load(dir.path()).unwrap();

    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.api, DAEMON_BASE_URL);
    assert_eq!(config.features, vec![Feature::Basic]);
}

/// **VALUE**: Verifies saved config loads back identically.
///
/// **WHY THIS MATTERS**: `init` writes the file the client later reads; any
/// field lost on the way silently changes the scope presented to the daemon.
///
/// **BUG THIS CATCHES**: Would catch serde attribute mistakes on optional fields.
#[test]
fn given_saved_config_when_loading_then_matches() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig {
        name: String::from("ctf.example.org"),
        origin: Some(String::from("https://ctf.example.org")),
        features: vec![Feature::Basic, Feature::Pingfall],
        pingfall: Some(PingfallSettings {
            fail_status: vec![502],
            drop_unknown: false,
        }),
        ..ClientConfig::default()
    };

    config.save(dir.path()).unwrap();
    let loaded = ClientConfig::load(dir.path()).unwrap();

    assert_eq!(loaded, config);
    assert!(!dir.path().join("client.json.tmp").exists());
}

#[test]
fn given_corrupt_file_when_loading_then_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(ClientConfig::path(dir.path()), "{ not json").unwrap();

    let result = ClientConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies a zero poll interval is rejected.
///
/// **WHY THIS MATTERS**: A zero interval would make the poll loop hammer the
/// daemon as fast as the runtime allows.
///
/// **BUG THIS CATCHES**: Would catch removal of the poll bounds check.
#[test]
fn given_zero_poll_interval_when_validating_then_returns_validation_error() {
    let mut config = ClientConfig::default();
    config.poll.interval_ms = 0;

    let result = config.validate();

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_default_config_when_converted_then_options_and_poll_settings_match() {
    let config = ClientConfig::default();

    let options = config.to_options().unwrap();
    let poll = config.poll_settings();

    assert_eq!(options.name(), "reflector");
    assert_eq!(options.api().as_str(), "http://127.0.0.1:3307/");
    assert_eq!(poll.interval, Duration::from_secs(1));
    assert_eq!(poll.sync_every, 15);
}

#[test]
fn given_pingfall_without_feature_when_converted_then_returns_options_error() {
    let config = ClientConfig {
        pingfall: Some(PingfallSettings::default()),
        ..ClientConfig::default()
    };

    let result = config.to_options();

    assert!(matches!(result, Err(ConfigError::Options { .. })));
}
