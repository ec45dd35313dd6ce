use crate::{Feature, ModelError, OptionsBuilder, PingfallSettings};

fn base_builder() -> OptionsBuilder {
    OptionsBuilder::default()
        .with_name("ctf.example.org")
        .with_api("http://127.0.0.1:3307")
}

/// **VALUE**: Verifies that builder validation rejects a missing scope name.
///
/// **WHY THIS MATTERS**: The name is the daemon-side authorization scope key.
/// Without it the daemon would fall back to an anonymous scope the user cannot
/// recognise when approving.
///
/// **BUG THIS CATCHES**: Would catch if required field validation is removed.
#[test]
fn given_missing_name_when_building_then_returns_validation_error() {
    // GIVEN: Builder without a name
    let builder = OptionsBuilder::default().with_api("http://127.0.0.1:3307");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Scope name is required");
        }
    }
}

#[test]
fn given_blank_name_when_building_then_returns_validation_error() {
    let result = OptionsBuilder::default()
        .with_name("   ")
        .with_api("http://127.0.0.1:3307")
        .build();

    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Scope name cannot be empty");
        }
    }
}

/// **VALUE**: Verifies that non-HTTP API URLs are rejected.
///
/// **WHY THIS MATTERS**: The daemon contract is HTTP only. A `ws://` or `file://`
/// base would fail on every call at runtime instead of at construction.
///
/// **BUG THIS CATCHES**: Would catch if the scheme check is dropped.
#[test]
fn given_ws_scheme_when_building_then_returns_validation_error() {
    let result = OptionsBuilder::default()
        .with_name("site")
        .with_api("ws://127.0.0.1:3307")
        .build();

    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert!(message.starts_with("Invalid daemon API URL scheme:"));
        }
    }
}

/// **VALUE**: Verifies the API URL is normalised with a trailing slash.
///
/// **WHY THIS MATTERS**: Endpoints are joined onto the base. Without the slash,
/// `http://host/api` joined with `pool` becomes `http://host/pool`.
///
/// **BUG THIS CATCHES**: Would catch removal of the path normalisation.
#[test]
fn given_api_with_path_when_building_then_path_ends_with_slash() {
    let options = OptionsBuilder::default()
        .with_name("site")
        .with_api("http://127.0.0.1:3307/api")
        .build()
        .unwrap();

    assert_eq!(options.api().as_str(), "http://127.0.0.1:3307/api/");
    assert_eq!(
        options.api().join("pool").unwrap().as_str(),
        "http://127.0.0.1:3307/api/pool"
    );
}

/// **VALUE**: Verifies an empty feature list defaults to basic reflection.
///
/// **WHY THIS MATTERS**: A scope with no features is useless; the daemon's own
/// fallback is basic, and the client should say so explicitly.
///
/// **BUG THIS CATCHES**: Would catch if the default is lost and `[]` is sent.
#[test]
fn given_no_features_when_building_then_defaults_to_basic() {
    let options = base_builder().build().unwrap();

    assert_eq!(options.features(), &[Feature::Basic]);
    assert!(options.settings().is_empty());
    assert!(options.origin().is_none());
}

#[test]
fn given_duplicate_feature_when_building_then_listed_once() {
    let options = base_builder()
        .with_feature(Feature::Basic)
        .with_feature(Feature::Pingfall)
        .with_feature(Feature::Basic)
        .build()
        .unwrap();

    assert_eq!(options.features(), &[Feature::Basic, Feature::Pingfall]);
    assert!(options.has_feature(Feature::Pingfall));
}

/// **VALUE**: Verifies pingfall settings cannot be sent without the feature.
///
/// **WHY THIS MATTERS**: The daemon only honours pingfall settings for scopes
/// that requested the feature; silently sending them would mislead the caller.
///
/// **BUG THIS CATCHES**: Would catch if the cross-field check is removed.
#[test]
fn given_pingfall_settings_without_feature_when_building_then_returns_validation_error() {
    let result = base_builder()
        .with_pingfall(PingfallSettings::default())
        .build();

    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Pingfall settings require the pingfall feature");
        }
    }
}

#[test]
fn given_invalid_origin_when_building_then_returns_validation_error() {
    let result = base_builder().with_origin("not a url").build();

    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert!(message.starts_with("Invalid origin"));
        }
    }
}
