use crate::{Feature, OptionsBuilder, PingfallSettings};

use serde_json::json;

/// **VALUE**: Verifies the basic handshake body is exactly the four protocol fields.
///
/// **WHY THIS MATTERS**: The daemon derives the host from the request header and
/// expects `host: "IN_HEADER"` with `state: "pending"`. Extra or missing keys
/// change how the scope is created.
///
/// **BUG THIS CATCHES**: Would catch a renamed field or settings leaking in as `{}`.
#[test]
fn given_basic_options_when_serializing_scope_request_then_body_matches_protocol() {
    let options = OptionsBuilder::default()
        .with_name("ctf.example.org")
        .with_api("http://127.0.0.1:3307")
        .build()
        .unwrap();

    let body = serde_json::to_value(options.scope_request()).unwrap();

    assert_eq!(
        body,
        json!({
            "name": "ctf.example.org",
            "features": ["basic"],
            "host": "IN_HEADER",
            "state": "pending"
        })
    );
}

#[test]
fn given_pingfall_options_when_serializing_scope_update_then_settings_included() {
    let options = OptionsBuilder::default()
        .with_name("ctf.example.org")
        .with_api("http://127.0.0.1:3307")
        .with_features([Feature::Basic, Feature::Pingfall])
        .with_pingfall(PingfallSettings {
            fail_status: vec![502, 503],
            drop_unknown: true,
        })
        .build()
        .unwrap();

    let body = serde_json::to_value(options.scope_update()).unwrap();

    assert_eq!(
        body,
        json!({
            "name": "ctf.example.org",
            "features": ["basic", "pingfall"],
            "settings": {
                "pingfall": { "fail_status": [502, 503], "drop_unknown": true }
            }
        })
    );
}
