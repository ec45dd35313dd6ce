use crate::{EPHEMERAL_LOCAL_ADDR, Instance, InstanceRequest};

use serde_json::json;

/// **VALUE**: Verifies daemon pool entries deserialize, ignoring legacy fields.
///
/// **WHY THIS MATTERS**: The daemon still emits deprecated `from`/`to` copies of
/// `local`/`remote`. Rejecting unknown fields would break every sync.
///
/// **BUG THIS CATCHES**: Would catch `deny_unknown_fields` or a field rename.
#[test]
fn given_daemon_pool_entry_when_deserialized_then_reads_core_fields() {
    let value = json!({
        "label": "chall-1",
        "remote": "wss://ctf.example.org/ws/1",
        "local": "127.0.0.1:41234",
        "from": "127.0.0.1:41234",
        "to": "wss://ctf.example.org/ws/1",
        "latency": 12
    });

    let instance: Instance = serde_json::from_value(value).unwrap();

    assert_eq!(instance.label.as_deref(), Some("chall-1"));
    assert_eq!(instance.local, "127.0.0.1:41234");
    assert_eq!(instance.latency, Some(12));
    assert!(instance.is_usable());
}

#[test]
fn given_unusable_latency_when_checked_then_not_usable() {
    let mut instance = Instance::ephemeral("wss://ctf.example.org/ws/2");
    instance.latency = Some(-1);

    assert!(!instance.is_usable());
    assert_eq!(instance.local, EPHEMERAL_LOCAL_ADDR);
}

/// **VALUE**: Verifies creation requests never carry a latency value.
///
/// **WHY THIS MATTERS**: Latency is owned by the daemon. Sending one would let a
/// client overwrite daemon-measured state.
///
/// **BUG THIS CATCHES**: Would catch serializing `Instance` directly as the body.
#[test]
fn given_instance_with_latency_when_building_request_then_latency_omitted() {
    let mut instance = Instance::ephemeral("wss://ctf.example.org/ws/3").with_label("three");
    instance.latency = Some(40);

    let body = serde_json::to_value(InstanceRequest::from(&instance)).unwrap();

    assert_eq!(
        body,
        json!({
            "label": "three",
            "remote": "wss://ctf.example.org/ws/3",
            "local": "127.0.0.1:0"
        })
    );
}
