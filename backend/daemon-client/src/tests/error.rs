// Unit tests for the daemon client error taxonomy

use crate::error::{DaemonClientError, ErrorKind};

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies errors serialize with their variant name and message.
///
/// **WHY THIS MATTERS**: View layers receive errors as data and branch on the
/// kind. If serialization breaks, the UI can only show an opaque failure.
///
/// **BUG THIS CATCHES**: Would catch removing `Serialize` or changing the tag layout.
#[test]
fn given_daemon_client_error_when_serialized_then_contains_variant_and_message() {
    // GIVEN: A MissingScope error
    let err = DaemonClientError::MissingScope {
        message: String::from("connect first"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Serializing to JSON
    let json = serde_json::to_string(&err).unwrap();

    // THEN: Variant and message are present
    assert!(json.contains("\"type\":\"MissingScope\""));
    assert!(json.contains("connect first"));
}

/// **VALUE**: Verifies kind and display-ready message accessors.
///
/// **WHY THIS MATTERS**: `message()` is shown to users directly; it must not
/// carry the source location that `Display` appends for logs.
///
/// **BUG THIS CATCHES**: Would catch returning the full Display string.
#[test]
fn given_version_mismatch_when_inspected_then_kind_and_message_are_clean() {
    let err = DaemonClientError::VersionMismatch {
        message: String::from("please update the daemon"),
        location: ErrorLocation::from(Location::caller()),
    };

    assert_eq!(err.kind(), ErrorKind::VersionMismatch);
    assert_eq!(err.message(), "please update the daemon");
    assert!(err.to_string().contains("Version Mismatch Error"));
    assert!(err.to_string().contains("error.rs"));
    assert!(err.location().line > 0);
}

#[test]
fn given_error_kinds_when_rendered_then_use_wire_names() {
    assert_eq!(ErrorKind::DaemonUnavailable.to_string(), "daemon_unavailable");
    assert_eq!(ErrorKind::VersionMismatch.to_string(), "daemon_version_mismatch");
    assert_eq!(ErrorKind::DaemonError.to_string(), "daemon_error");
    assert_eq!(ErrorKind::ScopeUnverified.to_string(), "scope_unverified");
    assert_eq!(ErrorKind::MissingScope.to_string(), "missing_scope");
    assert_eq!(
        serde_json::to_string(&ErrorKind::VersionMismatch).unwrap(),
        "\"daemon_version_mismatch\""
    );
}
