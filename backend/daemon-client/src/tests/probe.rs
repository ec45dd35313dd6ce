// Unit tests for authorization probe classification

use crate::client::classify_probe;
use crate::error::ErrorKind;

use common::HttpStatusCode;
use models::ClientState;

/// **VALUE**: Verifies each documented probe status maps to its state or error.
///
/// **WHY THIS MATTERS**: The whole state machine hangs off this table. A swapped
/// 201/202 would report unapproved scopes as usable.
///
/// **BUG THIS CATCHES**: Would catch any drift from the daemon's status contract.
#[test]
fn given_documented_statuses_when_classified_then_match_contract() {
    assert_eq!(
        classify_probe(HttpStatusCode(202)).unwrap(),
        ClientState::Usable
    );
    assert_eq!(
        classify_probe(HttpStatusCode(201)).unwrap_err().kind(),
        ErrorKind::ScopeUnverified
    );
    assert_eq!(
        classify_probe(HttpStatusCode(403)).unwrap_err().kind(),
        ErrorKind::MissingScope
    );
    assert_eq!(
        classify_probe(HttpStatusCode(404)).unwrap_err().kind(),
        ErrorKind::DaemonUnavailable
    );
}

/// **VALUE**: Verifies a plain 200 is not treated as usable.
///
/// **WHY THIS MATTERS**: Only 202 grants use. A proxy or wrong service answering
/// 200 must not unlock pool operations.
///
/// **BUG THIS CATCHES**: Would catch classifying by `is_success()` alone.
#[test]
fn given_unexpected_status_when_classified_then_daemon_error() {
    assert_eq!(
        classify_probe(HttpStatusCode(200)).unwrap_err().kind(),
        ErrorKind::DaemonError
    );
    assert_eq!(
        classify_probe(HttpStatusCode(500)).unwrap_err().kind(),
        ErrorKind::DaemonError
    );
}
