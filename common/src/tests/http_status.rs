// Unit tests for HttpStatusCode classification

use crate::HttpStatusCode;

/// **VALUE**: Verifies the daemon's probe statuses (201, 202) count as success.
///
/// **WHY THIS MATTERS**: The authorization probe encodes state in 2xx codes.
/// Treating 201/202 as failures would demote every pending or usable scope.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in the success range.
#[test]
fn given_2xx_codes_when_classified_then_success() {
    assert!(HttpStatusCode(200).is_success());
    assert!(HttpStatusCode(201).is_success());
    assert!(HttpStatusCode(202).is_success());
    assert!(HttpStatusCode(299).is_success());
    assert!(!HttpStatusCode(300).is_success());
    assert!(!HttpStatusCode(199).is_success());
}

/// **VALUE**: Verifies 403/404 are client errors and never server errors.
///
/// **WHY THIS MATTERS**: "missing scope" and "daemon absent" are both 4xx and
/// are mapped to distinct error kinds upstream.
///
/// **BUG THIS CATCHES**: Would catch overlapping or swapped ranges.
#[test]
fn given_4xx_and_5xx_codes_when_classified_then_ranges_are_disjoint() {
    assert!(HttpStatusCode(403).is_client_error());
    assert!(HttpStatusCode(404).is_client_error());
    assert!(!HttpStatusCode(404).is_server_error());
    assert!(HttpStatusCode(500).is_server_error());
    assert!(!HttpStatusCode(500).is_client_error());
}

#[test]
fn given_status_code_when_displayed_then_renders_number() {
    assert_eq!(HttpStatusCode::from(418).to_string(), "418");
    assert_eq!(HttpStatusCode::from(418).as_u16(), 418);
}
