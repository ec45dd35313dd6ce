// Unit tests for ErrorLocation capture and formatting

use crate::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies the captured location points at this test file.
///
/// **WHY THIS MATTERS**: Every daemon-client error embeds a location; if capture
/// regresses, logs stop pointing at the failing call site.
///
/// **BUG THIS CATCHES**: Would catch a swapped file/line mapping or a Display
/// format change that drops the brackets.
#[test]
fn given_caller_location_when_formatted_then_shows_file_line_column() {
    // GIVEN: A location captured here
    let location = ErrorLocation::from(Location::caller());

    // WHEN: Formatting it
    let rendered = location.to_string();

    // THEN: It is bracketed and names this file
    assert!(rendered.starts_with('['));
    assert!(rendered.ends_with(']'));
    assert!(rendered.contains("error_location.rs"));
    assert!(location.line > 0);
}
