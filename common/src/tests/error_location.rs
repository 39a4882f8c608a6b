use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every error in the workspace carries an ErrorLocation. If capture
/// breaks, spawn and stop failures reported by the bridge lose the position they came from.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` propagation or the field
/// mapping in `ErrorLocation::from()` breaks.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN: Current caller location
    // WHEN: Creating ErrorLocation from caller
    let location = ErrorLocation::from(Location::caller());

    // THEN: Should capture file, line, and column
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert_eq!(location.line, 15, "Should capture correct line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the `[file:line:column]` Display format.
///
/// **WHY THIS MATTERS**: The format is embedded in every error message returned by the
/// HTTP API and written to the log file.
///
/// **BUG THIS CATCHES**: Would catch if the brackets or separators change.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::from(Location::caller());

    // WHEN: Formatting as string
    let formatted = format!("{}", location);

    // THEN: Should produce "[file:line:column]" format
    assert!(formatted.starts_with('['), "Should start with '['");
    assert!(formatted.ends_with(']'), "Should end with ']'");
    assert!(
        formatted.contains("error_location.rs"),
        "Should include filename"
    );
    assert!(
        formatted.ends_with(&format!(":{}:{}]", location.line, location.column)),
        "Should end with line and column"
    );
}

/// **VALUE**: Verifies that `#[track_caller]` propagation gives each call site its own line.
///
/// **BUG THIS CATCHES**: Would catch if helper constructors stop forwarding the caller
/// location, making every error point at the same helper line.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    // GIVEN: A helper function that captures location
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    // WHEN: Capturing location from different call sites
    let loc1 = capture_location();
    let loc2 = capture_location();

    // THEN: Should have same file but sequential line numbers
    assert_eq!(loc1.file, loc2.file, "Should have same file");
    assert_eq!(loc1.line + 1, loc2.line, "Lines should be sequential");
}
