// Unit tests for process module private functions
// Integration tests for public API are in integration_tests/launcher/process.rs

use crate::launcher::process::{format_command, with_process};

/// **VALUE**: Tests that `format_command()` renders our own command line.
///
/// **WHY THIS MATTERS**: Orphan matches are logged with this string so an operator can see
/// exactly which command line was about to be stopped.
///
/// **BUG THIS CATCHES**: Would catch if the refresh kind stops requesting command lines.
#[test]
fn given_valid_process_when_format_command_called_then_returns_command_string() {
    // GIVEN: A valid process (using our own PID)
    let our_pid = std::process::id();

    // WHEN: Calling format_command on the process
    let result = with_process(our_pid, format_command);

    // THEN: Should return Some with non-empty command string
    assert!(result.is_some(), "Should find the process");
    assert!(!result.unwrap().is_empty(), "Command string should not be empty");
}

/// **VALUE**: Tests that `with_process()` handles non-existent PIDs.
///
/// **WHY THIS MATTERS**: The script can exit between the status read and the stop request.
///
/// **BUG THIS CATCHES**: Prevents panics when querying processes that already died.
#[test]
fn given_nonexistent_pid_when_with_process_called_then_returns_none() {
    // GIVEN: A PID that doesn't exist
    let fake_pid = u32::MAX;

    // WHEN: Calling with_process with the invalid PID
    let result = with_process(fake_pid, |_| true);

    // THEN: Should return None
    assert!(result.is_none(), "Should return None for non-existent process");
}

/// **VALUE**: Tests that `with_process()` executes the closure for valid PIDs.
#[test]
fn given_valid_pid_when_with_process_called_then_executes_closure() {
    let our_pid = std::process::id();

    let result = with_process(our_pid, |p| p.pid().as_u32());

    assert_eq!(result, Some(our_pid), "Should execute closure with correct process");
}
