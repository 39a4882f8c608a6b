use tracker_core::error::CoreError;
use tracker_core::error::spawn::SpawnError;

use common::ErrorLocation;
use models::TrackerInfoBuilder;

use std::error::Error;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;
use std::path::PathBuf;

/// **VALUE**: Verifies that `SpawnError::ScriptNotFound` shows the path and location.
///
/// **WHY THIS MATTERS**: This message is returned to the browser and logged. Without the path
/// the operator cannot tell which `script_path` the bridge actually tried.
///
/// **BUG THIS CATCHES**: Would catch if the Display format drops the path or the location.
#[test]
fn given_script_not_found_error_when_formatted_then_includes_path_and_location() {
    // GIVEN: A ScriptNotFound error
    let err = SpawnError::ScriptNotFound {
        path: PathBuf::from("/opt/realsense/main_example.py"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Formatting
    let error_string = err.to_string();

    // THEN: Type, path and location are present
    assert!(error_string.contains("Script Not Found Error"));
    assert!(error_string.contains("/opt/realsense/main_example.py"));
    assert!(error_string.contains("spawn.rs"));
}

/// **VALUE**: Verifies that wrapped IO errors stay reachable through `source()`.
///
/// **BUG THIS CATCHES**: Would catch if `#[source]` is removed and the OS error is lost.
#[test]
fn given_interpreter_not_found_error_when_source_queried_then_returns_io_error() {
    // GIVEN: An InterpreterNotFound error wrapping an IO error
    let err = SpawnError::InterpreterNotFound {
        message: String::from("Interpreter 'python' not found"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::NotFound, "No such file or directory")),
    };

    // WHEN: Querying the source
    let source = err.source();

    // THEN: The IO error is chained
    assert!(source.is_some());
    assert!(source.unwrap().to_string().contains("No such file or directory"));
}

/// **VALUE**: Verifies that a builder validation failure converts with the caller's location.
///
/// **BUG THIS CATCHES**: Would catch if `#[track_caller]` is dropped from the `From` impl, in
/// which case every converted error points into the error module.
#[test]
fn given_model_error_when_converted_then_becomes_validation_with_caller_location() {
    // GIVEN: A builder error (no PID)
    let model_err = TrackerInfoBuilder::default().build().unwrap_err();

    // WHEN: Converting
    let err = SpawnError::from(model_err);

    // THEN: Validation error located here
    match &err {
        SpawnError::Validation { message, location } => {
            assert!(message.contains("PID is required"));
            assert!(location.file.ends_with("spawn.rs"));
            assert!(location.file.contains("integration_tests"));
        }
        other => panic!("Expected Validation, got {other:?}"),
    }
}

/// **VALUE**: Verifies `CoreError` is transparent over its wrapped errors.
#[test]
fn given_spawn_error_when_wrapped_in_core_error_then_display_is_unchanged() {
    let err = SpawnError::EarlyExit {
        message: String::from("RealSense module exited during startup (exit status: 1)"),
        code: Some(1),
        stderr_tail: vec![String::from("boom")],
        location: ErrorLocation::from(Location::caller()),
    };
    let expected = err.to_string();

    let core: CoreError = err.into();

    assert_eq!(core.to_string(), expected);
}
