// Unit tests for logger module initialization logic
// Tests focus on idempotency and error handling

use crate::logger::{initialize, installed_level};

use std::path::PathBuf;

use log::LevelFilter;
use serial_test::serial;
use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: Logger initialization can be reached from several code paths
/// (startup, tests). If it panics on the second call, the bridge crashes during startup.
///
/// **BUG THIS CATCHES**: Would catch if the installed-level guard is removed, causing fern
/// to fail when setting the global logger twice, or if a second call replaces the level.
#[test]
#[serial(logger)]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path(), LevelFilter::Debug);
    let level_after_first = installed_level();
    let result2 = initialize(temp_dir.path(), LevelFilter::Trace);

    // THEN: Both should return Ok (second one logs warning but doesn't error)
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
    assert!(temp_dir.path().join("realsense-bridge.log").exists());
    assert!(level_after_first.is_some());
    assert_eq!(installed_level(), level_after_first);
}

/// **VALUE**: Verifies that an unusable log directory is reported, even after a
/// successful initialization.
///
/// **WHY THIS MATTERS**: A wrong `logging.dir` must fail startup with a clear message
/// instead of panicking or silently logging nowhere.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` is unwrapped, or if the file
/// is only opened after the already-installed check.
#[test]
#[serial(logger)]
fn given_invalid_log_dir_when_initialize_called_then_returns_error() {
    // GIVEN: A path that can never be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Calling initialize with invalid directory
    let result = initialize(&invalid_dir, LevelFilter::Info);

    // THEN: Should return a Bridge error naming the file
    let err = result.unwrap_err();
    let err_string = format!("{err:?}");
    assert!(err_string.contains("Bridge"), "Should be BridgeError::Bridge");
    assert!(err.to_string().contains("realsense-bridge.log"));
}
