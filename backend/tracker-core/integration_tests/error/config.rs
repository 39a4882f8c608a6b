use tracker_core::error::config::ConfigError;

use common::ErrorLocation;

use std::error::Error;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;
use std::path::PathBuf;

/// **VALUE**: Verifies `ConfigError::ReadError` names the file and chains the IO error.
///
/// **WHY THIS MATTERS**: The bridge refuses to start on a config error; the log line is all
/// the operator gets.
///
/// **BUG THIS CATCHES**: Would catch if the path or the IO source is dropped.
#[test]
fn given_read_error_when_formatted_then_includes_path_and_source() {
    // GIVEN: A read error
    let err = ConfigError::ReadError {
        location: ErrorLocation::from(Location::caller()),
        path: PathBuf::from("/etc/realsense-bridge/config.toml"),
        source: IoError::new(ErrorKind::PermissionDenied, "permission denied"),
    };

    // WHEN: Formatting
    let error_string = err.to_string();

    // THEN: Path, cause and location are present
    assert!(error_string.contains("Config Read Error"));
    assert!(error_string.contains("/etc/realsense-bridge/config.toml"));
    assert!(error_string.contains("permission denied"));
    assert!(error_string.contains("config.rs"));
    assert!(err.source().is_some());
}

/// **VALUE**: Verifies `ConfigError::ValidationError` carries the reason.
#[test]
fn given_validation_error_when_formatted_then_includes_reason() {
    let err = ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: String::from("Invalid bind address: localhost (expected ip:port)"),
    };

    let error_string = err.to_string();

    assert!(error_string.contains("Config Validation Error"));
    assert!(error_string.contains("localhost"));
}
