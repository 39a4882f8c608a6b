// Unit tests for error module
// Tests conversions from core errors and serialization

use crate::error::BridgeError;
use crate::routes::ApiError;

use common::ErrorLocation;
use models::ServerAddress;
use tracker_core::error::process::ProcessError;
use tracker_core::error::spawn::SpawnError;

use std::panic::Location;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::IntoResponse;

/// **VALUE**: Tests that errors can be serialized for structured logging.
///
/// **BUG THIS CATCHES**: Would catch if someone removes `#[derive(Serialize)]` or adds a
/// non-serializable field.
#[test]
fn given_bridge_error_when_serialized_then_contains_variant_and_message() {
    // GIVEN: A BridgeError
    let err = BridgeError::AlreadyRunning {
        pid: 4242,
        message: String::from("RealSense module is already running (PID 4242)"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Serializing to JSON
    let json = serde_json::to_string(&err).unwrap();

    // THEN: Variant name and data are present
    assert!(json.contains("AlreadyRunning"), "JSON should contain variant name");
    assert!(json.contains("4242"));
    assert!(json.contains("error.rs"), "JSON should contain the location");
}

/// **VALUE**: Verifies a missing script becomes a Launch error whose message says
/// "not found" and names the path.
///
/// **WHY THIS MATTERS**: This text is what the Web UI shows. "Spawn Error [spawn.rs:12:3]"
/// would be useless to an operator.
#[test]
fn given_script_not_found_when_converted_then_launch_message_names_path() {
    // GIVEN: A core ScriptNotFound error
    let core = SpawnError::ScriptNotFound {
        path: PathBuf::from("/opt/realsense/main_example.py"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Converting
    let err = BridgeError::from(core);

    // THEN: Launch variant with a readable message and no location
    assert!(matches!(err, BridgeError::Launch { .. }));
    assert_eq!(
        err.message(),
        "RealSense script not found: /opt/realsense/main_example.py"
    );
}

/// **VALUE**: Verifies a model validation error keeps only its message.
#[test]
fn given_invalid_address_when_converted_then_invalid_request_with_clean_message() {
    let model_err = ServerAddress::parse("   ").unwrap_err();

    let err = BridgeError::from(model_err);

    assert!(matches!(err, BridgeError::InvalidRequest { .. }));
    assert_eq!(err.message(), "Server address cannot be empty");
}

/// **VALUE**: Verifies the HTTP status chosen for each error class.
///
/// **WHY THIS MATTERS**: The Web UI distinguishes "fix your input" (400), "already running"
/// (409) and "the bridge failed" (500).
///
/// **BUG THIS CATCHES**: Would catch a variant routed to the wrong status code.
#[test]
fn given_bridge_errors_when_mapped_to_responses_then_status_codes_match() {
    let location = ErrorLocation::from(Location::caller());
    let cases = [
        (
            BridgeError::InvalidRequest {
                message: String::from("bad"),
                location,
            },
            StatusCode::BAD_REQUEST,
        ),
        (
            BridgeError::AlreadyRunning {
                pid: 1,
                message: String::from("running"),
                location,
            },
            StatusCode::CONFLICT,
        ),
        (
            BridgeError::from(ProcessError::StopFailed {
                pid: 7,
                message: String::from("stuck"),
                location,
            }),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            BridgeError::Launch {
                message: String::from("exited"),
                location,
            },
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), expected);
    }
}
