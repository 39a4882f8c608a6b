use crate::{FunctionId, ModelError, ServerAddress, TrackerInfoBuilder};

use std::time::{Duration, SystemTime};

use uuid::Uuid;

fn address() -> ServerAddress {
    ServerAddress::parse("192.168.1.100:8000").unwrap()
}

/// **VALUE**: Verifies that builder validation rejects zero PIDs.
///
/// **WHY THIS MATTERS**: PID 0 addresses the whole process group on Unix. A TrackerInfo
/// with PID 0 would make the stop endpoint signal every process in the group.
///
/// **BUG THIS CATCHES**: Would catch if the PID zero check is deleted during refactoring.
#[test]
fn given_zero_pid_when_building_tracker_info_then_returns_validation_error() {
    // GIVEN: Builder with PID set to zero
    let builder = TrackerInfoBuilder::default()
        .with_pid(0)
        .with_server_address(address())
        .with_command("python main_example.py --server 192.168.1.100:8000 --function 15");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "PID must be non-zero");
        }
    }
}

/// **VALUE**: Verifies that builder validation rejects a missing PID.
///
/// **BUG THIS CATCHES**: Would catch if required field validation is removed and a
/// TrackerInfo without a process to stop could enter application state.
#[test]
fn given_missing_pid_when_building_then_returns_validation_error() {
    // GIVEN: Builder without PID
    let builder = TrackerInfoBuilder::default()
        .with_server_address(address())
        .with_command("python main_example.py");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "PID is required");
        }
    }
}

/// **VALUE**: Verifies that the server address is mandatory.
#[test]
fn given_missing_server_address_when_building_then_returns_validation_error() {
    let result = TrackerInfoBuilder::default()
        .with_pid(4242)
        .with_command("python main_example.py")
        .build();

    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Server address is required");
        }
    }
}

/// **VALUE**: Verifies that a whitespace-only command is rejected.
///
/// **WHY THIS MATTERS**: The command string is shown on the status endpoint and used in
/// logs to identify what was launched.
#[test]
fn given_blank_command_when_building_then_returns_validation_error() {
    let result = TrackerInfoBuilder::default()
        .with_pid(4242)
        .with_server_address(address())
        .with_command("   ")
        .build();

    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Command cannot be empty");
        }
    }
}

/// **VALUE**: Verifies the defaults for optional fields.
///
/// **WHY THIS MATTERS**: The launcher relies on the face-recognition default and on a
/// fresh run id per launch to tell runs apart in the state actor.
///
/// **BUG THIS CATCHES**: Would catch if the default function id drifts from 15 or if two
/// builds share a run id.
#[test]
fn given_only_required_fields_when_building_then_fills_defaults() {
    // GIVEN: Two builders with only required fields
    let make = || {
        TrackerInfoBuilder::default()
            .with_pid(4242)
            .with_server_address(address())
            .with_command("python main_example.py")
            .build()
            .unwrap()
    };

    // WHEN: Building twice
    let first = make();
    let second = make();

    // THEN: Defaults are applied and run ids are unique
    assert_eq!(first.function_id, FunctionId::FACE_RECOGNITION);
    assert_ne!(first.run_id, second.run_id);
    assert!(first.uptime() < Duration::from_secs(5));
}

/// **VALUE**: Verifies explicit values are kept as given.
#[test]
fn given_all_fields_when_building_then_preserves_values() {
    let run_id = Uuid::new_v4();
    let started_at = SystemTime::now() - Duration::from_secs(30);

    let info = TrackerInfoBuilder::default()
        .with_run_id(run_id)
        .with_pid(777)
        .with_server_address(address())
        .with_function_id(FunctionId(3))
        .with_command("main_example.py --server 192.168.1.100:8000 --function 3")
        .with_started_at(started_at)
        .build()
        .unwrap();

    assert_eq!(info.run_id, run_id);
    assert_eq!(info.pid, 777);
    assert_eq!(info.server_address.as_str(), "192.168.1.100:8000");
    assert_eq!(info.function_id, FunctionId(3));
    assert_eq!(info.started_at, started_at);
    assert!(info.uptime() >= Duration::from_secs(30));
}
