// Unit tests for spawn module private functions
// Integration tests for public API are in integration_tests/launcher/spawn.rs

use crate::config::TrackerConfig;
use crate::launcher::spawn::{build_launch_command, describe_command, script_args};
use crate::{DEFAULT_INTERPRETER, FUNCTION_FLAG, SERVER_FLAG};

use models::{FunctionId, ServerAddress};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

fn address() -> ServerAddress {
    ServerAddress::parse("192.168.1.100:8000").unwrap()
}

/// **VALUE**: Verifies the script receives exactly `--server <address> --function 15`.
///
/// **WHY THIS MATTERS**: This is the whole contract with the external script. An extra,
/// missing or reordered flag makes the script fall back to its interactive menu.
///
/// **BUG THIS CATCHES**: Would catch renamed flags, a numeric formatting change of the
/// function id, or the address being normalized before it is passed on.
#[test]
fn given_address_when_building_script_args_then_matches_documented_cli() {
    // GIVEN: A validated address and the face recognition function
    // WHEN: Building the script arguments
    let args = script_args(&address(), FunctionId::FACE_RECOGNITION);

    // THEN: Exactly the documented four arguments
    assert_eq!(
        args,
        vec![SERVER_FLAG, "192.168.1.100:8000", FUNCTION_FLAG, "15"]
    );
}

/// **VALUE**: Verifies the interpreter is the program and the script is its first argument.
///
/// **BUG THIS CATCHES**: Would catch if the script path and flags end up in the wrong order,
/// e.g. `python --server ... main_example.py`.
#[test]
fn given_default_config_when_building_command_then_uses_interpreter_then_script() {
    // GIVEN: The default tracker config (python interpreter)
    let config = TrackerConfig::default();
    let script = Path::new("/opt/realsense/main_example.py");

    // WHEN: Building the launch command
    let cmd = build_launch_command(&config, script, &address(), FunctionId::FACE_RECOGNITION);

    // THEN: Program is the interpreter, followed by script and flags
    let std_cmd = cmd.as_std();
    assert_eq!(std_cmd.get_program(), DEFAULT_INTERPRETER);
    let args: Vec<&OsStr> = std_cmd.get_args().collect();
    assert_eq!(
        args,
        vec![
            OsStr::new("/opt/realsense/main_example.py"),
            OsStr::new("--server"),
            OsStr::new("192.168.1.100:8000"),
            OsStr::new("--function"),
            OsStr::new("15"),
        ]
    );
}

/// **VALUE**: Verifies that an empty interpreter executes the script directly.
#[test]
fn given_empty_interpreter_when_building_command_then_script_is_program() {
    let config = TrackerConfig {
        interpreter: String::new(),
        ..TrackerConfig::default()
    };
    let script = Path::new("/opt/realsense/track.sh");

    let cmd = build_launch_command(&config, script, &address(), FunctionId::FACE_RECOGNITION);

    let std_cmd = cmd.as_std();
    assert_eq!(std_cmd.get_program(), script.as_os_str());
    assert_eq!(std_cmd.get_args().count(), 4, "Only the four flags follow");
}

/// **VALUE**: Verifies working directory and extra environment reach the command.
///
/// **WHY THIS MATTERS**: RealSense scripts commonly load model files relative to their
/// own directory and need SDK paths such as `PYTHONPATH`.
#[test]
fn given_working_dir_and_env_when_building_command_then_applied() {
    let mut config = TrackerConfig {
        working_dir: Some(PathBuf::from("/opt/realsense")),
        ..TrackerConfig::default()
    };
    config
        .env
        .insert(String::from("PYTHONPATH"), String::from("/opt/librealsense/wrappers"));

    let cmd = build_launch_command(
        &config,
        Path::new("main_example.py"),
        &address(),
        FunctionId::FACE_RECOGNITION,
    );

    let std_cmd = cmd.as_std();
    assert_eq!(std_cmd.get_current_dir(), Some(Path::new("/opt/realsense")));
    let envs: Vec<(&OsStr, Option<&OsStr>)> = std_cmd.get_envs().collect();
    assert!(envs.contains(&(
        OsStr::new("PYTHONPATH"),
        Some(OsStr::new("/opt/librealsense/wrappers"))
    )));
}

/// **VALUE**: Verifies the human-readable command line stored in TrackerInfo.
#[test]
fn given_command_when_described_then_joins_program_and_args() {
    let config = TrackerConfig::default();
    let cmd = build_launch_command(
        &config,
        Path::new("main_example.py"),
        &address(),
        FunctionId::FACE_RECOGNITION,
    );

    let described = describe_command(&cmd);

    assert_eq!(
        described,
        "python main_example.py --server 192.168.1.100:8000 --function 15"
    );
}
