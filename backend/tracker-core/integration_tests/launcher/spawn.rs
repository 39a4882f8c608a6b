use tracker_core::config::TrackerConfig;
use tracker_core::error::spawn::SpawnError;
use tracker_core::launcher::spawn::resolve_script;
use tracker_core::launcher::{OutputLog, launch};

use models::{FunctionId, ServerAddress};

use std::path::PathBuf;

use tempfile::TempDir;

// ============================================================================
// Public API tests for launching the tracking script
// Shell scripts stand in for the Python tracker so no camera is needed
// ============================================================================

fn address() -> ServerAddress {
    ServerAddress::parse("192.168.1.100:8000").unwrap()
}

// ----------------------------------------------------------------------------
// resolve_script() / launch() failure modes
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies that a missing script is reported as `ScriptNotFound` before anything spawns.
///
/// **WHY THIS MATTERS**: The most common deployment mistake is a wrong `script_path`. The operator
/// needs the resolved path in the error, not a generic "python exited with code 2".
///
/// **BUG THIS CATCHES**: Would catch if the existence check is dropped and the interpreter is
/// launched with a bad path, which only fails after the grace period.
#[tokio::test]
async fn given_missing_script_when_launching_then_returns_script_not_found() {
    // GIVEN: A script path that does not exist
    let dir = TempDir::new().unwrap();
    let config = TrackerConfig {
        script_path: PathBuf::from("missing_example.py"),
        working_dir: Some(dir.path().to_path_buf()),
        ..TrackerConfig::default()
    };
    let output = OutputLog::new(10);

    // WHEN: Launching
    let result = launch(&config, &address(), FunctionId::FACE_RECOGNITION, &output).await;

    // THEN: ScriptNotFound with the resolved path
    match result {
        Err(SpawnError::ScriptNotFound { path, .. }) => {
            assert_eq!(path, dir.path().join("missing_example.py"));
        }
        other => panic!("Expected ScriptNotFound, got {other:?}"),
    }
}

/// **VALUE**: Verifies `resolve_script()` returns an absolute path for an existing script.
///
/// **BUG THIS CATCHES**: Would catch if a relative path leaks through, which makes direct
/// execution fall back to a PATH lookup.
#[test]
fn given_existing_relative_script_when_resolved_then_returns_absolute_path() {
    // GIVEN: A script inside the working directory
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("main_example.py"), "print('hi')\n").unwrap();
    let config = TrackerConfig {
        working_dir: Some(dir.path().to_path_buf()),
        ..TrackerConfig::default()
    };

    // WHEN: Resolving
    let resolved = resolve_script(&config).unwrap();

    // THEN: Absolute and pointing at the file
    assert!(resolved.is_absolute());
    assert!(resolved.ends_with("main_example.py"));
}

#[cfg(unix)]
mod unix {
    use super::address;
    use crate::support::{make_executable, shell_config, write_script};

    use tracker_core::config::TrackerConfig;
    use tracker_core::error::spawn::SpawnError;
    use tracker_core::launcher::process::ensure_stopped;
    use tracker_core::launcher::{OutputLog, OutputStream, launch, wait_for_exit};

    use models::{ExitReason, FunctionId};

    use std::collections::BTreeMap;
    use std::time::Duration;

    use tempfile::TempDir;
    use tokio::task::spawn_blocking;

    /// **VALUE**: Verifies the script receives exactly `--server <address> --function 15`.
    ///
    /// **WHY THIS MATTERS**: The tracker connects back to the address it is given and picks its
    /// pipeline from the function id. Any change to the argument order silently breaks tracking.
    ///
    /// **BUG THIS CATCHES**: Would catch flag renames, a dropped argument, or the address being
    /// re-formatted (e.g. gaining an `http://` prefix) before it reaches the script.
    #[tokio::test]
    async fn given_running_script_when_launched_then_receives_server_and_function_args() {
        // GIVEN: A script that records its arguments and then stays alive
        let dir = TempDir::new().unwrap();
        let args_file = dir.path().join("args.txt");
        let script = write_script(
            &dir,
            "printf '%s\\n' \"$@\" > \"$ARGS_FILE\"\necho ready\nexec sleep 30",
        );
        let mut config = shell_config(&script);
        config.env = BTreeMap::from([(
            String::from("ARGS_FILE"),
            args_file.display().to_string(),
        )]);
        let output = OutputLog::new(10);

        // WHEN: Launching
        let launched = launch(&config, &address(), FunctionId::FACE_RECOGNITION, &output)
            .await
            .unwrap();
        let pid = launched.info.pid;

        // THEN: Arguments, tracker info and captured output are as expected
        let args = std::fs::read_to_string(&args_file).unwrap();
        assert_eq!(args, "--server\n192.168.1.100:8000\n--function\n15\n");
        assert_eq!(launched.info.server_address.as_str(), "192.168.1.100:8000");
        assert_eq!(launched.info.function_id, FunctionId::FACE_RECOGNITION);
        assert!(launched.info.command.contains("--function 15"));
        assert_eq!(output.tail(Some(OutputStream::Stdout), 1), vec!["ready"]);

        // Cleanup
        let timeout = config.stop_timeout();
        spawn_blocking(move || ensure_stopped(pid, timeout))
            .await
            .unwrap()
            .unwrap();
    }

    /// **VALUE**: Verifies that stopping a launched script is observed by `wait_for_exit()`.
    ///
    /// **WHY THIS MATTERS**: The status endpoint relies on the watcher to notice when the
    /// tracker goes away, whether it was stopped or crashed.
    ///
    /// **BUG THIS CATCHES**: Would catch if the watcher hangs on a terminated child or loses
    /// the run id that ties the exit to its launch.
    #[tokio::test]
    async fn given_launched_script_when_stopped_then_watcher_reports_exit() {
        // GIVEN: A long-running script and a watcher
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exec sleep 30");
        let config = shell_config(&script);
        let output = OutputLog::new(10);
        let launched = launch(&config, &address(), FunctionId::FACE_RECOGNITION, &output)
            .await
            .unwrap();
        let (run_id, pid) = (launched.info.run_id, launched.info.pid);
        let watcher = tokio::spawn(wait_for_exit(launched.child, run_id, pid));

        // WHEN: Stopping it
        let timeout = config.stop_timeout();
        spawn_blocking(move || ensure_stopped(pid, timeout))
            .await
            .unwrap()
            .unwrap();

        // THEN: Watcher resolves with the same run and a SIGTERM exit
        let exit = tokio::time::timeout(Duration::from_secs(10), watcher)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exit.run_id, run_id);
        assert_eq!(exit.pid, pid);
        assert_eq!(exit.reason, ExitReason::Exited);
        assert_eq!(exit.signal, Some(15));
        assert!(!exit.success());
    }

    /// **VALUE**: Verifies a script that dies during startup is a launch failure with its stderr.
    ///
    /// **WHY THIS MATTERS**: When the camera is unplugged the script prints an error and exits
    /// immediately. Reporting "started" in that case sends the UI into a state that never recovers.
    ///
    /// **BUG THIS CATCHES**: Would catch if the grace-period wait is removed, or if the stderr
    /// tail is not attached to the error.
    #[tokio::test]
    async fn given_script_exiting_during_startup_when_launched_then_returns_early_exit() {
        // GIVEN: A script that fails immediately
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "echo 'No RealSense device connected' >&2\nexit 3");
        let config = TrackerConfig {
            startup_grace_ms: 5_000,
            ..shell_config(&script)
        };
        let output = OutputLog::new(10);

        // WHEN: Launching
        let result = launch(&config, &address(), FunctionId::FACE_RECOGNITION, &output).await;

        // THEN: EarlyExit carrying the exit code and the stderr line
        match result {
            Err(SpawnError::EarlyExit {
                message,
                code,
                stderr_tail,
                ..
            }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr_tail, vec!["No RealSense device connected"]);
                assert!(message.contains("No RealSense device connected"));
            }
            other => panic!("Expected EarlyExit, got {other:?}"),
        }
    }

    /// **VALUE**: Verifies that even a clean exit during startup counts as a failure.
    ///
    /// **BUG THIS CATCHES**: Would catch if only non-zero exits were treated as failures.
    #[tokio::test]
    async fn given_script_exiting_cleanly_during_startup_when_launched_then_returns_early_exit() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exit 0");
        let config = TrackerConfig {
            startup_grace_ms: 5_000,
            ..shell_config(&script)
        };

        let result = launch(
            &config,
            &address(),
            FunctionId::FACE_RECOGNITION,
            &OutputLog::new(10),
        )
        .await;

        assert!(
            matches!(result, Err(SpawnError::EarlyExit { code: Some(0), .. })),
            "Expected EarlyExit with code 0, got {result:?}"
        );
    }

    /// **VALUE**: Verifies a missing interpreter maps to `InterpreterNotFound`.
    ///
    /// **WHY THIS MATTERS**: "python not on PATH" is the second most common deployment problem
    /// and needs a message pointing at `tracker.interpreter`.
    #[tokio::test]
    async fn given_missing_interpreter_when_launching_then_returns_interpreter_not_found() {
        // GIVEN: A real script but a bogus interpreter
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exec sleep 30");
        let config = TrackerConfig {
            interpreter: String::from("definitely-not-a-python-interpreter"),
            ..shell_config(&script)
        };

        // WHEN: Launching
        let result = launch(
            &config,
            &address(),
            FunctionId::FACE_RECOGNITION,
            &OutputLog::new(10),
        )
        .await;

        // THEN: InterpreterNotFound naming the interpreter
        match result {
            Err(SpawnError::InterpreterNotFound { message, .. }) => {
                assert!(message.contains("definitely-not-a-python-interpreter"));
            }
            other => panic!("Expected InterpreterNotFound, got {other:?}"),
        }
    }

    /// **VALUE**: Verifies direct execution (empty interpreter) works for an executable script.
    #[tokio::test]
    async fn given_executable_script_and_empty_interpreter_when_launching_then_runs_directly() {
        // GIVEN: An executable script with a shebang
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exec sleep 30");
        make_executable(&script);
        let config = TrackerConfig {
            interpreter: String::new(),
            ..shell_config(&script)
        };

        // WHEN: Launching
        let launched = launch(
            &config,
            &address(),
            FunctionId::FACE_RECOGNITION,
            &OutputLog::new(10),
        )
        .await
        .unwrap();

        // THEN: The command starts with the script itself
        let canonical = script.canonicalize().unwrap();
        assert!(launched.info.command.starts_with(&canonical.display().to_string()));

        let (pid, timeout) = (launched.info.pid, config.stop_timeout());
        spawn_blocking(move || ensure_stopped(pid, timeout))
            .await
            .unwrap()
            .unwrap();
    }

    /// **VALUE**: Verifies a non-executable script run directly maps to `Permission`.
    ///
    /// **BUG THIS CATCHES**: Would catch if permission failures are lumped into the generic
    /// spawn error, hiding the `chmod +x` fix from the operator.
    #[tokio::test]
    async fn given_non_executable_script_and_empty_interpreter_when_launching_then_returns_permission_error()
     {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exec sleep 30");
        let config = TrackerConfig {
            interpreter: String::new(),
            ..shell_config(&script)
        };

        let result = launch(
            &config,
            &address(),
            FunctionId::FACE_RECOGNITION,
            &OutputLog::new(10),
        )
        .await;

        assert!(
            matches!(result, Err(SpawnError::Permission { .. })),
            "Expected Permission error, got {result:?}"
        );
    }
}
