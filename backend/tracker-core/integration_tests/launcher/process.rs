use tracker_core::launcher::process::{ensure_stopped, find_by_script, is_alive, stop_pid};

use std::time::Duration;

// ============================================================================
// Public API tests for process termination and orphan discovery
// ============================================================================

const TIMEOUT: Duration = Duration::from_secs(2);

/// **VALUE**: Verifies that `stop_pid()` gracefully handles a PID that does not exist.
///
/// **WHY THIS MATTERS**: The tracker can crash between the status read and the stop request.
/// Panicking here would take the whole bridge down with it.
///
/// **BUG THIS CATCHES**: Would catch if `stop_pid()` unwraps the process lookup.
#[test]
fn given_nonexistent_pid_when_stop_pid_called_then_returns_false() {
    // GIVEN: A PID that doesn't exist
    let fake_pid = u32::MAX;

    // WHEN: Attempting to stop the process
    let result = stop_pid(fake_pid, TIMEOUT);

    // THEN: Should return false (graceful handling)
    assert!(!result, "Should return false for non-existent process");
}

/// **VALUE**: Refuses to signal PID 1 (init/systemd).
///
/// **WHY THIS MATTERS**: Killing PID 1 takes the whole machine down, and inside a container it
/// takes the container down. This must never happen, even with a corrupted PID.
///
/// **BUG THIS CATCHES**: Would catch if someone removes the protected-PID check.
#[test]
fn given_pid_1_when_stop_pid_called_then_refuses_and_returns_false() {
    assert!(!stop_pid(1, TIMEOUT), "Should never kill PID 1 (init process)");
}

/// **VALUE**: Refuses to signal the bridge's own process.
///
/// **BUG THIS CATCHES**: Would catch if an orphan sweep matching our own command line
/// (e.g. a bridge launched from the script directory) ends up killing the bridge.
#[test]
fn given_own_pid_when_stop_pid_called_then_refuses_and_returns_false() {
    assert!(!stop_pid(std::process::id(), TIMEOUT));
    assert!(is_alive(std::process::id()));
}

/// **VALUE**: Verifies that stopping an already-gone process counts as success.
///
/// **WHY THIS MATTERS**: The stop endpoint must report "stopped" when the tracker died on its
/// own a moment earlier, rather than claiming the stop failed.
#[test]
fn given_nonexistent_pid_when_ensure_stopped_called_then_ok() {
    assert!(ensure_stopped(u32::MAX, TIMEOUT).is_ok());
}

/// **VALUE**: Verifies that a protected PID surfaces as `StopFailed`.
#[test]
fn given_pid_1_when_ensure_stopped_called_then_returns_stop_failed() {
    let err = ensure_stopped(1, TIMEOUT).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("PID 1"));
    assert!(message.contains("process.rs"), "Should carry the caller location");
}

/// **VALUE**: A script that does not exist is run by nothing.
///
/// **BUG THIS CATCHES**: Would catch a fallback to name matching when the configured path
/// cannot be resolved, which would let the orphan sweep hit unrelated processes.
#[test]
fn given_missing_script_when_find_by_script_called_then_returns_empty() {
    let missing = std::env::temp_dir().join("no_such_dir_for_tracker").join("main_example.py");

    assert!(find_by_script(&missing, &[]).is_empty());
}

#[cfg(unix)]
mod unix {
    use super::TIMEOUT;
    use crate::support::{SHELL, write_script};

    use tracker_core::launcher::process::{ensure_stopped, find_by_script, is_alive, stop_pid};

    use std::process::Command;

    use tempfile::TempDir;

    /// **VALUE**: Verifies an orphaned script is found by name and can be stopped.
    ///
    /// **WHY THIS MATTERS**: If the bridge restarts while the tracker runs, the old tracker
    /// keeps the camera open. The stop endpoint must still be able to find and end it.
    ///
    /// **BUG THIS CATCHES**: Would catch if command lines or working directories are not
    /// refreshed (sysinfo default), which makes every orphan invisible.
    #[test]
    fn given_untracked_script_process_when_searched_by_name_then_found_and_stoppable() {
        // GIVEN: A script process started outside the launcher
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "while true; do sleep 1; done");
        let mut child = Command::new(SHELL).arg(&script).spawn().unwrap();
        let pid = child.id();

        // WHEN: Searching by script path
        let found = find_by_script(&script, &[]);

        // THEN: Found, excluded on request, and stoppable
        assert_eq!(found, vec![pid]);
        assert!(find_by_script(&script, &[pid]).is_empty());
        assert!(stop_pid(pid, TIMEOUT));
        assert!(!is_alive(pid));

        child.wait().unwrap();
        assert!(ensure_stopped(pid, TIMEOUT).is_ok());
    }

    /// **VALUE**: Verifies a process ignoring SIGTERM is force killed after the timeout.
    ///
    /// **WHY THIS MATTERS**: A tracker blocked inside the camera driver may never handle SIGTERM.
    /// The stop endpoint must still free the camera.
    ///
    /// **BUG THIS CATCHES**: Would catch if the SIGKILL escalation is removed.
    #[test]
    fn given_process_ignoring_sigterm_when_stopped_then_force_killed() {
        // GIVEN: A script that traps and ignores SIGTERM
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "trap '' TERM\nwhile true; do sleep 1; done");
        let mut child = Command::new(SHELL).arg(&script).spawn().unwrap();
        let pid = child.id();
        std::thread::sleep(std::time::Duration::from_millis(200));

        // WHEN: Stopping with a short timeout
        let stopped = stop_pid(pid, std::time::Duration::from_millis(500));

        // THEN: Killed by SIGKILL
        assert!(stopped);
        let status = child.wait().unwrap();
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(status.signal(), Some(9));
    }

    /// **VALUE**: Verifies a relative script argument is resolved against the process's
    /// working directory.
    ///
    /// **WHY THIS MATTERS**: Operators often start the tracker by hand as
    /// `python main_example.py` from its own directory.
    #[test]
    fn given_script_started_with_relative_path_when_searched_then_found() {
        // GIVEN: `sh tracker_x.sh` run from the script's directory
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "while true; do sleep 1; done");
        let mut child = Command::new(SHELL)
            .arg(script.file_name().unwrap())
            .current_dir(dir.path())
            .spawn()
            .unwrap();
        let pid = child.id();

        // WHEN/THEN: Found by its absolute path
        assert_eq!(find_by_script(&script, &[]), vec![pid]);

        child.kill().unwrap();
        child.wait().unwrap();
    }

    /// **VALUE**: Verifies processes that only mention the script name are left alone.
    ///
    /// **WHY THIS MATTERS**: Stop sends SIGTERM then SIGKILL to every match. An editor with
    /// the script open or a shell whose command text mentions it must never be killed.
    ///
    /// **BUG THIS CATCHES**: Would catch a return to substring matching on the joined
    /// command line.
    #[test]
    fn given_processes_mentioning_script_name_when_searched_then_not_matched() {
        // GIVEN: Decoys naming the script without running it
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "while true; do sleep 1; done");
        let name = script.file_name().unwrap().to_string_lossy().to_string();
        let other_dir = TempDir::new().unwrap();
        let same_name_elsewhere = other_dir.path().join(&name);
        std::fs::write(&same_name_elsewhere, "#!/bin/sh\n").unwrap();

        let decoy_args: Vec<Vec<String>> = vec![
            // vim notes_about_<name>.txt
            vec![format!("notes_about_{name}.txt")],
            // tail -f <script>.log
            vec![String::from("-f"), format!("{}.log", script.display())],
            // old_<name>
            vec![format!("old_{name}")],
            // a shell command string that mentions the full path
            vec![format!("echo {}", script.display())],
            // a file with the same name in another directory
            vec![same_name_elsewhere.display().to_string()],
        ];
        let mut decoys: Vec<_> = decoy_args
            .iter()
            .map(|args| {
                Command::new(SHELL)
                    .args(["-c", "sleep 30", "decoy"])
                    .args(args)
                    .spawn()
                    .unwrap()
            })
            .collect();

        // WHEN: Searching for the script
        let found = find_by_script(&script, &[]);

        // THEN: Nothing matches and every decoy is still alive
        assert!(found.is_empty(), "Decoys matched: {found:?}");
        for decoy in &mut decoys {
            assert!(is_alive(decoy.id()));
            decoy.kill().unwrap();
            decoy.wait().unwrap();
        }
    }
}
