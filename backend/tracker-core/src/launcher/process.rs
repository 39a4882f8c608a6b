use crate::error::process::ProcessError;

use common::ErrorLocation;

use std::ffi::OsStr;
use std::panic::Location;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace, warn};
use sysinfo::{
    Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, Signal, System,
    UpdateKind,
};

pub(crate) fn with_process<F, R>(pid: u32, f: F) -> Option<R>
where
    F: FnOnce(&Process) -> R,
{
    let target = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[target]),
        true,
        ProcessRefreshKind::everything(),
    );

    sys.process(target).map(f)
}

pub(crate) fn format_command(process: &Process) -> String {
    process
        .cmd()
        .iter()
        .map(|s| s.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_running(process: &Process) -> bool {
    !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead)
}

/// PIDs that must never be signalled: the process group alias, init, and ourselves.
fn is_protected(pid: u32) -> bool {
    pid == 0 || pid == 1 || pid == std::process::id()
}

/// Check whether a process exists and has not terminated.
///
/// Zombies (exited but not yet reaped) count as terminated.
pub fn is_alive(pid: u32) -> bool {
    with_process(pid, is_running).unwrap_or(false)
}

/// Find running processes that run `script`.
///
/// A process matches when one of its arguments, resolved against the process's
/// working directory, is the same file as `script`. Editors or log tailers that
/// merely mention the file name do not match. The bridge, its ancestors and any
/// PID in `exclude` are skipped.
///
/// This is how script instances the bridge does not track (for example left over
/// from a previous bridge run) are located.
pub fn find_by_script(script: &Path, exclude: &[u32]) -> Vec<u32> {
    let Ok(script) = script.canonicalize() else {
        debug!("Script {} does not exist, no processes can run it", script.display());
        return Vec::new();
    };
    let Some(script_name) = script.file_name() else {
        return Vec::new();
    };

    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing()
            .with_cmd(UpdateKind::Always)
            .with_cwd(UpdateKind::Always),
    );

    trace!("Scanning {} processes for {}", sys.processes().len(), script.display());

    let lineage = own_lineage(&sys);
    let mut found: Vec<u32> = sys
        .processes()
        .iter()
        .filter(|(pid, _)| !lineage.contains(&pid.as_u32()) && !exclude.contains(&pid.as_u32()))
        .filter(|(_, p)| is_running(p))
        .filter(|(_, p)| runs_script(p, &script, script_name))
        .map(|(pid, p)| {
            trace!("PID {pid} runs the script: {}", format_command(p));
            pid.as_u32()
        })
        .collect();

    found.sort_unstable();

    if !found.is_empty() {
        debug!("Found {} processes: {found:?}", script.display());
    }

    found
}

fn runs_script(process: &Process, script: &Path, script_name: &OsStr) -> bool {
    process
        .cmd()
        .iter()
        .map(Path::new)
        .filter(|arg| arg.file_name() == Some(script_name))
        .any(|arg| {
            let candidate = if arg.is_absolute() {
                arg.to_path_buf()
            } else {
                match process.cwd() {
                    Some(cwd) => cwd.join(arg),
                    None => return false,
                }
            };
            candidate.canonicalize().is_ok_and(|c| c == script)
        })
}

/// The bridge's PID and every ancestor up to init.
fn own_lineage(sys: &System) -> Vec<u32> {
    let mut lineage = vec![std::process::id()];
    let mut current = Pid::from_u32(std::process::id());

    while let Some(parent) = sys.process(current).and_then(Process::parent) {
        if lineage.contains(&parent.as_u32()) {
            break;
        }
        lineage.push(parent.as_u32());
        current = parent;
    }

    lineage
}

fn wait_for_exit(pid: u32, max_elapsed: Duration) -> bool {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };

    loop {
        if !is_alive(pid) {
            debug!("Process {pid} successfully terminated");
            return true;
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Process {pid} still alive, retrying after {duration:?}");
                sleep(duration);
            }
            None => {
                debug!("Process {pid} still running after {max_elapsed:?}");
                return false;
            }
        }
    }
}

/// Stop a process by PID.
///
/// Sends SIGTERM first so the script can release the camera, then verifies with
/// exponential backoff for up to `timeout`. If the process is still alive it is
/// force killed (SIGKILL) and verified again. Blocks the calling thread.
///
/// # Returns
///
/// * `true` - If the process was terminated
/// * `false` - If the process doesn't exist, is protected, or couldn't be killed
pub fn stop_pid(pid: u32, timeout: Duration) -> bool {
    if is_protected(pid) {
        warn!("Refusing to stop protected PID {pid}");
        return false;
    }

    let signalled = with_process(pid, |p| {
        if !is_running(p) {
            return false;
        }

        if let Some(sent) = p.kill_with(Signal::Term) {
            debug!("Sent SIGTERM to PID {pid}: success={sent}");
            sent
        } else {
            let killed = p.kill();
            debug!("Sent SIGKILL to PID {pid}: success={killed}");
            killed
        }
    })
    .unwrap_or_else(|| {
        debug!("Process {pid} not found");
        false
    });

    if !signalled {
        return false;
    }

    if wait_for_exit(pid, timeout) {
        return true;
    }

    warn!("Process {pid} ignored SIGTERM for {timeout:?}, force killing");

    match with_process(pid, |p| p.kill()) {
        None => true,
        Some(false) => {
            warn!("Failed to send SIGKILL to PID {pid}");
            false
        }
        Some(true) => wait_for_exit(pid, timeout),
    }
}

/// Stop a process, treating "already gone" as success.
///
/// # Errors
///
/// Returns [`ProcessError::StopFailed`] if the process is still alive afterwards.
#[track_caller]
pub fn ensure_stopped(pid: u32, timeout: Duration) -> Result<(), ProcessError> {
    if stop_pid(pid, timeout) || (!is_protected(pid) && !is_alive(pid)) {
        return Ok(());
    }

    Err(ProcessError::StopFailed {
        pid,
        message: format!("Failed to stop RealSense module (PID {pid}); end it from the task manager"),
        location: ErrorLocation::from(Location::caller()),
    })
}
