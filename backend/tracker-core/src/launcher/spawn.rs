use crate::config::TrackerConfig;
use crate::error::spawn::SpawnError;
use crate::launcher::output::{OutputLog, OutputStream, forward_lines};
use crate::{FUNCTION_FLAG, SERVER_FLAG};

use common::ErrorLocation;
use models::{FunctionId, ServerAddress, TrackerInfo, TrackerInfoBuilder};

use std::ffi::OsString;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::process::Child as TokioChild;
use tokio::process::Command as TokioCommand;
use tokio::time::{sleep as TokioSleep, timeout as TokioTimeout};

#[cfg(windows)]
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
const EARLY_EXIT_STDERR_LINES: usize = 10;
const OUTPUT_DRAIN_DELAY: Duration = Duration::from_millis(100);

/// A script that survived its startup grace period.
#[derive(Debug)]
pub struct LaunchedTracker {
    pub info: TrackerInfo,
    pub child: TokioChild,
}

/// Arguments handed to the script after its path.
pub fn script_args(address: &ServerAddress, function_id: FunctionId) -> Vec<String> {
    vec![
        SERVER_FLAG.to_string(),
        address.as_str().to_string(),
        FUNCTION_FLAG.to_string(),
        function_id.to_string(),
    ]
}

/// Locate the script on disk, resolving relative paths against `working_dir`.
#[track_caller]
pub fn resolve_script(config: &TrackerConfig) -> Result<PathBuf, SpawnError> {
    let resolved = config.resolved_script_path();

    if !resolved.is_file() {
        return Err(SpawnError::ScriptNotFound {
            path: resolved,
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(resolved.canonicalize().unwrap_or(resolved))
}

pub(crate) fn build_launch_command(
    config: &TrackerConfig,
    script: &Path,
    address: &ServerAddress,
    function_id: FunctionId,
) -> TokioCommand {
    let mut cmd = if config.interpreter.is_empty() {
        TokioCommand::new(script)
    } else {
        let mut cmd = TokioCommand::new(&config.interpreter);
        cmd.arg(script);
        cmd
    };

    cmd.args(script_args(address, function_id))
        .envs(&config.env)
        .stdin(Stdio::null());

    if let Some(dir) = &config.working_dir {
        cmd.current_dir(dir);
    }

    if uses_new_console(config) {
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NEW_CONSOLE);
    } else {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    }

    cmd
}

fn uses_new_console(config: &TrackerConfig) -> bool {
    cfg!(windows) && config.new_console
}

pub(crate) fn describe_command(cmd: &TokioCommand) -> String {
    let std_cmd = cmd.as_std();
    let mut parts: Vec<OsString> = vec![std_cmd.get_program().to_os_string()];
    parts.extend(std_cmd.get_args().map(|a| a.to_os_string()));

    parts
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Start the face-tracking script and wait out its startup grace period.
///
/// Runs `[interpreter] <script> --server <address> --function <id>`. The output log is
/// cleared and then fed with the script's stdout/stderr.
///
/// # Returns
///
/// * `Ok(LaunchedTracker)` - Script is running; the caller owns the child handle
/// * `Err(SpawnError)` - Script missing, interpreter missing, permission denied, or the
///   script exited before the grace period elapsed
pub async fn launch(
    config: &TrackerConfig,
    address: &ServerAddress,
    function_id: FunctionId,
    output: &OutputLog,
) -> Result<LaunchedTracker, SpawnError> {
    let script = resolve_script(config)?;
    let mut cmd = build_launch_command(config, &script, address, function_id);
    let command_line = describe_command(&cmd);

    info!("Launching RealSense module: {command_line}");
    output.clear();

    let mut child = cmd
        .spawn()
        .map_err(|e| classify_spawn_error(config, &script, e))?;

    let pid = child.id().ok_or_else(|| SpawnError::Spawn {
        message: String::from("Spawned process reported no PID"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::other("missing pid")),
    })?;

    debug!("RealSense module spawned (PID: {pid})");

    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, OutputStream::Stdout, output.clone(), pid);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, OutputStream::Stderr, output.clone(), pid);
    }

    wait_for_startup(&mut child, config.startup_grace(), output, pid).await?;

    let info = match TrackerInfoBuilder::default()
        .with_pid(pid)
        .with_server_address(address.clone())
        .with_function_id(function_id)
        .with_command(command_line)
        .build()
    {
        Ok(info) => info,
        Err(e) => {
            warn!("Discarding RealSense module (PID {pid}): {e}");
            let _ = child.start_kill();
            return Err(SpawnError::from(e));
        }
    };

    info!(
        "RealSense module running (PID: {pid}, run: {}, server: {address})",
        info.run_id
    );

    Ok(LaunchedTracker { info, child })
}

#[track_caller]
fn classify_spawn_error(config: &TrackerConfig, script: &Path, err: IoError) -> SpawnError {
    let program = if config.interpreter.is_empty() {
        script.display().to_string()
    } else {
        config.interpreter.clone()
    };

    match err.kind() {
        ErrorKind::NotFound if config.interpreter.is_empty() => SpawnError::InterpreterNotFound {
            message: format!("Could not execute {program}; check its shebang line: {err}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(err),
        },
        ErrorKind::NotFound => SpawnError::InterpreterNotFound {
            message: format!(
                "Interpreter '{program}' not found; install Python or set tracker.interpreter: {err}"
            ),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(err),
        },
        ErrorKind::PermissionDenied => SpawnError::Permission {
            message: format!("Permission denied launching {program}: {err}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(err),
        },
        _ => SpawnError::Spawn {
            message: format!("Failed to launch {program}: {err}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(err),
        },
    }
}

async fn wait_for_startup(
    child: &mut TokioChild,
    grace: Duration,
    output: &OutputLog,
    pid: u32,
) -> Result<(), SpawnError> {
    if grace.is_zero() {
        return Ok(());
    }

    match TokioTimeout(grace, child.wait()).await {
        Err(_) => Ok(()),
        Ok(Ok(status)) => {
            // Give the pipe readers a moment to flush the last lines.
            TokioSleep(OUTPUT_DRAIN_DELAY).await;

            let stderr_tail = output.tail(Some(OutputStream::Stderr), EARLY_EXIT_STDERR_LINES);
            warn!("RealSense module (PID {pid}) exited during startup: {status}");

            let detail = stderr_tail
                .last()
                .map(|line| format!(": {line}"))
                .unwrap_or_default();

            Err(SpawnError::EarlyExit {
                message: format!("RealSense module exited during startup ({status}){detail}"),
                code: status.code(),
                stderr_tail,
                location: ErrorLocation::from(Location::caller()),
            })
        }
        Ok(Err(e)) => Err(SpawnError::Spawn {
            message: format!("Failed to wait for RealSense module (PID {pid}): {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        }),
    }
}
