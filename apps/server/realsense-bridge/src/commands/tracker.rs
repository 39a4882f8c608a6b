use crate::error::BridgeError;
use crate::state::{AppState, StateCommand};

use common::ErrorLocation;
use models::{ExitInfo, FunctionId, ServerAddress, TrackerInfo};
use tracker_core::config::TrackerConfig;
use tracker_core::launcher::{self, LaunchedTracker, process};

use std::panic::Location;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::process::Child as TokioChild;
use tokio::task::spawn_blocking;

pub const STARTED_MESSAGE: &str = "RealSense module started";
pub const STOPPED_MESSAGE: &str = "RealSense module stopped";
pub const NOT_RUNNING_MESSAGE: &str = "RealSense module is not running";

/// Result of a stop request.
#[derive(Debug, Clone, Default)]
pub struct StopOutcome {
    /// The tracked script that was stopped, if one was running
    pub stopped: Option<TrackerInfo>,
    /// PIDs of untracked script processes that were terminated
    pub orphans: Vec<u32>,
}

impl StopOutcome {
    pub fn message(&self) -> String {
        match (&self.stopped, self.orphans.len()) {
            (Some(_), 0) => STOPPED_MESSAGE.to_string(),
            (Some(_), n) => format!("{STOPPED_MESSAGE} ({n} orphaned process(es) also stopped)"),
            (None, 0) => NOT_RUNNING_MESSAGE.to_string(),
            (None, n) => format!("{STOPPED_MESSAGE} ({n} orphaned process(es))"),
        }
    }
}

/// Launch the face-tracking script for `address`.
///
/// Holds the lifecycle lock for the whole launch so concurrent requests can
/// never start two scripts. After a successful launch a watcher task reports
/// the script's exit to the state actor.
///
/// # Returns
///
/// * `Ok(TrackerInfo)` - Script launched and survived its startup grace period
/// * `Err(BridgeError::AlreadyRunning)` - A tracked script is still running
/// * `Err(BridgeError::Launch)` - Script missing, interpreter missing, or early exit
pub async fn start_tracker(
    state: &AppState,
    address: ServerAddress,
) -> Result<TrackerInfo, BridgeError> {
    let _lifecycle = state.lifecycle().lock().await;

    if let Some(current) = state.current().await {
        warn!(
            "Start requested while RealSense module is running (PID {})",
            current.pid
        );
        return Err(BridgeError::AlreadyRunning {
            pid: current.pid,
            message: format!(
                "RealSense module is already running (PID {})",
                current.pid
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let LaunchedTracker { info, mut child } = launcher::launch(
        state.config(),
        &address,
        FunctionId::FACE_RECOGNITION,
        state.output(),
    )
    .await
    .inspect_err(|e| error!("Failed to launch RealSense module: {e}"))?;

    if let Err(e) = state.update(StateCommand::SetRunning(info.clone())).await {
        error!("Failed to record RealSense module (PID {}): {e}", info.pid);
        let _ = child.start_kill();
        return Err(e);
    }

    spawn_watcher(state.clone(), child, &info);

    Ok(info)
}

fn spawn_watcher(state: AppState, child: TokioChild, info: &TrackerInfo) {
    let (run_id, pid) = (info.run_id, info.pid);

    tokio::spawn(async move {
        let exit = launcher::wait_for_exit(child, run_id, pid).await;
        if let Err(e) = state.update(StateCommand::MarkExited(exit)).await {
            warn!("Failed to record exit of RealSense module (PID {pid}): {e}");
        }
    });

    debug!("Exit watcher started for PID {pid}");
}

/// Stop the tracked script and, when `sweep_orphans` is set, any other process
/// running the same script.
///
/// Nothing running is not an error.
///
/// # Returns
///
/// * `Ok(StopOutcome)` - Everything found was terminated
/// * `Err(BridgeError::StopFailed)` - A process survived SIGTERM and SIGKILL
pub async fn stop_tracker(
    state: &AppState,
    sweep_orphans: bool,
) -> Result<StopOutcome, BridgeError> {
    let _lifecycle = state.lifecycle().lock().await;
    let timeout = state.config().stop_timeout();

    let stopped = match state.current().await {
        Some(info) => {
            info!("Stopping RealSense module (PID {})", info.pid);
            stop_blocking(info.pid, timeout).await?;
            state
                .update(StateCommand::MarkStopped(ExitInfo::stopped(
                    info.run_id,
                    info.pid,
                )))
                .await?;
            Some(info)
        }
        None => {
            debug!("Stop requested but no RealSense module is tracked");
            None
        }
    };

    let orphans = if sweep_orphans {
        stop_orphans(state.config(), stopped.as_ref().map(|info| info.pid)).await?
    } else {
        Vec::new()
    };

    Ok(StopOutcome { stopped, orphans })
}

async fn stop_blocking(pid: u32, timeout: Duration) -> Result<(), BridgeError> {
    spawn_blocking(move || process::ensure_stopped(pid, timeout))
        .await
        .map_err(|e| BridgeError::StopFailed {
            message: format!("Stop task for PID {pid} failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })??;

    Ok(())
}

async fn stop_orphans(
    config: &TrackerConfig,
    tracked: Option<u32>,
) -> Result<Vec<u32>, BridgeError> {
    let script = config.resolved_script_path();
    let timeout = config.stop_timeout();
    let exclude: Vec<u32> = tracked.into_iter().collect();

    let stopped = spawn_blocking(move || {
        let mut stopped = Vec::new();
        for pid in process::find_by_script(&script, &exclude) {
            warn!("Stopping orphaned {} process (PID {pid})", script.display());
            process::ensure_stopped(pid, timeout)?;
            stopped.push(pid);
        }
        Ok::<_, tracker_core::error::process::ProcessError>(stopped)
    })
    .await
    .map_err(|e| BridgeError::StopFailed {
        message: format!("Orphan sweep failed: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })??;

    Ok(stopped)
}

/// Untracked processes running the configured script.
///
/// Used at startup to warn about scripts left over from a previous run.
pub async fn find_orphans(config: &TrackerConfig) -> Vec<u32> {
    let script = config.resolved_script_path();

    spawn_blocking(move || process::find_by_script(&script, &[]))
        .await
        .unwrap_or_else(|e| {
            warn!("Orphan scan failed: {e}");
            Vec::new()
        })
}
