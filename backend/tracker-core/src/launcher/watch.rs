use models::ExitInfo;

use log::{info, warn};
use tokio::process::Child as TokioChild;
use uuid::Uuid;

/// Wait for a launched script to exit and describe how it ended.
///
/// Owns the child so the exit status is reaped as soon as the process ends.
pub async fn wait_for_exit(mut child: TokioChild, run_id: Uuid, pid: u32) -> ExitInfo {
    match child.wait().await {
        Ok(status) => {
            info!("RealSense module (PID {pid}) exited: {status}");
            ExitInfo::exited(run_id, pid, status.code(), exit_signal(&status))
        }
        Err(e) => {
            warn!("Failed to wait for RealSense module (PID {pid}): {e}");
            ExitInfo::exited(run_id, pid, None, None)
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
