use std::time::SystemTime;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The script ended on its own (finished or crashed).
    Exited,
    /// The bridge terminated the script on request.
    Stopped,
}

/// How a tracked run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitInfo {
    pub run_id: Uuid,
    pub pid: u32,
    pub reason: ExitReason,
    pub code: Option<i32>,
    pub signal: Option<i32>,
    #[serde(serialize_with = "crate::timestamp::serialize_rfc3339")]
    pub finished_at: SystemTime,
}

impl ExitInfo {
    pub fn stopped(run_id: Uuid, pid: u32) -> Self {
        Self {
            run_id,
            pid,
            reason: ExitReason::Stopped,
            code: None,
            signal: None,
            finished_at: SystemTime::now(),
        }
    }

    pub fn exited(run_id: Uuid, pid: u32, code: Option<i32>, signal: Option<i32>) -> Self {
        Self {
            run_id,
            pid,
            reason: ExitReason::Exited,
            code,
            signal,
            finished_at: SystemTime::now(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}
