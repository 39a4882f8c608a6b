pub mod builder;

use crate::{FunctionId, ServerAddress};

use std::time::{Duration, SystemTime};

use serde::Serialize;
use uuid::Uuid;

/// A launched tracking script owned by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerInfo {
    pub run_id: Uuid,
    pub pid: u32,
    pub server_address: ServerAddress,
    pub function_id: FunctionId,
    pub command: String,
    #[serde(serialize_with = "crate::timestamp::serialize_rfc3339")]
    pub started_at: SystemTime,
}

impl TrackerInfo {
    /// Time since launch. Zero if the system clock moved backwards.
    pub fn uptime(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.started_at)
            .unwrap_or_default()
    }
}
