use crate::error::model_error::ModelError;
use crate::{ErrorLocation, FunctionId, ServerAddress, TrackerInfo};

use std::panic::Location;
use std::time::SystemTime;

use uuid::Uuid;

/// Builder for creating validated TrackerInfo instances.
///
/// `run_id`, `function_id` and `started_at` default to a fresh UUID, face
/// recognition and "now" respectively; everything else is required.
#[derive(Debug, Default)]
pub struct TrackerInfoBuilder {
    run_id: Option<Uuid>,
    pid: Option<u32>,
    server_address: Option<ServerAddress>,
    function_id: Option<FunctionId>,
    command: Option<String>,
    started_at: Option<SystemTime>,
}

impl TrackerInfoBuilder {
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_server_address(mut self, address: ServerAddress) -> Self {
        self.server_address = Some(address);
        self
    }

    pub fn with_function_id(mut self, function_id: FunctionId) -> Self {
        self.function_id = Some(function_id);
        self
    }

    pub fn with_command(mut self, cmd: impl Into<String>) -> Self {
        self.command = Some(cmd.into());
        self
    }

    pub fn with_started_at(mut self, started_at: SystemTime) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Build the TrackerInfo with validation.
    #[track_caller]
    pub fn build(self) -> Result<TrackerInfo, ModelError> {
        let pid = self.pid.ok_or_else(|| ModelError::Validation {
            message: String::from("PID is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if pid == 0 {
            return Err(ModelError::Validation {
                message: String::from("PID must be non-zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let server_address = self.server_address.ok_or_else(|| ModelError::Validation {
            message: String::from("Server address is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let command = self.command.ok_or_else(|| ModelError::Validation {
            message: String::from("Command is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if command.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Command cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(TrackerInfo {
            run_id: self.run_id.unwrap_or_else(Uuid::new_v4),
            pid,
            server_address,
            function_id: self.function_id.unwrap_or_default(),
            command,
            started_at: self.started_at.unwrap_or_else(SystemTime::now),
        })
    }
}
