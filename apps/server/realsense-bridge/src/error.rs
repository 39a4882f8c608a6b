use common::ErrorLocation;
use models::ModelError;
use tracker_core::error::config::ConfigError;
use tracker_core::error::process::ProcessError;
use tracker_core::error::spawn::SpawnError;

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the bridge application.
///
/// Core errors are flattened into a message plus the location where the bridge
/// received them, so they can be logged and serialized uniformly.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BridgeError {
    /// Error from this App (logger, listener, state actor)
    #[error("Bridge Error: {message} {location}")]
    Bridge {
        message: String,
        location: ErrorLocation,
    },

    /// Request body or parameters were rejected
    #[error("Invalid Request Error: {message} {location}")]
    InvalidRequest {
        message: String,
        location: ErrorLocation,
    },

    /// A tracked script is already running
    #[error("Already Running Error: {message} {location}")]
    AlreadyRunning {
        pid: u32,
        message: String,
        location: ErrorLocation,
    },

    /// The script could not be launched
    #[error("Launch Error: {message} {location}")]
    Launch {
        message: String,
        location: ErrorLocation,
    },

    /// The script could not be terminated
    #[error("Stop Error: {message} {location}")]
    StopFailed {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be loaded, validated or written
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },
}

impl BridgeError {
    /// The message without the type prefix and location, as shown to API clients.
    pub fn message(&self) -> &str {
        match self {
            BridgeError::Bridge { message, .. }
            | BridgeError::InvalidRequest { message, .. }
            | BridgeError::AlreadyRunning { message, .. }
            | BridgeError::Launch { message, .. }
            | BridgeError::StopFailed { message, .. }
            | BridgeError::Config { message, .. } => message,
        }
    }
}

impl From<ModelError> for BridgeError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        let ModelError::Validation { message, .. } = error;
        BridgeError::InvalidRequest {
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<SpawnError> for BridgeError {
    #[track_caller]
    fn from(error: SpawnError) -> Self {
        let message = match &error {
            SpawnError::ScriptNotFound { path, .. } => {
                format!("RealSense script not found: {}", path.display())
            }
            SpawnError::InterpreterNotFound { message, .. }
            | SpawnError::Permission { message, .. }
            | SpawnError::Spawn { message, .. }
            | SpawnError::EarlyExit { message, .. }
            | SpawnError::Validation { message, .. } => message.clone(),
        };

        BridgeError::Launch {
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ProcessError> for BridgeError {
    #[track_caller]
    fn from(error: ProcessError) -> Self {
        let ProcessError::StopFailed { message, .. } = error;
        BridgeError::StopFailed {
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for BridgeError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        BridgeError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
