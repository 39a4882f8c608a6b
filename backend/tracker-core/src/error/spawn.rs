use common::ErrorLocation;

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SpawnError {
    #[error("Script Not Found Error: {} does not exist {location}", path.display())]
    ScriptNotFound {
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Interpreter Not Found Error: {message} {location}")]
    InterpreterNotFound {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Permission Error: {message} {location}")]
    Permission {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Spawn Error: {message} {location}")]
    Spawn {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Early Exit Error: {message} {location}")]
    EarlyExit {
        message: String,
        code: Option<i32>,
        stderr_tail: Vec<String>,
        location: ErrorLocation,
    },

    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },
}

impl From<models::ModelError> for SpawnError {
    #[track_caller]
    fn from(error: models::ModelError) -> Self {
        SpawnError::Validation {
            message: error.to_string(),
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}
