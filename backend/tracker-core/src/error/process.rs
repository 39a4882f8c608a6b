use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ProcessError {
    #[error("Stop Error: {message} {location}")]
    StopFailed {
        pid: u32,
        message: String,
        location: ErrorLocation,
    },
}
