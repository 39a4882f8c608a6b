//! JSON payloads of the RealSense control endpoints.

use crate::FunctionId;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Body of `POST /api/start-realsense/`.
///
/// `server_address` is optional at the serde level so that a missing field is
/// reported with the same JSON error shape as an invalid one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub server_address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub status: ApiStatus,
    pub message: String,
    pub function_id: FunctionId,
}

impl StartResponse {
    pub fn success(message: impl Into<String>, function_id: FunctionId) -> Self {
        Self {
            status: ApiStatus::Success,
            message: message.into(),
            function_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StopResponse {
    pub status: ApiStatus,
    pub message: String,
}

impl StopResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Success,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: ApiStatus,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            message: message.into(),
        }
    }
}
