mod realsense;

use crate::error::BridgeError;
use crate::state::AppState;

use models::ErrorResponse;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::debug;
use tower_http::cors::CorsLayer;

pub use realsense::{StatusResponse, realsense_status, start_realsense, stop_realsense};

pub const START_PATH: &str = "/api/start-realsense/";
pub const STOP_PATH: &str = "/api/stop-realsense/";
pub const STATUS_PATH: &str = "/api/realsense-status/";

/// Build the HTTP surface. Each API route also answers without its trailing slash.
pub fn build_router(state: AppState, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route(START_PATH, post(start_realsense))
        .route(START_PATH.trim_end_matches('/'), post(start_realsense))
        .route(STOP_PATH, post(stop_realsense))
        .route(STOP_PATH.trim_end_matches('/'), post(stop_realsense))
        .route(STATUS_PATH, get(realsense_status))
        .route(STATUS_PATH.trim_end_matches('/'), get(realsense_status))
        .with_state(state);

    if cors_permissive {
        debug!("Permissive CORS enabled");
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn health_check() -> &'static str {
    "ok"
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// HTTP mapping of [`BridgeError`]. The body is always `{status: "error", message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<BridgeError> for ApiError {
    fn from(error: BridgeError) -> Self {
        let message = error.message().to_string();
        match error {
            BridgeError::InvalidRequest { .. } => ApiError::BadRequest(message),
            BridgeError::AlreadyRunning { .. } => ApiError::Conflict(message),
            BridgeError::Bridge { .. }
            | BridgeError::Launch { .. }
            | BridgeError::StopFailed { .. }
            | BridgeError::Config { .. } => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
