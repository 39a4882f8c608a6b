use crate::commands::tracker::{self, STARTED_MESSAGE};
use crate::error::BridgeError;
use crate::routes::{ApiError, ApiResult};
use crate::state::AppState;

use common::ErrorLocation;
use models::{
    ApiStatus, ExitInfo, FunctionId, ServerAddress, StartRequest, StartResponse, StopResponse,
    TrackerInfo,
};
use tracker_core::launcher::OutputLine;

use std::panic::Location;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use log::{error, info, warn};
use serde::Serialize;

const RECENT_OUTPUT_LINES: usize = 50;

/// `GET /api/realsense-status/` body.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: ApiStatus,
    pub running: bool,
    pub tracker: Option<TrackerInfo>,
    pub uptime_secs: Option<u64>,
    pub last_exit: Option<ExitInfo>,
    pub recent_output: Vec<OutputLine>,
}

/// `POST /api/start-realsense/` with `{"server_address": "..."}`.
pub async fn start_realsense(
    State(state): State<AppState>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> ApiResult<StartResponse> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected start request body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    let address = parse_address(request.server_address)?;
    info!("Start requested for server {address}");

    let info = tracker::start_tracker(&state, address)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(StartResponse::success(
        format!("{STARTED_MESSAGE} (PID {})", info.pid),
        FunctionId::FACE_RECOGNITION,
    )))
}

fn parse_address(raw: Option<String>) -> Result<ServerAddress, ApiError> {
    let raw = raw.ok_or_else(|| {
        ApiError::from(BridgeError::InvalidRequest {
            message: String::from("server_address is required"),
            location: ErrorLocation::from(Location::caller()),
        })
    })?;

    ServerAddress::parse(&raw).map_err(|e| {
        warn!("Rejected server address {raw:?}: {e}");
        ApiError::from(BridgeError::from(e))
    })
}

/// `POST /api/stop-realsense/`. Succeeds when nothing is running.
pub async fn stop_realsense(State(state): State<AppState>) -> ApiResult<StopResponse> {
    info!("Stop requested");

    let sweep = state.config().sweep_orphans;
    let outcome = tracker::stop_tracker(&state, sweep).await.map_err(|e| {
        error!("Failed to stop RealSense module: {e}");
        ApiError::from(e)
    })?;

    Ok(Json(StopResponse::success(outcome.message())))
}

/// `GET /api/realsense-status/`.
pub async fn realsense_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.snapshot().await;

    Json(StatusResponse {
        status: ApiStatus::Success,
        running: snapshot.current.is_some(),
        uptime_secs: snapshot.current.as_ref().map(|info| info.uptime().as_secs()),
        tracker: snapshot.current,
        last_exit: snapshot.last_exit,
        recent_output: recent_output(&state),
    })
}

fn recent_output(state: &AppState) -> Vec<OutputLine> {
    let lines = state.output().snapshot();
    let skip = lines.len().saturating_sub(RECENT_OUTPUT_LINES);
    lines.into_iter().skip(skip).collect()
}
