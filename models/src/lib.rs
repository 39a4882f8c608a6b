//! Domain models for the RealSense bridge.
//!
//! This crate contains pure data structures describing a launched face-tracking
//! script and the HTTP payloads exchanged with the Web UI. Models carry validation
//! but no process or I/O logic.

pub mod api;
pub mod error;
pub mod exit_info;
pub mod function_id;
pub mod server_address;
mod timestamp;
pub mod tracker_info;

pub use api::{ApiStatus, ErrorResponse, StartRequest, StartResponse, StopResponse};
pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use exit_info::{ExitInfo, ExitReason};
pub use function_id::FunctionId;
pub use server_address::ServerAddress;
pub use tracker_info::TrackerInfo;
pub use tracker_info::builder::TrackerInfoBuilder;

#[cfg(test)]
mod tests;
