//! Shared building blocks for the RealSense bridge workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): cross-cutting helpers used by every layer
//! - **models**: Pure data structures
//! - **tracker-core**: Business logic operating on models
//! - **realsense-bridge**: HTTP application wiring everything together

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
