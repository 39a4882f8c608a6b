#[cfg(unix)]
mod realsense;
