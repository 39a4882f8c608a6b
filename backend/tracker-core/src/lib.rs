pub mod config;
pub mod error;
pub mod launcher;

#[cfg(test)]
mod tests;

pub const APP_NAME: &str = "realsense-bridge";
pub const DEFAULT_SCRIPT: &str = "main_example.py";
pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const SERVER_FLAG: &str = "--server";
pub const FUNCTION_FLAG: &str = "--function";
pub const LOG_FILE_NAME: &str = const_format::concatcp!(APP_NAME, ".log");
