//! Environment overrides for [`AppConfig`].
//!
//! Lookup order for every overridable key:
//! 1. Process environment (including values loaded from `.env`)
//! 2. Config file
//! 3. Built-in default

use crate::config::AppConfig;

use std::env;
use std::path::PathBuf;

use log::{debug, info, warn};

pub const BIND_ENV: &str = "REALSENSE_BIND";
pub const SCRIPT_ENV: &str = "REALSENSE_SCRIPT";
pub const INTERPRETER_ENV: &str = "REALSENSE_PYTHON";
pub const WORKDIR_ENV: &str = "REALSENSE_WORKDIR";
pub const LOG_LEVEL_ENV: &str = "REALSENSE_LOG";

const DOTENV_FILE_NAME: &str = ".env";

/// Result of attempting to load a `.env` file.
#[derive(Debug, Clone)]
pub struct EnvLoadResult {
    pub path: Option<PathBuf>,
    pub loaded: bool,
}

/// Attempts to load `.env` from the working directory, then from the
/// executable's directory.
pub fn try_load_dotenv() -> EnvLoadResult {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return EnvLoadResult {
            path: Some(path),
            loaded: true,
        };
    }

    if let Ok(exe_path) = env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let env_path = exe_dir.join(DOTENV_FILE_NAME);
        if env_path.exists() {
            match dotenvy::from_path(&env_path) {
                Ok(()) => {
                    info!("Loaded .env from: {:?}", env_path);
                    return EnvLoadResult {
                        path: Some(env_path),
                        loaded: true,
                    };
                }
                Err(e) => {
                    warn!("Failed to parse .env at {:?}: {}", env_path, e);
                }
            }
        }
    }

    debug!("No .env file found");
    EnvLoadResult {
        path: None,
        loaded: false,
    }
}

fn read_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Ok(_) => None,
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(_)) => {
            warn!("{name} contains invalid unicode, ignoring");
            None
        }
    }
}

impl AppConfig {
    /// Apply `REALSENSE_*` environment variables on top of the loaded file.
    ///
    /// Call [`AppConfig::validate`] afterwards; overrides are not validated here.
    pub fn apply_env_overrides(&mut self) {
        if let Some(bind) = read_var(BIND_ENV) {
            debug!("{BIND_ENV} overrides server.bind: {bind}");
            self.server.bind = bind;
        }

        if let Some(script) = read_var(SCRIPT_ENV) {
            debug!("{SCRIPT_ENV} overrides tracker.script_path: {script}");
            self.tracker.script_path = PathBuf::from(script);
        }

        // An explicitly empty interpreter is meaningful (run the script directly).
        if let Ok(interpreter) = env::var(INTERPRETER_ENV) {
            debug!("{INTERPRETER_ENV} overrides tracker.interpreter: {interpreter:?}");
            self.tracker.interpreter = interpreter.trim().to_string();
        }

        if let Some(dir) = read_var(WORKDIR_ENV) {
            debug!("{WORKDIR_ENV} overrides tracker.working_dir: {dir}");
            self.tracker.working_dir = Some(PathBuf::from(dir));
        }

        if let Some(level) = read_var(LOG_LEVEL_ENV) {
            debug!("{LOG_LEVEL_ENV} overrides logging.level: {level}");
            self.logging.level = Some(level);
        }
    }
}
