pub mod env;

use crate::error::config::ConfigError;
use crate::{APP_NAME, DEFAULT_BIND, DEFAULT_INTERPRETER, DEFAULT_SCRIPT};

use common::ErrorLocation;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_DIR_NAME: &str = "logs";
const CONFIG_VERSION: u32 = 1;
const MAX_OUTPUT_LINES: usize = 10_000;
const MAX_STOP_TIMEOUT_SECS: u64 = 300;
const MAX_STARTUP_GRACE_MS: u64 = 30_000;

#[cfg(debug_assertions)]
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_permissive: false,
        }
    }
}

/// How the face-tracking script is launched and torn down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackerConfig {
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,
    /// Program used to run the script. Empty runs the script directly.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Windows only: give the script its own console window.
    #[serde(default)]
    pub new_console: bool,
    #[serde(default = "default_startup_grace_ms")]
    pub startup_grace_ms: u64,
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
    #[serde(default = "default_output_lines")]
    pub output_lines: usize,
    #[serde(default = "default_true")]
    pub sweep_orphans: bool,
    #[serde(default = "default_true")]
    pub stop_on_shutdown: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            script_path: default_script_path(),
            interpreter: default_interpreter(),
            working_dir: None,
            env: BTreeMap::new(),
            new_console: false,
            startup_grace_ms: default_startup_grace_ms(),
            stop_timeout_secs: default_stop_timeout_secs(),
            output_lines: default_output_lines(),
            sweep_orphans: true,
            stop_on_shutdown: true,
        }
    }
}

impl TrackerConfig {
    /// Script path resolved against `working_dir` when relative.
    pub fn resolved_script_path(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) if self.script_path.is_relative() => dir.join(&self.script_path),
            _ => self.script_path.clone(),
        }
    }

    pub fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// One of off, error, warn, info, debug, trace. Unset picks the build default.
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        match &self.level {
            None => Ok(DEFAULT_LOG_LEVEL),
            Some(level) => {
                LevelFilter::from_str(level).map_err(|_| ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!(
                        "Invalid log level: {level} (expected off, error, warn, info, debug or trace)"
                    ),
                })
            }
        }
    }

    /// Configured log directory, else the platform data directory.
    pub fn resolved_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }

        dirs::data_local_dir()
            .map(|dir| dir.join(APP_NAME).join(LOG_DIR_NAME))
            .ok_or_else(|| ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("No platform data directory for logs; set logging.dir"),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            tracker: TrackerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_script_path() -> PathBuf {
    PathBuf::from(DEFAULT_SCRIPT)
}
fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}
fn default_startup_grace_ms() -> u64 {
    500
}
fn default_stop_timeout_secs() -> u64 {
    5
}
fn default_output_lines() -> usize {
    200
}
fn default_true() -> bool {
    true
}

// ============================================
// IMPLEMENTATION
// ============================================

impl AppConfig {
    /// Platform config file location: `{config_dir}/realsense-bridge/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("No platform config directory; pass --config"),
            })
    }

    /// Load config from a TOML file.
    ///
    /// A missing file yields defaults. A file that exists but cannot be read or
    /// parsed is an error. Values are not validated here so environment and CLI
    /// overrides can still correct them; call [`AppConfig::validate`] afterwards.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.to_path_buf(),
                source: e,
            }
        })?;

        let config = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::ParseError { location, reason, .. } => ConfigError::ParseError {
                location,
                path: config_path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Parse config text without validating it.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            location: ErrorLocation::from(Location::caller()),
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }

    /// Save config as TOML using temp file + rename, so a crash never leaves a
    /// half-written file behind.
    pub fn save(&self, config_path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        let config_dir = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let mut temp_name = config_path.as_os_str().to_os_string();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, contents).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.to_path_buf(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid bind address: {} (expected ip:port)",
                    self.server.bind
                ),
            });
        }

        if self.tracker.script_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("tracker.script_path cannot be empty"),
            });
        }

        if self.tracker.output_lines == 0 || self.tracker.output_lines > MAX_OUTPUT_LINES {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid output_lines: {} (must be 1-{MAX_OUTPUT_LINES})",
                    self.tracker.output_lines
                ),
            });
        }

        if self.tracker.stop_timeout_secs == 0
            || self.tracker.stop_timeout_secs > MAX_STOP_TIMEOUT_SECS
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid stop_timeout_secs: {} (must be 1-{MAX_STOP_TIMEOUT_SECS})",
                    self.tracker.stop_timeout_secs
                ),
            });
        }

        if self.tracker.startup_grace_ms > MAX_STARTUP_GRACE_MS {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid startup_grace_ms: {} (must be 0-{MAX_STARTUP_GRACE_MS})",
                    self.tracker.startup_grace_ms
                ),
            });
        }

        self.logging.level_filter()?;

        Ok(())
    }
}
