use tracker_core::config::AppConfig;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::debug;

#[derive(Parser, Debug)]
#[command(name = "realsense-bridge")]
#[command(about = "HTTP bridge that starts and stops the RealSense face-tracking script")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Listen address, overrides server.bind
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Log directory, overrides logging.dir
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default behavior if no command specified)
    Serve,

    /// Write the default config file and exit
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Apply command-line flags on top of file and environment values.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            debug!("--bind overrides server.bind: {bind}");
            config.server.bind = bind.clone();
        }

        if let Some(dir) = &self.log_dir {
            debug!("--log-dir overrides logging.dir: {}", dir.display());
            config.logging.dir = Some(dir.clone());
        }
    }

    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
