use realsense_bridge::cli::{Cli, Commands};
use realsense_bridge::commands::tracker::{find_orphans, stop_tracker};
use realsense_bridge::error::BridgeError;
use realsense_bridge::logger::initialize as LoggerInitialize;
use realsense_bridge::routes::build_router;
use realsense_bridge::state::AppState;

use common::ErrorLocation;
use tracker_core::config::AppConfig;
use tracker_core::config::env::try_load_dotenv;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("realsense-bridge: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), BridgeError> {
    let dotenv = try_load_dotenv();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::default_path()?,
    };

    if let Commands::InitConfig { force } = cli.command() {
        return init_config(&config_path, force);
    }

    let mut config = AppConfig::load(&config_path)?;
    config.apply_env_overrides();
    cli.apply_overrides(&mut config);
    config.validate()?;

    let log_dir = config.logging.resolved_dir()?;
    create_dir_all(&log_dir).map_err(|e| BridgeError::Bridge {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir, config.logging.level_filter()?)?;

    info!("RealSense bridge starting");
    info!("Config file: {}", config_path.display());
    info!("Log directory: {}", log_dir.display());
    if let Some(path) = &dotenv.path {
        info!("Environment loaded from {}", path.display());
    }
    info!(
        "Script: {} (interpreter: {:?})",
        config.tracker.resolved_script_path().display(),
        config.tracker.interpreter
    );

    let orphans = find_orphans(&config.tracker).await;
    if !orphans.is_empty() {
        warn!(
            "RealSense script already running outside the bridge (PIDs {orphans:?}); \
             the stop endpoint will end them"
        );
    }

    let state = AppState::new(config.tracker.clone());
    let app = build_router(state.clone(), config.server.cors_permissive);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .map_err(|e| BridgeError::Bridge {
            message: format!("Failed to bind {}: {e}", config.server.bind),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("RealSense bridge listening on {}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BridgeError::Bridge {
            message: format!("Server error: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if config.tracker.stop_on_shutdown {
        match stop_tracker(&state, false).await {
            Ok(outcome) if outcome.stopped.is_some() => info!("{}", outcome.message()),
            Ok(_) => {}
            Err(e) => error!("Failed to stop RealSense module on shutdown: {e}"),
        }
    }

    info!("RealSense bridge stopped");
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<(), BridgeError> {
    if path.exists() && !force {
        return Err(BridgeError::Config {
            message: format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    AppConfig::default().save(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
