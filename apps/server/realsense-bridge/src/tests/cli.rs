use crate::cli::{Cli, Commands};

use tracker_core::config::AppConfig;

use std::path::PathBuf;

use clap::Parser;

/// **VALUE**: Verifies that no subcommand means `serve`.
///
/// **WHY THIS MATTERS**: Service units start the bridge with no arguments.
#[test]
fn given_no_arguments_when_parsed_then_command_is_serve() {
    let cli = Cli::try_parse_from(["realsense-bridge"]).unwrap();

    assert_eq!(cli.command(), Commands::Serve);
    assert!(cli.config.is_none());
}

/// **VALUE**: Verifies `--config` is accepted after the `init-config` subcommand.
#[test]
fn given_init_config_with_force_when_parsed_then_returns_init_config() {
    let cli = Cli::try_parse_from([
        "realsense-bridge",
        "init-config",
        "--force",
        "--config",
        "/tmp/bridge.toml",
    ])
    .unwrap();

    assert_eq!(cli.command(), Commands::InitConfig { force: true });
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/bridge.toml")));
}

/// **VALUE**: Verifies CLI flags override config values and leave the rest alone.
///
/// **BUG THIS CATCHES**: Would catch if `--bind` or `--log-dir` is parsed but never applied.
#[test]
fn given_bind_and_log_dir_flags_when_applied_then_override_config() {
    // GIVEN: Flags on the command line
    let cli = Cli::try_parse_from([
        "realsense-bridge",
        "--bind",
        "0.0.0.0:8080",
        "--log-dir",
        "/var/log/realsense",
    ])
    .unwrap();
    let mut config = AppConfig::default();

    // WHEN: Applying
    cli.apply_overrides(&mut config);

    // THEN: Only those two values change
    assert_eq!(config.server.bind, "0.0.0.0:8080");
    assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/realsense")));
    assert_eq!(config.tracker, AppConfig::default().tracker);
}
