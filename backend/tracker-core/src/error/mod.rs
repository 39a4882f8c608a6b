pub mod config;
pub mod process;
pub mod spawn;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Spawn(#[from] spawn::SpawnError),

    #[error(transparent)]
    Process(#[from] process::ProcessError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
