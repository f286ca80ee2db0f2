//! Command implementations.
//!
//! Each module is one top-level subcommand. All of them load the engine
//! configuration from the environment, perform their calls, and print a
//! plain-text result; status and failure detail go through `tracing`.

use thiserror::Error;

use tally_engine::{ConfigError, EngineConfig, EngineError, ImportError, RemoteClient, RemoteError};

pub mod categories;
pub mod import;
pub mod products;
pub mod sales;

/// Errors surfaced to the user by any command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Environment configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An engine operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A direct remote call failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A CSV upload was refused or failed in transit.
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// User-supplied input that fails local validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Build a remote client from the environment.
pub fn client() -> Result<(EngineConfig, RemoteClient), CliError> {
    let config = EngineConfig::from_env()?;
    let client = RemoteClient::new(&config)?;
    Ok((config, client))
}
