//! Error types for starting a simulation.

use crate::framework::ForkError;
use thiserror::Error;

/// Errors that stop a simulation before any philosopher sits down.
#[derive(Debug, Error)]
pub enum DiningError {
    /// The configuration is invalid (too few philosophers, zero portion size, bad TOML).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The fork backend could not create a fork.
    #[error("Fork backend error: {0}")]
    Fork(#[from] ForkError),

    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
