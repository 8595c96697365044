//! Error types for the Philosopher actor.

use crate::framework::FrameworkError;
use thiserror::Error;

/// Faults that end one philosopher's dinner early.
///
/// Fork contention and fork backend faults never show up here: those are
/// retried inside the acquisition loop.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PhilosopherError {
    /// The scoreboard stopped answering, so meals can no longer be reported.
    #[error("Scoreboard unavailable: {0}")]
    ScoreboardUnavailable(#[from] FrameworkError),

    /// The philosopher's task panicked.
    #[error("Philosopher panicked: {0}")]
    Panicked(String),

    /// The philosopher's task was cancelled before it finished.
    #[error("Philosopher aborted")]
    Aborted,
}
