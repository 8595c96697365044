//! # Framework Errors
//!
//! Errors shared by every actor and lock backend in the crate.

use std::io;

/// Errors that can occur when talking to an actor over its channel.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
}

/// Faults raised by a [`LockHandle`](crate::framework::LockHandle) backend.
///
/// A fault during `try_acquire` is never fatal: philosophers treat it the same
/// way as finding the fork already held.
#[derive(Debug, thiserror::Error)]
pub enum ForkError {
    #[error("Fork {index} I/O error: {source}")]
    Io {
        index: usize,
        #[source]
        source: io::Error,
    },
    #[error("Fork {0} unavailable")]
    Unavailable(usize),
}
