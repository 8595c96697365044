//! # Lock Handles
//!
//! This module defines the one capability the simulation needs from a fork:
//! a non-blocking try-acquire and a best-effort release.
//!
//! ## Key Types
//!
//! - [`LockHandle`]: The trait every fork backend implements.
//! - [`ForkGuard`]: RAII claim on a fork. Dropping it releases the fork.
//! - [`AtomicFork`]: In-memory backend built on a single `AtomicBool`.
//!
//! There is no owner token. Any caller may release any fork, which matches the
//! advisory-lock semantics of the filesystem backend. Callers are expected to
//! release only what they acquired, and [`ForkGuard`] is how the philosophers
//! make sure of that.

use crate::framework::error::ForkError;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// A shared, exclusive resource connecting two adjacent philosophers.
///
/// # Contract
/// - `try_acquire` never blocks waiting for the fork. It answers `Ok(true)` and
///   moves the fork from free to held iff it was free, `Ok(false)` otherwise.
///   Concurrent callers must observe test-and-set semantics.
/// - `release` moves the fork back to free. Releasing a free fork is not an error.
/// - An `Err` from either method is a backend fault. Callers treat a failed
///   acquisition fault like `Ok(false)` and swallow release faults.
///
/// `release` is synchronous so it can run from [`ForkGuard`]'s `Drop`.
#[async_trait]
pub trait LockHandle: Send + Sync + 'static {
    /// Position of this fork in the ring.
    fn index(&self) -> usize;

    /// Attempt to take the fork without waiting.
    async fn try_acquire(&self) -> Result<bool, ForkError>;

    /// Give the fork back.
    fn release(&self) -> Result<(), ForkError>;
}

/// Shared handle to a fork. The same `Arc` is handed to both neighbours.
pub type SharedFork = Arc<dyn LockHandle>;

/// A claim on one fork, released when dropped.
///
/// # Architecture Note
/// Tying release to `Drop` gives one code path for every way a philosopher can
/// let go of a fork: the second fork was busy, the meal finished, or the task
/// panicked or was aborted mid-meal. Unwinding drops the guard, so a faulted
/// philosopher never strands a fork its neighbour is polling for.
#[must_use = "dropping a ForkGuard releases the fork immediately"]
pub struct ForkGuard {
    fork: SharedFork,
}

impl ForkGuard {
    /// Try to claim `fork` once.
    ///
    /// Returns `None` when the fork is held elsewhere or the backend faulted.
    pub async fn try_claim(fork: &SharedFork) -> Option<Self> {
        match fork.try_acquire().await {
            Ok(true) => Some(Self { fork: Arc::clone(fork) }),
            Ok(false) => None,
            Err(e) => {
                debug!(fork = fork.index(), error = %e, "Acquire fault treated as busy");
                None
            }
        }
    }

    /// Index of the claimed fork.
    pub fn index(&self) -> usize {
        self.fork.index()
    }
}

impl Drop for ForkGuard {
    fn drop(&mut self) {
        if let Err(e) = self.fork.release() {
            warn!(fork = self.fork.index(), error = %e, "Release fault ignored");
        }
    }
}

impl fmt::Debug for ForkGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkGuard").field("fork", &self.index()).finish()
    }
}

/// In-memory fork backed by an `AtomicBool`.
#[derive(Debug, Default)]
pub struct AtomicFork {
    index: usize,
    held: AtomicBool,
}

impl AtomicFork {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            held: AtomicBool::new(false),
        }
    }

    /// Convenience constructor returning the shared handle directly.
    pub fn shared(index: usize) -> SharedFork {
        Arc::new(Self::new(index))
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

#[async_trait]
impl LockHandle for AtomicFork {
    fn index(&self) -> usize {
        self.index
    }

    async fn try_acquire(&self) -> Result<bool, ForkError> {
        Ok(self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok())
    }

    fn release(&self) -> Result<(), ForkError> {
        self.held.store(false, Ordering::Release);
        Ok(())
    }
}
