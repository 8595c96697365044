//! Fork capability and actor plumbing shared by the whole simulation.
//!
//! # Main Components
//!
//! - [`LockHandle`] - The try-acquire / release contract every fork backend implements
//! - [`ForkGuard`] - RAII claim on a fork, released on drop
//! - [`AtomicFork`] - In-memory backend
//! - [`FileFork`] - Lock-file backend
//! - [`FrameworkError`], [`ForkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] for scripted forks with fault injection and instrumentation.

pub mod error;
pub mod file_fork;
pub mod fork;
pub mod mock;

pub use error::{ForkError, FrameworkError};
pub use file_fork::FileFork;
pub use fork::{AtomicFork, ForkGuard, LockHandle, SharedFork};
