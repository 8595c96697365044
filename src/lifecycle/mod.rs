//! # Simulation Lifecycle
//!
//! Starting a dinner, waiting for it to finish, and the logging around it.
//!
//! ## The DiningSystem Pattern
//!
//! ```rust,ignore
//! // 1. Build the ring and spawn the scoreboard plus one task per philosopher
//! let system = DiningSystem::start(&config)?;
//!
//! // 2. Join barrier: resolves once every philosopher is Done or faulted
//! let report = system.join().await;
//! ```
//!
//! There is no shutdown signal. Philosophers leave when their quota is used
//! up, and the scoreboard stops once the coordinator drops the last client
//! after the join.
//!
//! ## Fault Isolation
//!
//! A philosopher whose task panics or whose scoreboard disappears ends early
//! and is reported with a [`PhilosopherError`](crate::philosopher_actor::PhilosopherError)
//! in its [`PhilosopherReport`]. Its forks are released as the task unwinds,
//! so the rest of the table is unaffected.

pub mod dining_system;
pub mod error;
pub mod tracing;

pub use dining_system::*;
pub use error::*;
pub use self::tracing::setup_tracing;
