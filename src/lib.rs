//! # Dining Philosophers
//!
//! > **N philosophers, N forks, one ring, no deadlock.**
//!
//! Each philosopher is an independent Tokio task that thinks, picks up the two
//! forks it shares with its neighbours, eats, puts them down, and repeats
//! until its food quota is gone. The coordinator waits for all of them.
//!
//! ## Core Concepts
//!
//! ### Forks are a capability, not a mutex
//! A fork only has to answer a non-blocking `try_acquire` and accept a
//! `release` ([`LockHandle`](framework::LockHandle)). The same protocol runs
//! over in-memory atomics or over lock files on disk.
//!
//! ### Release on partial failure
//! A philosopher that gets its first fork but not its second puts the first one
//! back before trying again. No one ever waits while holding a fork, so the
//! circular wait behind the classic deadlock cannot form, whatever order the
//! forks are picked up in.
//!
//! ### One writer for the status line
//! Remaining quotas are reported to a single scoreboard actor over a channel
//! instead of being read from shared memory. The scoreboard prints one line
//! per meal and keeps the meal log.
//!
//! ## Module Tour
//!
//! - [`framework`] - `LockHandle`, `ForkGuard`, fork backends, mock forks
//! - [`ring`] - Builds the forks and assigns two to every philosopher
//! - [`philosopher_actor`] - The think / acquire / eat state machine
//! - [`scoreboard_actor`] - Serialized snapshots and the meal log
//! - [`clients`] - `ScoreboardClient`
//! - [`lifecycle`] - `DiningSystem`, the join barrier, tracing setup
//! - [`model`] - Configuration, snapshots, meal events
//!
//! ## Quick Start
//!
//! ```rust
//! #[tokio::main]
//! async fn main() -> Result<(), dining_philosophers::lifecycle::DiningError> {
//!     let config = dining_philosophers::model::SimulationConfig {
//!         max_think_ms: 2,
//!         eat_ms_per_unit: 1,
//!         ..dining_philosophers::model::SimulationConfig::new(5, 10)
//!     };
//!     let report = dining_philosophers::lifecycle::run_with_config(&config).await?;
//!     assert!(report.all_done());
//!     Ok(())
//! }
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod philosopher_actor;
pub mod ring;
pub mod scoreboard_actor;
