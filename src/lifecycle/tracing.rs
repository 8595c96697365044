//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the subscriber for the whole simulation.
//!
//! ## What Gets Traced
//!
//! - **Table**: Ring construction, dinner start and end
//! - **Philosophers**: Seating, state transitions (`debug`), acquisition misses (`debug`), done
//! - **Scoreboard**: One `info` status line per meal, in seat order
//! - **Faults**: Swallowed release faults (`warn`), early exits (`warn`), panics (`error`)
//!
//! Every philosopher task runs inside a `philosopher{index=N}` span.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Status lines only
//! RUST_LOG=info cargo run
//!
//! # Watch every philosopher change state and fight over forks
//! RUST_LOG=debug cargo run
//!
//! # Only the acquisition protocol
//! RUST_LOG=dining_philosophers::philosopher_actor=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a dinner of three looks like:
//!
//! ```text
//! INFO Dinner started philosophers=3 food_quota=5
//! INFO philosopher: Philosopher seated philosopher=0 quota=5 first=0 second=2
//! INFO 0 [5] 1 [2] 2 [5]
//! INFO 0 [1] 1 [2] 2 [5]
//! ...
//! INFO All philosophers are done eating meals=7
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
