//! Plain data: configuration, snapshots and meal events.

pub mod config;
pub mod snapshot;

pub use config::*;
pub use snapshot::*;
