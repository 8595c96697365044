//! Typed wrappers around actor channels.

pub mod scoreboard_client;

pub use scoreboard_client::*;
