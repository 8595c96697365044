//! Simulation configuration.

use crate::lifecycle::DiningError;
use crate::ring::ForkOrdering;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parameters supplied by the bootstrap layer.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// philosophers = 5
/// food_quota = 20
/// seed = 7
///
/// [backend.file]
/// dir = "/tmp/dining"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of philosophers (and forks) around the table.
    pub philosophers: usize,

    /// Food each philosopher must finish before leaving.
    pub food_quota: u32,

    /// Upper bound on a single sitting. Each meal eats `1..=max_food_per_sitting`.
    pub max_food_per_sitting: u32,

    /// Upper bound on a thinking pause, in milliseconds.
    pub max_think_ms: u64,

    /// Time spent holding both forks per unit of food eaten, in milliseconds.
    pub eat_ms_per_unit: u64,

    /// Pause between failed acquisition attempts, in milliseconds.
    pub retry_backoff_ms: u64,

    /// Which of its two forks each philosopher reaches for first.
    pub ordering: ForkOrdering,

    /// Where the forks live.
    pub backend: ForkBackend,

    /// Seed for reproducible think times and portion sizes.
    pub seed: Option<u64>,

    /// Channel capacity of the scoreboard actor.
    pub scoreboard_buffer: usize,
}

/// Fork storage backend.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ForkBackend {
    /// Atomic flags in process memory.
    #[default]
    Memory,
    /// One lock file per fork under `dir`.
    File { dir: PathBuf },
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            philosophers: 15,
            food_quota: 50,
            max_food_per_sitting: 10,
            max_think_ms: 300,
            eat_ms_per_unit: 100,
            retry_backoff_ms: 10,
            ordering: ForkOrdering::default(),
            backend: ForkBackend::default(),
            seed: None,
            scoreboard_buffer: 32,
        }
    }
}

impl SimulationConfig {
    /// Default configuration with the two parameters that matter most.
    pub fn new(philosophers: usize, food_quota: u32) -> Self {
        Self {
            philosophers,
            food_quota,
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, DiningError> {
        let config: Self = toml::from_str(source)
            .map_err(|e| DiningError::Configuration(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiningError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Rejects configurations the simulation cannot run.
    pub fn validate(&self) -> Result<(), DiningError> {
        if self.philosophers < 2 {
            return Err(DiningError::Configuration(format!(
                "at least 2 philosophers are required, got {}",
                self.philosophers
            )));
        }
        if self.max_food_per_sitting == 0 {
            return Err(DiningError::Configuration(
                "max_food_per_sitting must be positive".to_string(),
            ));
        }
        if self.scoreboard_buffer == 0 {
            return Err(DiningError::Configuration(
                "scoreboard_buffer must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            max_think: Duration::from_millis(self.max_think_ms),
            eat_per_unit: Duration::from_millis(self.eat_ms_per_unit),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            max_food_per_sitting: self.max_food_per_sitting,
        }
    }

    /// Per-philosopher RNG seed, derived from the table seed.
    pub fn seed_for(&self, index: usize) -> Option<u64> {
        self.seed
            .map(|seed| seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)))
    }
}

/// Delays and portion bounds that drive one philosopher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub max_think: Duration,
    pub eat_per_unit: Duration,
    pub retry_backoff: Duration,
    pub max_food_per_sitting: u32,
}

impl Default for Timing {
    fn default() -> Self {
        SimulationConfig::default().timing()
    }
}
