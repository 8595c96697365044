use crate::clients::ScoreboardClient;
use crate::lifecycle::DiningError;
use crate::model::{MealEvent, SimulationConfig};
use crate::philosopher_actor::{Philosopher, PhilosopherError, PhilosopherOutcome};
use crate::ring::ForkRing;
use crate::scoreboard_actor::ScoreboardActor;
use std::any::Any;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, info_span, warn, Instrument};

type PhilosopherHandle = JoinHandle<Result<PhilosopherOutcome, PhilosopherError>>;

/// The simulation coordinator.
///
/// `DiningSystem` is responsible for:
/// - **Table Setup**: Building the fork ring from the configured backend
/// - **Wiring**: Handing every philosopher its seat and a scoreboard client
/// - **Join Barrier**: Waiting for every philosopher to finish, one way or another
///
/// # Example
///
/// ```rust
/// use dining_philosophers::lifecycle::DiningSystem;
/// use dining_philosophers::model::SimulationConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SimulationConfig {
///         max_think_ms: 1,
///         eat_ms_per_unit: 1,
///         retry_backoff_ms: 1,
///         ..SimulationConfig::new(3, 5)
///     };
///     let system = DiningSystem::start(&config)?;
///     let report = system.join().await;
///     assert_eq!(report.final_quotas(), vec![0, 0, 0]);
///     Ok(())
/// }
/// ```
pub struct DiningSystem {
    food_quota: u32,
    scoreboard: ScoreboardClient,
    scoreboard_handle: JoinHandle<()>,
    /// Task handles for every philosopher, in seat order
    philosophers: Vec<(usize, PhilosopherHandle)>,
}

impl DiningSystem {
    /// Validates `config`, builds the ring and starts every actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: &SimulationConfig) -> Result<Self, DiningError> {
        config.validate()?;
        let ring = ForkRing::from_backend(config.philosophers, config.ordering, &config.backend)?;
        Self::start_with_ring(config, ring)
    }

    /// Like [`start`](Self::start) but seats philosophers at a ring the caller
    /// built, for custom or instrumented fork backends.
    pub fn start_with_ring(config: &SimulationConfig, ring: ForkRing) -> Result<Self, DiningError> {
        config.validate()?;
        if ring.seats().len() != config.philosophers {
            return Err(DiningError::Configuration(format!(
                "ring has {} seats but {} philosophers are configured",
                ring.seats().len(),
                config.philosophers
            )));
        }

        // 1. Scoreboard first, so philosophers have somewhere to report
        let (scoreboard_actor, scoreboard) = ScoreboardActor::new(
            config.philosophers,
            config.food_quota,
            config.scoreboard_buffer,
        );
        let scoreboard_handle = tokio::spawn(scoreboard_actor.run());

        // 2. Seat everyone, then let them all loose at once
        let timing = config.timing();
        let philosophers = ring
            .into_seats()
            .into_iter()
            .map(|seat| {
                let index = seat.philosopher;
                let philosopher =
                    Philosopher::new(seat, config.food_quota, timing, config.seed_for(index));
                let span = info_span!("philosopher", index);
                let handle = tokio::spawn(philosopher.run(scoreboard.clone()).instrument(span));
                (index, handle)
            })
            .collect();

        info!(
            philosophers = config.philosophers,
            food_quota = config.food_quota,
            "Dinner started"
        );

        Ok(Self {
            food_quota: config.food_quota,
            scoreboard,
            scoreboard_handle,
            philosophers,
        })
    }

    pub fn scoreboard(&self) -> &ScoreboardClient {
        &self.scoreboard
    }

    /// Waits for every philosopher to reach `Done` or fault.
    ///
    /// Faults are isolated: a philosopher that panics or loses the scoreboard
    /// is reported in its own [`PhilosopherReport`] while everyone else keeps
    /// eating. The report is only produced once every task has ended.
    pub async fn join(self) -> SimulationReport {
        let mut outcomes = Vec::with_capacity(self.philosophers.len());
        for (index, handle) in self.philosophers {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(join_fault(e)),
            };
            if let Err(e) = &result {
                match e {
                    PhilosopherError::Panicked(_) => error!(philosopher = index, error = %e, "Philosopher task failed"),
                    _ => warn!(philosopher = index, error = %e, "Philosopher left early"),
                }
            }
            outcomes.push((index, result));
        }

        let snapshot = self.scoreboard.snapshot().await.ok();
        let meals = match self.scoreboard.meals().await {
            Ok(meals) => meals,
            Err(e) => {
                warn!(error = %e, "Meal log unavailable");
                Vec::new()
            }
        };

        let philosophers = outcomes
            .into_iter()
            .map(|(index, result)| match result {
                Ok(outcome) => PhilosopherReport {
                    index,
                    remaining: outcome.remaining,
                    meals: outcome.meals,
                    fault: None,
                },
                Err(fault) => PhilosopherReport {
                    index,
                    remaining: snapshot
                        .as_ref()
                        .and_then(|s| s.quotas.get(index).copied())
                        .unwrap_or(self.food_quota),
                    meals: meals.iter().filter(|m| m.philosopher == index).count() as u32,
                    fault: Some(fault),
                },
            })
            .collect();

        drop(self.scoreboard);
        if let Err(e) = self.scoreboard_handle.await {
            error!(error = ?e, "Scoreboard task failed");
        }

        let report = SimulationReport { philosophers, meals };
        if report.all_done() {
            info!(meals = report.meals.len(), "All philosophers are done eating");
        } else {
            warn!(faults = report.faults().count(), "Dinner ended with faults");
        }
        report
    }
}

fn join_fault(e: JoinError) -> PhilosopherError {
    if e.is_panic() {
        PhilosopherError::Panicked(panic_message(e.into_panic()))
    } else {
        PhilosopherError::Aborted
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => msg.to_string(),
            Err(_) => "unknown panic".to_string(),
        },
    }
}

/// Per-philosopher result of a finished simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PhilosopherReport {
    pub index: usize,
    pub remaining: u32,
    pub meals: u32,
    /// Set when the philosopher stopped before reaching `Done`.
    pub fault: Option<PhilosopherError>,
}

/// Everything the coordinator knows once the join barrier has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// One entry per philosopher, in seat order.
    pub philosophers: Vec<PhilosopherReport>,
    /// Every meal in the order the scoreboard received it.
    pub meals: Vec<MealEvent>,
}

impl SimulationReport {
    pub fn final_quotas(&self) -> Vec<u32> {
        self.philosophers.iter().map(|p| p.remaining).collect()
    }

    /// True when every philosopher finished its quota without a fault.
    pub fn all_done(&self) -> bool {
        self.philosophers
            .iter()
            .all(|p| p.fault.is_none() && p.remaining == 0)
    }

    pub fn faults(&self) -> impl Iterator<Item = &PhilosopherReport> {
        self.philosophers.iter().filter(|p| p.fault.is_some())
    }
}

/// Runs a full simulation of `philosophers` diners with `food_quota` each,
/// using default timings and in-memory forks.
pub async fn run(philosophers: usize, food_quota: u32) -> Result<SimulationReport, DiningError> {
    run_with_config(&SimulationConfig::new(philosophers, food_quota)).await
}

pub async fn run_with_config(config: &SimulationConfig) -> Result<SimulationReport, DiningError> {
    Ok(DiningSystem::start(config)?.join().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(42_u8)), "unknown panic");
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_start() {
        let err = run(1, 10).await.unwrap_err();
        assert!(matches!(err, DiningError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_ring_size_must_match_config() {
        let ring = ForkRing::in_memory(3, Default::default()).unwrap();
        let result = DiningSystem::start_with_ring(&SimulationConfig::new(4, 1), ring);
        assert!(matches!(result, Err(DiningError::Configuration(_))));
    }

    #[test]
    fn test_report_helpers() {
        let report = SimulationReport {
            philosophers: vec![
                PhilosopherReport {
                    index: 0,
                    remaining: 0,
                    meals: 2,
                    fault: None,
                },
                PhilosopherReport {
                    index: 1,
                    remaining: 4,
                    meals: 1,
                    fault: Some(PhilosopherError::Aborted),
                },
            ],
            meals: vec![],
        };
        assert_eq!(report.final_quotas(), vec![0, 4]);
        assert!(!report.all_done());
        assert_eq!(report.faults().count(), 1);
    }
}
