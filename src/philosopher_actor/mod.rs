//! # Philosopher Actor
//!
//! One philosopher is one Tokio task running a small state machine:
//!
//! ```text
//! Thinking -> AttemptingAcquire -> Eating -> Thinking -> ... -> Done
//! ```
//!
//! ## Acquisition protocol
//!
//! 1. Poll the first fork with `try_acquire`, backing off between attempts.
//!    This is the only unbounded wait in the system.
//! 2. Once the first fork is held, try the second fork exactly once.
//! 3. If the second fork is busy (or its backend faults), release the first
//!    fork, back off, and start over from step 1.
//!
//! Step 3 is what keeps the ring deadlock-free: nobody holds one fork while
//! waiting on the other, so the circular wait can never close.
//!
//! Forks are held through [`ForkGuard`]s, so they are released on every exit
//! path including a panic inside the task.
//!
//! ## Structure
//!
//! - [`error`] - [`PhilosopherError`] for faults that end a dinner early
//! - [`state`] - [`PhilosopherState`]
//! - [`Philosopher`] - the actor itself

pub mod error;
pub mod state;

pub use error::*;
pub use state::*;

use crate::clients::ScoreboardClient;
use crate::framework::ForkGuard;
use crate::model::{MealEvent, Timing};
use crate::ring::Seat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Final numbers for a philosopher that reached `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhilosopherOutcome {
    pub index: usize,
    pub remaining: u32,
    pub meals: u32,
    pub eaten: u32,
}

pub struct Philosopher {
    seat: Seat,
    remaining: u32,
    meals: u32,
    eaten: u32,
    timing: Timing,
    rng: StdRng,
    state: watch::Sender<PhilosopherState>,
}

impl Philosopher {
    /// Seats a philosopher with `quota` food to get through.
    ///
    /// With `seed` the think times and portion sizes are reproducible.
    pub fn new(seat: Seat, quota: u32, timing: Timing, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (state, _) = watch::channel(PhilosopherState::Thinking);
        Self {
            seat,
            remaining: quota,
            meals: 0,
            eaten: 0,
            timing,
            rng,
            state,
        }
    }

    pub fn index(&self) -> usize {
        self.seat.philosopher
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn state(&self) -> PhilosopherState {
        *self.state.borrow()
    }

    /// Watch state transitions from outside the task.
    pub fn subscribe(&self) -> watch::Receiver<PhilosopherState> {
        self.state.subscribe()
    }

    /// Runs the dinner until the quota is used up.
    ///
    /// The scoreboard is injected here rather than at construction, so the
    /// coordinator can build seats and actors before wiring them together.
    pub async fn run(
        mut self,
        scoreboard: ScoreboardClient,
    ) -> Result<PhilosopherOutcome, PhilosopherError> {
        let (first, second) = self.seat.fork_indices();
        info!(
            philosopher = self.index(),
            quota = self.remaining,
            first,
            second,
            "Philosopher seated"
        );

        while self.remaining > 0 {
            self.transition(PhilosopherState::Thinking);
            self.think().await;

            self.transition(PhilosopherState::AttemptingAcquire);
            let (first, second) = self.acquire_forks().await;

            self.transition(PhilosopherState::Eating);
            let event = self.eat().await;
            drop(second);
            drop(first);
            self.transition(PhilosopherState::Thinking);

            scoreboard.report_meal(event).await?;
        }

        self.transition(PhilosopherState::Done);
        info!(
            philosopher = self.index(),
            meals = self.meals,
            eaten = self.eaten,
            "Philosopher done"
        );

        Ok(PhilosopherOutcome {
            index: self.index(),
            remaining: self.remaining,
            meals: self.meals,
            eaten: self.eaten,
        })
    }

    fn transition(&self, next: PhilosopherState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(philosopher = self.index(), from = %previous, to = %next, "Transition");
        }
    }

    async fn think(&mut self) {
        let pause = self.timing.max_think.mul_f64(self.rng.gen::<f64>());
        tokio::time::sleep(pause).await;
    }

    async fn acquire_forks(&self) -> (ForkGuard, ForkGuard) {
        let mut misses: u64 = 0;
        loop {
            let first = self.claim_first().await;
            if let Some(second) = ForkGuard::try_claim(&self.seat.second).await {
                if misses > 0 {
                    debug!(philosopher = self.index(), misses, "Both forks acquired");
                }
                return (first, second);
            }

            // Never wait on the second fork while holding the first
            drop(first);
            misses += 1;
            debug!(
                philosopher = self.index(),
                fork = self.seat.second.index(),
                misses,
                "Second fork busy, released first"
            );
            backoff(self.timing.retry_backoff).await;
        }
    }

    async fn claim_first(&self) -> ForkGuard {
        loop {
            if let Some(guard) = ForkGuard::try_claim(&self.seat.first).await {
                return guard;
            }
            backoff(self.timing.retry_backoff).await;
        }
    }

    async fn eat(&mut self) -> MealEvent {
        let amount = self
            .rng
            .gen_range(1..=self.timing.max_food_per_sitting.max(1));
        self.remaining = self.remaining.saturating_sub(amount);
        self.meals += 1;
        self.eaten = self.eaten.saturating_add(amount);

        tokio::time::sleep(self.timing.eat_per_unit.saturating_mul(amount)).await;

        MealEvent {
            philosopher: self.index(),
            amount,
            remaining: self.remaining,
        }
    }
}

/// A zero backoff still has to yield, or a busy poll would starve the
/// neighbour holding the fork on a single-threaded runtime.
async fn backoff(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::ScriptedFork;
    use crate::framework::{AtomicFork, SharedFork};
    use crate::scoreboard_actor::ScoreboardActor;
    use std::sync::Arc;

    fn timing(max_food: u32) -> Timing {
        Timing {
            max_think: Duration::from_millis(50),
            eat_per_unit: Duration::from_millis(10),
            retry_backoff: Duration::from_millis(5),
            max_food_per_sitting: max_food,
        }
    }

    fn seat(first: SharedFork, second: SharedFork) -> Seat {
        Seat::new(0, first, second)
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_quota_never_touches_forks() {
        let first = Arc::new(ScriptedFork::new(0));
        let second = Arc::new(ScriptedFork::new(1));
        let (board, client) = ScoreboardActor::new(1, 0, 4);
        tokio::spawn(board.run());

        let philosopher = Philosopher::new(seat(first.clone(), second.clone()), 0, timing(3), Some(1));
        assert_eq!(philosopher.index(), 0);
        assert_eq!(philosopher.remaining(), 0);
        assert_eq!(philosopher.state(), PhilosopherState::Thinking);
        let outcome = philosopher.run(client.clone()).await.unwrap();

        assert_eq!(outcome.meals, 0);
        assert_eq!(outcome.remaining, 0);
        assert_eq!(first.attempts() + second.attempts(), 0);
        assert!(client.meals().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eats_until_quota_exhausted() {
        let (board, client) = ScoreboardActor::new(1, 7, 4);
        tokio::spawn(board.run());

        let first = AtomicFork::shared(0);
        let second = AtomicFork::shared(1);
        let philosopher = Philosopher::new(seat(first, second), 7, timing(3), Some(42));
        let state = philosopher.subscribe();

        let outcome = philosopher.run(client.clone()).await.unwrap();
        assert_eq!(outcome.remaining, 0);
        assert!(outcome.eaten >= 7);
        assert_eq!(*state.borrow(), PhilosopherState::Done);

        let meals = client.meals().await.unwrap();
        assert_eq!(meals.len() as u32, outcome.meals);
        let mut previous = 7;
        for meal in &meals {
            assert!((1..=3).contains(&meal.amount));
            assert!(meal.remaining <= previous);
            assert_eq!(meal.remaining, previous.saturating_sub(meal.amount));
            previous = meal.remaining;
        }
        assert_eq!(previous, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_releases_first_fork_when_second_is_busy() {
        let (board, client) = ScoreboardActor::new(1, 5, 4);
        tokio::spawn(board.run());

        let first = Arc::new(ScriptedFork::new(0));
        let second = Arc::new(ScriptedFork::new(1));
        second.expect_try_acquire().times(3).return_busy();

        let philosopher = Philosopher::new(seat(first.clone(), second.clone()), 1, timing(1), Some(3));
        let outcome = philosopher.run(client).await.unwrap();

        assert_eq!(outcome.meals, 1);
        // Three refusals plus the successful round
        assert_eq!(first.grants(), 4);
        assert_eq!(first.releases(), 4);
        assert_eq!(first.spurious_releases(), 0);
        assert_eq!(second.grants(), 1);
        assert!(!first.is_held() && !second.is_held());
        second.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_faults_are_retried() {
        let (board, client) = ScoreboardActor::new(1, 2, 4);
        tokio::spawn(board.run());

        let first = Arc::new(ScriptedFork::new(0));
        first.expect_try_acquire().times(2).return_fault();
        let second = Arc::new(ScriptedFork::new(1));
        second.expect_try_acquire().return_fault();

        let philosopher = Philosopher::new(seat(first.clone(), second.clone()), 2, timing(2), Some(9));
        let outcome = philosopher.run(client).await.unwrap();

        assert_eq!(outcome.remaining, 0);
        assert_eq!(first.spurious_releases(), 0);
        assert_eq!(second.spurious_releases(), 0);
        first.verify();
        second.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_scoreboard_gone_is_an_actor_fault() {
        let (board, client) = ScoreboardActor::new(1, 3, 4);
        drop(board);

        let first = Arc::new(ScriptedFork::new(0));
        let second = Arc::new(ScriptedFork::new(1));
        let philosopher = Philosopher::new(seat(first.clone(), second.clone()), 3, timing(1), Some(5));

        let err = philosopher.run(client).await.unwrap_err();
        assert_eq!(
            err,
            PhilosopherError::ScoreboardUnavailable(crate::framework::FrameworkError::ActorClosed)
        );
        // The meal finished before the report failed, so both forks are free again
        assert!(!first.is_held() && !second.is_held());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_portions_do_not_overflow() {
        let (board, client) = ScoreboardActor::new(1, u32::MAX, 64);
        tokio::spawn(board.run());

        let timing = Timing {
            max_think: Duration::ZERO,
            eat_per_unit: Duration::ZERO,
            retry_backoff: Duration::ZERO,
            max_food_per_sitting: u32::MAX,
        };
        let philosopher = Philosopher::new(
            seat(AtomicFork::shared(0), AtomicFork::shared(1)),
            u32::MAX,
            timing,
            Some(13),
        );
        let outcome = philosopher.run(client).await.unwrap();

        assert_eq!(outcome.remaining, 0);
        assert!(outcome.meals >= 1);
        // Total eaten is at least the quota, so it pins at the ceiling
        assert_eq!(outcome.eaten, u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_backoff_still_makes_progress() {
        let (board, client) = ScoreboardActor::new(1, 1, 4);
        tokio::spawn(board.run());

        let first = Arc::new(ScriptedFork::new(0));
        first.expect_try_acquire().times(5).return_busy();
        let second = Arc::new(ScriptedFork::new(1));
        second.expect_try_acquire().times(5).return_busy();

        let timing = Timing {
            retry_backoff: Duration::ZERO,
            ..timing(1)
        };
        let philosopher = Philosopher::new(seat(first.clone(), second.clone()), 1, timing, Some(11));
        let outcome = philosopher.run(client).await.unwrap();

        assert_eq!(outcome.meals, 1);
        assert_eq!(first.grants(), 6);
        assert_eq!(first.spurious_releases(), 0);
    }
}
