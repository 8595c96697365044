//! # Scoreboard Actor
//!
//! The one place that knows every philosopher's remaining quota.
//!
//! Philosophers never read each other's counters. After each sitting they send
//! a [`MealEvent`] here, and the scoreboard updates its copy, appends to the
//! meal log and prints the status line. Because the actor handles one message
//! at a time, status lines never interleave and no lock is shared with the
//! forks.

pub mod message;

pub use message::*;

use crate::clients::ScoreboardClient;
use crate::framework::FrameworkError;
use crate::model::{MealEvent, Snapshot};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct ScoreboardActor {
    receiver: mpsc::Receiver<ScoreRequest>,
    quotas: Vec<u32>,
    meals: Vec<MealEvent>,
}

impl ScoreboardActor {
    /// Creates the actor and its client for `philosophers` seats starting at `quota`.
    pub fn new(philosophers: usize, quota: u32, buffer_size: usize) -> (Self, ScoreboardClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            quotas: vec![quota; philosophers],
            meals: Vec::new(),
        };
        (actor, ScoreboardClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self) {
        info!(seats = self.quotas.len(), "Scoreboard started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ScoreRequest::Meal { event, respond_to } => {
                    let _ = respond_to.send(self.record(event));
                }
                ScoreRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.snapshot()));
                }
                ScoreRequest::Meals { respond_to } => {
                    debug!(meals = self.meals.len(), "Meals");
                    let _ = respond_to.send(Ok(self.meals.clone()));
                }
            }
        }

        info!(meals = self.meals.len(), "Scoreboard shutdown");
    }

    fn record(&mut self, event: MealEvent) -> Result<Snapshot, FrameworkError> {
        let Some(quota) = self.quotas.get_mut(event.philosopher) else {
            warn!(philosopher = event.philosopher, "Meal from unknown seat");
            return Err(FrameworkError::NotFound(format!(
                "philosopher {}",
                event.philosopher
            )));
        };
        *quota = event.remaining;
        self.meals.push(event);

        let snapshot = self.snapshot();
        info!("{snapshot}");
        Ok(snapshot)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            quotas: self.quotas.clone(),
        }
    }
}
