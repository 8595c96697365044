//! Messages understood by the scoreboard actor.

use crate::framework::FrameworkError;
use crate::model::{MealEvent, Snapshot};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the scoreboard.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ScoreRequest {
    /// A philosopher finished a sitting. Answered with the snapshot taken right after it.
    Meal {
        event: MealEvent,
        respond_to: Response<Snapshot>,
    },
    /// Current remaining quotas.
    Snapshot { respond_to: Response<Snapshot> },
    /// Every meal recorded so far, in the order they were reported.
    Meals { respond_to: Response<Vec<MealEvent>> },
}
