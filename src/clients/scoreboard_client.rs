use crate::framework::FrameworkError;
use crate::model::{MealEvent, Snapshot};
use crate::scoreboard_actor::ScoreRequest;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Client for interacting with the scoreboard actor.
///
/// Cheap to clone: every philosopher holds its own copy. The scoreboard shuts
/// down once the last clone is dropped.
#[derive(Clone, Debug)]
pub struct ScoreboardClient {
    sender: mpsc::Sender<ScoreRequest>,
}

impl ScoreboardClient {
    pub fn new(sender: mpsc::Sender<ScoreRequest>) -> Self {
        Self { sender }
    }

    /// Records a finished sitting and returns the snapshot taken right after it.
    #[instrument(skip(self), level = "debug")]
    pub async fn report_meal(&self, event: MealEvent) -> Result<Snapshot, FrameworkError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ScoreRequest::Meal { event, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn snapshot(&self) -> Result<Snapshot, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ScoreRequest::Snapshot { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn meals(&self) -> Result<Vec<MealEvent>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ScoreRequest::Meals { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}
