//! CompleteSessionHandler - Command handler for finishing an interview.
//!
//! Completion takes the single-flight permit so no interviewer turn can land
//! after the session closes. Summary scheduling runs detached; its failure
//! never fails completion.

use std::sync::Arc;

use crate::domain::session::Session;
use crate::ports::{SessionRepository, SummaryScheduler};

use super::common::{claim, session_by_id, session_by_token};
use crate::application::{InterviewError, SingleFlight};

/// Command to complete a session.
#[derive(Debug, Clone)]
pub struct CompleteSessionCommand {
    pub token: String,
}

/// Handler for completing sessions.
pub struct CompleteSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    summaries: Arc<dyn SummaryScheduler>,
    flights: SingleFlight,
}

impl CompleteSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        summaries: Arc<dyn SummaryScheduler>,
        flights: SingleFlight,
    ) -> Self {
        Self {
            sessions,
            summaries,
            flights,
        }
    }

    pub async fn handle(&self, cmd: CompleteSessionCommand) -> Result<Session, InterviewError> {
        let session = session_by_token(self.sessions.as_ref(), &cmd.token).await?;
        session.ensure_accepts_turns()?;

        let _permit = claim(&self.flights, *session.id())?;
        let mut session = session_by_id(self.sessions.as_ref(), session.id()).await?;
        session.complete()?;
        self.sessions.update(&session).await?;

        tracing::info!(session_id = %session.id(), "Session completed");

        let summaries = Arc::clone(&self.summaries);
        let session_id = *session.id();
        tokio::spawn(async move {
            if let Err(err) = summaries.schedule_summary(session_id).await {
                tracing::warn!(
                    session_id = %session_id,
                    error = %err,
                    "Failed to schedule summary"
                );
            }
        });

        Ok(session)
    }
}
