//! DeleteSessionHandler - Removes a session and its whole log.
//!
//! Messages are deleted before the session record so a failure part-way
//! never leaves orphaned turns. The single-flight permit is held so no
//! pipeline can append after the log is cleared.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::ports::{MessageLog, SessionRepository};

use crate::application::{InterviewError, SingleFlight};

/// Command to delete a session.
#[derive(Debug, Clone)]
pub struct DeleteSessionCommand {
    pub session_id: SessionId,
}

/// Handler for session deletion.
pub struct DeleteSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageLog>,
    flights: SingleFlight,
}

impl DeleteSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        messages: Arc<dyn MessageLog>,
        flights: SingleFlight,
    ) -> Self {
        Self {
            sessions,
            messages,
            flights,
        }
    }

    /// Returns the number of messages removed.
    pub async fn handle(&self, cmd: DeleteSessionCommand) -> Result<u64, InterviewError> {
        if self.sessions.find_by_id(&cmd.session_id).await?.is_none() {
            return Err(InterviewError::NotFound);
        }
        let _permit = self
            .flights
            .try_acquire(cmd.session_id)
            .ok_or(InterviewError::AlreadyInProgress)?;

        let removed = self.messages.delete_by_session(&cmd.session_id).await?;
        self.sessions.delete(&cmd.session_id).await?;

        tracing::info!(
            session_id = %cmd.session_id,
            messages_removed = removed,
            "Session deleted"
        );
        Ok(removed)
    }
}
