//! Moderation flag handlers.
//!
//! Flags are set out-of-band by administrators and never affect turn flow,
//! so both operations are valid in every session state.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::session::Session;
use crate::ports::SessionRepository;

use crate::application::InterviewError;

/// Command to flag a session for moderation.
#[derive(Debug, Clone)]
pub struct FlagSessionCommand {
    pub session_id: SessionId,
    pub reason: String,
}

/// Command to clear a moderation flag.
#[derive(Debug, Clone)]
pub struct ClearFlagCommand {
    pub session_id: SessionId,
}

/// Handler for setting moderation flags.
pub struct FlagSessionHandler {
    sessions: Arc<dyn SessionRepository>,
}

impl FlagSessionHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, cmd: FlagSessionCommand) -> Result<Session, InterviewError> {
        let mut session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or(InterviewError::NotFound)?;

        session.flag(cmd.reason)?;
        self.sessions.update(&session).await?;

        tracing::info!(session_id = %session.id(), "Session flagged for moderation");
        Ok(session)
    }
}

/// Handler for clearing moderation flags.
pub struct ClearFlagHandler {
    sessions: Arc<dyn SessionRepository>,
}

impl ClearFlagHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, cmd: ClearFlagCommand) -> Result<Session, InterviewError> {
        let mut session = self
            .sessions
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or(InterviewError::NotFound)?;

        if session.clear_flag() {
            self.sessions.update(&session).await?;
            tracing::info!(session_id = %session.id(), "Moderation flag cleared");
        }
        Ok(session)
    }
}
