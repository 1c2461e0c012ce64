//! GetTranscriptHandler - Read-only view of a session and its log.
//!
//! Valid in every state. Progress is rebuilt from the log on each read so a
//! returning respondent resumes from persisted state only.

use std::sync::Arc;

use crate::domain::interview::{InterviewProgress, Message};
use crate::domain::session::Session;
use crate::ports::{MessageLog, SessionRepository};

use super::common::session_by_token;
use crate::application::InterviewError;

/// Query for a session transcript.
#[derive(Debug, Clone)]
pub struct GetTranscriptQuery {
    pub token: String,
}

/// Session, ordered log, and derived progress.
#[derive(Debug, Clone)]
pub struct TranscriptView {
    pub session: Session,
    pub messages: Vec<Message>,
    pub progress: InterviewProgress,
}

/// Handler for transcript reads.
pub struct GetTranscriptHandler {
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageLog>,
    opening_turn: bool,
}

impl GetTranscriptHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>, messages: Arc<dyn MessageLog>) -> Self {
        Self {
            sessions,
            messages,
            opening_turn: true,
        }
    }

    /// Whether an empty log still owes the interviewer's greeting.
    pub fn with_opening_turn(mut self, opening_turn: bool) -> Self {
        self.opening_turn = opening_turn;
        self
    }

    pub async fn handle(&self, query: GetTranscriptQuery) -> Result<TranscriptView, InterviewError> {
        let session = session_by_token(self.sessions.as_ref(), &query.token).await?;
        let messages = self.messages.list_by_session(session.id()).await?;
        let progress = InterviewProgress::replay(&messages, self.opening_turn);

        Ok(TranscriptView {
            session,
            messages,
            progress,
        })
    }
}
