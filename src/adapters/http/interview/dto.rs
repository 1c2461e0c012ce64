//! HTTP DTOs for the respondent-facing interview endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::{SendTurnResult, StartSessionResult, TranscriptView};
use crate::domain::foundation::Timestamp;
use crate::domain::interview::{InterviewProgress, Message, Role};
use crate::domain::session::{Session, SessionState};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start an interview.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub relationship: String,
    #[serde(default)]
    pub respondent_name: Option<String>,
}

/// Request carrying one respondent turn.
#[derive(Debug, Clone, Deserialize)]
pub struct SendTurnRequest {
    pub content: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

fn rfc3339(ts: &Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}

/// Session as shown to the respondent.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub state: SessionState,
    pub subject_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            state: session.state(),
            subject_name: session.subject().name.clone(),
            subject_role: session.subject().role.clone(),
            relationship: session.relationship().map(|r| r.to_string()),
            respondent_name: session.respondent_name().map(str::to_string),
            started_at: session.started_at().map(rfc3339),
            completed_at: session.completed_at().map(rfc3339),
        }
    }
}

/// One transcript turn.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub sequence: u32,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub created_at: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            sequence: message.sequence().value(),
            role: message.role(),
            content: message.content().to_string(),
            question_id: message.question().map(|q| q.question_id.to_string()),
            question_text: message.question().map(|q| q.question_text.clone()),
            rating: message.rating().map(|r| r.value()),
            created_at: rfc3339(message.created_at()),
        }
    }
}

/// Response to a start request.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session: SessionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening: Option<MessageResponse>,
}

impl From<StartSessionResult> for StartSessionResponse {
    fn from(result: StartSessionResult) -> Self {
        Self {
            session: SessionResponse::from(&result.session),
            opening: result.opening.as_ref().map(MessageResponse::from),
        }
    }
}

/// Newly appended turns, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct TurnsResponse {
    pub messages: Vec<MessageResponse>,
}

impl From<SendTurnResult> for TurnsResponse {
    fn from(result: SendTurnResult) -> Self {
        Self {
            messages: result.into_messages().iter().map(MessageResponse::from).collect(),
        }
    }
}

impl From<Message> for TurnsResponse {
    fn from(message: Message) -> Self {
        Self {
            messages: vec![MessageResponse::from(&message)],
        }
    }
}

/// Progress rebuilt from the log.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question_id: Option<String>,
    pub touched_questions: Vec<String>,
    pub awaiting_interviewer: bool,
    pub interviewer_turns: usize,
    pub respondent_turns: usize,
}

impl From<&InterviewProgress> for ProgressResponse {
    fn from(progress: &InterviewProgress) -> Self {
        Self {
            current_question_id: progress
                .current_question
                .as_ref()
                .map(|q| q.question_id.to_string()),
            touched_questions: progress
                .touched_questions
                .iter()
                .map(|q| q.to_string())
                .collect(),
            awaiting_interviewer: progress.awaiting_interviewer,
            interviewer_turns: progress.interviewer_turns,
            respondent_turns: progress.respondent_turns,
        }
    }
}

/// Full transcript.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptResponse {
    pub session: SessionResponse,
    pub messages: Vec<MessageResponse>,
    pub progress: ProgressResponse,
}

impl From<TranscriptView> for TranscriptResponse {
    fn from(view: TranscriptView) -> Self {
        Self {
            session: SessionResponse::from(&view.session),
            messages: view.messages.iter().map(MessageResponse::from).collect(),
            progress: ProgressResponse::from(&view.progress),
        }
    }
}
