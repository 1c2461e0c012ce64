//! HTTP DTOs for administrative endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::session::{Session, SessionState};

/// Request to flag a session for moderation.
#[derive(Debug, Clone, Deserialize)]
pub struct FlagSessionRequest {
    pub reason: String,
}

/// Moderation view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationResponse {
    pub session_id: String,
    pub state: SessionState,
    pub flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged_at: Option<String>,
}

impl From<&Session> for ModerationResponse {
    fn from(session: &Session) -> Self {
        let flag = session.moderation();
        Self {
            session_id: session.id().to_string(),
            state: session.state(),
            flagged: flag.is_some(),
            flag_reason: flag.map(|f| f.reason.clone()),
            flagged_at: flag.map(|f| f.flagged_at.as_datetime().to_rfc3339()),
        }
    }
}

/// Result of a session deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteSessionResponse {
    pub session_id: String,
    pub messages_removed: u64,
}
