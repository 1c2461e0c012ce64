//! Turn Generator Port - Interface for the external interviewer model.
//!
//! The generator is a black box: it receives the built context and either a
//! seed prompt (opening turn) or the transcript window, and returns raw text
//! plus an optional id of the question the turn addresses.
//!
//! # Design
//!
//! - Adapters never retry; retrying is a caller decision
//! - Adapters never sanitize; raw text is cleaned by the orchestrator
//! - Every failure mode maps to a [`TurnGenerationError`] variant
//!
//! # Example
//!
//! ```ignore
//! struct Canned;
//!
//! #[async_trait]
//! impl TurnGenerator for Canned {
//!     async fn generate_turn(&self, _request: TurnRequest) -> Result<GeneratedTurn, TurnGenerationError> {
//!         Ok(GeneratedTurn::text("What stands out about working with them?"))
//!     }
//!
//!     fn generator_info(&self) -> GeneratorInfo {
//!         GeneratorInfo::new("canned", "none")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{QuestionId, SessionId};
use crate::domain::interview::{Message, Role};

/// Port for producing interviewer turns.
#[async_trait]
pub trait TurnGenerator: Send + Sync {
    /// Generate the next interviewer turn.
    async fn generate_turn(&self, request: TurnRequest)
        -> Result<GeneratedTurn, TurnGenerationError>;

    /// Describes the backing service (for logging).
    fn generator_info(&self) -> GeneratorInfo;
}

/// What the generator should continue from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    /// Opening turn of a session; no transcript exists yet.
    Seed(String),
    /// The (possibly truncated) transcript, oldest first. Never empty.
    Transcript(Vec<TranscriptTurn>),
}

/// One transcript entry as seen by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for TranscriptTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            content: message.content().to_string(),
        }
    }
}

/// Request for one interviewer turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Session the turn belongs to (tracing only).
    pub session_id: SessionId,
    /// Instructions built by the context builder.
    pub context: String,
    pub input: TurnInput,
}

impl TurnRequest {
    /// Creates a request for a session's opening turn.
    pub fn opening(session_id: SessionId, context: String, seed: impl Into<String>) -> Self {
        Self {
            session_id,
            context,
            input: TurnInput::Seed(seed.into()),
        }
    }

    /// Creates a request continuing from a transcript window.
    pub fn continuation(session_id: SessionId, context: String, window: &[Message]) -> Self {
        Self {
            session_id,
            context,
            input: TurnInput::Transcript(window.iter().map(TranscriptTurn::from).collect()),
        }
    }

    /// Returns true if this request asks for the opening turn.
    pub fn is_opening(&self) -> bool {
        matches!(self.input, TurnInput::Seed(_))
    }
}

/// Raw generator output, before sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTurn {
    pub text: String,
    /// Question the turn addresses, when the generator reported one.
    pub question_id: Option<QuestionId>,
}

impl GeneratedTurn {
    /// Creates a turn without question metadata.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            question_id: None,
        }
    }

    /// Attaches the question the turn addresses.
    pub fn with_question(mut self, question_id: QuestionId) -> Self {
        self.question_id = Some(question_id);
        self
    }
}

/// Generator identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub name: String,
    pub model: String,
}

impl GeneratorInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Turn generation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnGenerationError {
    /// Rate limited by the upstream service.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Output was withheld by the service's content filter.
    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// Service is unavailable.
    #[error("generator unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the service response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request exceeded its time bound.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl TurnGenerationError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn timeout(timeout_secs: u32) -> Self {
        Self::Timeout { timeout_secs }
    }

    /// Returns true if a caller-initiated retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Unavailable { .. } | Self::Network(_) | Self::Timeout { .. }
        )
    }
}
