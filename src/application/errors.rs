//! Orchestrator error taxonomy.
//!
//! Every operation exposed to callers fails with [`InterviewError`]. Port
//! errors are folded in here so the HTTP edge has a single type to map.

use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::interview::ContextError;
use crate::ports::{RateLimitDenied, TurnGenerationError};

/// Errors returned by orchestrator operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterviewError {
    /// The session token or id does not resolve.
    #[error("Session not found")]
    NotFound,

    /// The session's state forbids the requested operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Write attempted on a completed session.
    #[error("Session is completed and no longer accepts changes")]
    SessionClosed,

    /// Another turn pipeline is already running for this session.
    #[error("A turn is already in progress for this session")]
    AlreadyInProgress,

    /// Caller exceeded a rate-limit bucket.
    #[error("Rate limit of {limit} requests exceeded; capacity frees in {reset_in:?}")]
    RateLimited { limit: u32, reset_in: Duration },

    /// The turn generator failed, timed out, or produced nothing usable.
    #[error("Turn generation failed: {reason}")]
    GenerationFailed { reason: String },

    /// Template content cannot be used to build a turn.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Caller input failed validation.
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Storage or other infrastructure failure.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl InterviewError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn generation_failed(reason: impl Into<String>) -> Self {
        Self::GenerationFailed {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound => ErrorCode::SessionNotFound,
            Self::InvalidState(_) => ErrorCode::InvalidStateTransition,
            Self::SessionClosed => ErrorCode::SessionClosed,
            Self::AlreadyInProgress => ErrorCode::AlreadyInProgress,
            Self::RateLimited { .. } => ErrorCode::RateLimited,
            Self::GenerationFailed { .. } => ErrorCode::GenerationFailed,
            Self::InvalidTemplate(_) => ErrorCode::InvalidTemplate,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns true if the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AlreadyInProgress | Self::RateLimited { .. } | Self::GenerationFailed { .. }
        )
    }
}

impl From<DomainError> for InterviewError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SessionNotFound => Self::NotFound,
            ErrorCode::InvalidStateTransition => Self::InvalidState(err.message),
            ErrorCode::SessionClosed => Self::SessionClosed,
            // A lost sequence race means another writer was mid-turn.
            ErrorCode::AlreadyInProgress | ErrorCode::SequenceConflict => Self::AlreadyInProgress,
            ErrorCode::ValidationFailed => Self::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "input".to_string()),
                message: err.message,
            },
            ErrorCode::TemplateNotFound | ErrorCode::InvalidTemplate => {
                Self::InvalidTemplate(err.message)
            }
            ErrorCode::GenerationFailed => Self::GenerationFailed {
                reason: err.message,
            },
            ErrorCode::RateLimited | ErrorCode::DatabaseError | ErrorCode::InternalError => {
                Self::Infrastructure(err.to_string())
            }
        }
    }
}

impl From<TurnGenerationError> for InterviewError {
    fn from(err: TurnGenerationError) -> Self {
        Self::GenerationFailed {
            reason: err.to_string(),
        }
    }
}

impl From<ContextError> for InterviewError {
    fn from(err: ContextError) -> Self {
        Self::InvalidTemplate(err.to_string())
    }
}

impl From<RateLimitDenied> for InterviewError {
    fn from(denied: RateLimitDenied) -> Self {
        Self::RateLimited {
            limit: denied.limit,
            reset_in: denied.reset_in,
        }
    }
}
