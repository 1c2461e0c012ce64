//! Message entity for the interview log.
//!
//! Messages are immutable once written. Within a session the [`Sequence`]
//! is the sole ordering key; it is assigned by the message log at append
//! time, never by callers.

use crate::domain::foundation::{DomainError, MessageId, QuestionId, SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RatingValue;

/// Maximum length for a single turn's content.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Position of a message within its session's log, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(u32);

impl Sequence {
    /// The sequence of the first message in a session.
    pub const FIRST: Sequence = Sequence(1);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the sequence following `current`, or `FIRST` for an empty log.
    pub fn after(current: Option<Sequence>) -> Self {
        match current {
            Some(Sequence(n)) => Sequence(n.saturating_add(1)),
            None => Self::FIRST,
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Generated by the turn generator.
    Interviewer,
    /// Typed by the person giving feedback.
    Respondent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Interviewer => "interviewer",
            Role::Respondent => "respondent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interviewer" => Some(Role::Interviewer),
            "respondent" => Some(Role::Respondent),
            _ => None,
        }
    }
}

/// Link from a turn to the template question it asks about or answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionLink {
    pub question_id: QuestionId,
    /// Snapshot of the question text at write time.
    pub question_text: String,
}

impl QuestionLink {
    pub fn new(question_id: QuestionId, question_text: impl Into<String>) -> Self {
        Self {
            question_id,
            question_text: question_text.into(),
        }
    }
}

/// A turn to be appended; the log assigns id, sequence, and creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub session_id: SessionId,
    pub role: Role,
    pub content: String,
    pub question: Option<QuestionLink>,
    pub rating: Option<RatingValue>,
}

impl NewMessage {
    /// Creates a turn with validated content.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if content is blank or too long
    pub fn new(
        session_id: SessionId,
        role: Role,
        content: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("content", "Message content cannot be empty"));
        }
        if trimmed.chars().count() > MAX_CONTENT_LENGTH {
            return Err(DomainError::validation(
                "content",
                format!("Message must be {} characters or less", MAX_CONTENT_LENGTH),
            ));
        }
        Ok(Self {
            session_id,
            role,
            content: trimmed.to_string(),
            question: None,
            rating: None,
        })
    }

    pub fn respondent(session_id: SessionId, content: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(session_id, Role::Respondent, content)
    }

    pub fn interviewer(session_id: SessionId, content: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(session_id, Role::Interviewer, content)
    }

    pub fn with_question(mut self, question: Option<QuestionLink>) -> Self {
        self.question = question;
        self
    }

    pub fn with_rating(mut self, rating: Option<RatingValue>) -> Self {
        self.rating = rating;
        self
    }

    /// Materializes the turn at the sequence chosen by the log.
    pub fn into_message(self, sequence: Sequence) -> Message {
        Message {
            id: MessageId::new(),
            session_id: self.session_id,
            sequence,
            role: self.role,
            content: self.content,
            question: self.question,
            rating: self.rating,
            created_at: Timestamp::now(),
        }
    }
}

/// An immutable turn in an interview.
///
/// # Invariants
///
/// - `sequence` is unique within the session
/// - `rating` is only present on turns linked to a rating question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    session_id: SessionId,
    sequence: Sequence,
    role: Role,
    content: String,
    question: Option<QuestionLink>,
    rating: Option<RatingValue>,
    created_at: Timestamp,
}

impl Message {
    /// Reconstitutes a message from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: MessageId,
        session_id: SessionId,
        sequence: Sequence,
        role: Role,
        content: String,
        question: Option<QuestionLink>,
        rating: Option<RatingValue>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id,
            sequence,
            role,
            content,
            question,
            rating,
            created_at,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn question(&self) -> Option<&QuestionLink> {
        self.question.as_ref()
    }

    pub fn rating(&self) -> Option<RatingValue> {
        self.rating
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn is_interviewer(&self) -> bool {
        self.role == Role::Interviewer
    }

    pub fn is_respondent(&self) -> bool {
        self.role == Role::Respondent
    }
}
