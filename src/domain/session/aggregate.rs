//! Session aggregate entity.
//!
//! One session exists per respondent invitation. It is looked up by its
//! shareable [`SessionToken`] and owns the message log recorded for it.
//!
//! # Ownership
//!
//! Sessions reference their template by ID but do NOT own it.
//! Messages are stored separately and deleted together with the session.

use crate::domain::foundation::{
    DomainError, ErrorCode, RelationshipId, SessionId, SessionToken, StateMachine, TemplateId,
    Timestamp,
};
use serde::{Deserialize, Serialize};

use super::SessionState;

/// Maximum length for a respondent display name.
pub const MAX_RESPONDENT_NAME_LENGTH: usize = 100;

/// Maximum length for a moderation reason.
pub const MAX_FLAG_REASON_LENGTH: usize = 1000;

/// The person the feedback is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub role: Option<String>,
}

impl Subject {
    /// Creates a subject, rejecting an empty name.
    pub fn new(name: impl Into<String>, role: Option<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("subject_name", "Subject name cannot be empty"));
        }
        Ok(Self {
            name: name.trim().to_string(),
            role: role
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
    }
}

/// Out-of-band moderation marker set by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationFlag {
    pub reason: String,
    pub flagged_at: Timestamp,
}

/// Session aggregate - one respondent's interview instance.
///
/// # Invariants
///
/// - `state` only moves `NotStarted -> InProgress -> Completed`
/// - `started_at` is set iff the session has left `NotStarted`
/// - `completed_at` is set iff the session is `Completed`
/// - the moderation flag never influences orchestration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    token: SessionToken,
    template_id: TemplateId,
    subject: Subject,
    state: SessionState,
    respondent_name: Option<String>,
    relationship: Option<RelationshipId>,
    moderation: Option<ModerationFlag>,
    started_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// Create a new session awaiting its respondent.
    pub fn new(
        id: SessionId,
        token: SessionToken,
        template_id: TemplateId,
        subject: Subject,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            token,
            template_id,
            subject,
            state: SessionState::NotStarted,
            respondent_name: None,
            relationship: None,
            moderation: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        token: SessionToken,
        template_id: TemplateId,
        subject: Subject,
        state: SessionState,
        respondent_name: Option<String>,
        relationship: Option<RelationshipId>,
        moderation: Option<ModerationFlag>,
        started_at: Option<Timestamp>,
        completed_at: Option<Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            token,
            template_id,
            subject,
            state,
            respondent_name,
            relationship,
            moderation,
            started_at,
            completed_at,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn template_id(&self) -> &TemplateId {
        &self.template_id
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn respondent_name(&self) -> Option<&str> {
        self.respondent_name.as_deref()
    }

    pub fn relationship(&self) -> Option<&RelationshipId> {
        self.relationship.as_ref()
    }

    pub fn moderation(&self) -> Option<&ModerationFlag> {
        self.moderation.as_ref()
    }

    pub fn is_flagged(&self) -> bool {
        self.moderation.is_some()
    }

    pub fn started_at(&self) -> Option<&Timestamp> {
        self.started_at.as_ref()
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin the interview with the respondent's relationship selection.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session is already started or completed
    /// - `ValidationFailed` if the name is too long
    pub fn start(
        &mut self,
        relationship: RelationshipId,
        respondent_name: Option<String>,
    ) -> Result<(), DomainError> {
        let next = self.state.transition_to(SessionState::InProgress).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot start a session that is {}", self.state),
            )
        })?;
        let respondent_name = Self::normalize_name(respondent_name)?;

        let now = Timestamp::now();
        self.state = next;
        self.relationship = Some(relationship);
        self.respondent_name = respondent_name;
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Finish the interview.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if already completed
    /// - `InvalidStateTransition` if never started
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.ensure_accepts_turns()?;

        let now = Timestamp::now();
        self.state = SessionState::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Checks that turns may still be appended to this session.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if completed
    /// - `InvalidStateTransition` if not yet started
    pub fn ensure_accepts_turns(&self) -> Result<(), DomainError> {
        match self.state {
            SessionState::InProgress => Ok(()),
            SessionState::Completed => Err(DomainError::new(
                ErrorCode::SessionClosed,
                "Session has been completed",
            )),
            SessionState::NotStarted => Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Session has not been started",
            )),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Moderation
    // ─────────────────────────────────────────────────────────────────────────

    /// Set (or replace) the moderation flag. Allowed in any state.
    pub fn flag(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        let reason = reason.into();
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("reason", "Flag reason cannot be empty"));
        }
        if trimmed.chars().count() > MAX_FLAG_REASON_LENGTH {
            return Err(DomainError::validation(
                "reason",
                format!("Flag reason must be {} characters or less", MAX_FLAG_REASON_LENGTH),
            ));
        }

        let now = Timestamp::now();
        self.moderation = Some(ModerationFlag {
            reason: trimmed.to_string(),
            flagged_at: now,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Remove the moderation flag. Returns whether a flag was present.
    pub fn clear_flag(&mut self) -> bool {
        let was_flagged = self.moderation.take().is_some();
        if was_flagged {
            self.updated_at = Timestamp::now();
        }
        was_flagged
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn normalize_name(name: Option<String>) -> Result<Option<String>, DomainError> {
        let Some(name) = name else {
            return Ok(None);
        };
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > MAX_RESPONDENT_NAME_LENGTH {
            return Err(DomainError::validation(
                "respondent_name",
                format!("Name must be {} characters or less", MAX_RESPONDENT_NAME_LENGTH),
            ));
        }
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> RelationshipId {
        RelationshipId::new("peer").unwrap()
    }

    fn test_session() -> Session {
        Session::new(
            SessionId::new(),
            SessionToken::generate(),
            TemplateId::new(),
            Subject::new("Alex Kim", Some("Engineer".to_string())).unwrap(),
        )
    }

    fn started_session() -> Session {
        let mut session = test_session();
        session.start(peer(), Some("Jordan".to_string())).unwrap();
        session
    }

    mod construction {
        use super::*;

        #[test]
        fn new_session_is_not_started() {
            let session = test_session();
            assert_eq!(session.state(), SessionState::NotStarted);
            assert!(session.started_at().is_none());
            assert!(session.completed_at().is_none());
        }

        #[test]
        fn subject_rejects_blank_name() {
            assert!(Subject::new("  ", None).is_err());
        }

        #[test]
        fn subject_drops_blank_role() {
            let subject = Subject::new("Alex", Some(" ".to_string())).unwrap();
            assert!(subject.role.is_none());
        }
    }

    mod start {
        use super::*;

        #[test]
        fn sets_relationship_name_and_started_at() {
            let session = started_session();
            assert_eq!(session.state(), SessionState::InProgress);
            assert_eq!(session.relationship(), Some(&peer()));
            assert_eq!(session.respondent_name(), Some("Jordan"));
            assert!(session.started_at().is_some());
        }

        #[test]
        fn blank_name_is_stored_absent() {
            let mut session = test_session();
            session.start(peer(), Some("   ".to_string())).unwrap();
            assert!(session.respondent_name().is_none());
        }

        #[test]
        fn rejects_overlong_name() {
            let mut session = test_session();
            let name = "x".repeat(MAX_RESPONDENT_NAME_LENGTH + 1);
            let err = session.start(peer(), Some(name)).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed);
            assert_eq!(session.state(), SessionState::NotStarted);
        }

        #[test]
        fn fails_when_already_in_progress() {
            let mut session = started_session();
            let err = session.start(peer(), None).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        }

        #[test]
        fn fails_when_completed() {
            let mut session = started_session();
            session.complete().unwrap();
            let err = session.start(peer(), None).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        }
    }

    mod complete {
        use super::*;

        #[test]
        fn sets_completed_at() {
            let mut session = started_session();
            session.complete().unwrap();
            assert_eq!(session.state(), SessionState::Completed);
            assert!(session.completed_at().is_some());
        }

        #[test]
        fn fails_when_not_started() {
            let mut session = test_session();
            let err = session.complete().unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        }

        #[test]
        fn fails_with_closed_when_completed_twice() {
            let mut session = started_session();
            session.complete().unwrap();
            let err = session.complete().unwrap_err();
            assert_eq!(err.code, ErrorCode::SessionClosed);
        }
    }

    mod moderation {
        use super::*;

        #[test]
        fn flag_sets_reason() {
            let mut session = test_session();
            session.flag("  abusive language ").unwrap();
            assert!(session.is_flagged());
            assert_eq!(session.moderation().unwrap().reason, "abusive language");
        }

        #[test]
        fn flag_rejects_empty_reason() {
            let mut session = test_session();
            assert!(session.flag("").is_err());
            assert!(!session.is_flagged());
        }

        #[test]
        fn flag_is_allowed_after_completion() {
            let mut session = started_session();
            session.complete().unwrap();
            assert!(session.flag("spam").is_ok());
            assert_eq!(session.state(), SessionState::Completed);
        }

        #[test]
        fn clear_flag_reports_previous_presence() {
            let mut session = test_session();
            assert!(!session.clear_flag());
            session.flag("spam").unwrap();
            assert!(session.clear_flag());
            assert!(!session.is_flagged());
        }
    }
}
