//! StartSessionHandler - Command handler for beginning an interview.
//!
//! Moves the session `NotStarted → InProgress` with the respondent's
//! relationship selection, then (unless disabled) produces the interviewer's
//! opening turn. If the opening turn fails the session stays `InProgress` with an empty
//! log and the caller retries via `RetryTurn`.

use std::sync::Arc;

use crate::domain::foundation::RelationshipId;
use crate::domain::interview::Message;
use crate::domain::session::{Session, SessionState};
use crate::ports::{RateLimitBucket, RateLimiter, SessionRepository, TemplateReader};

use super::common::{admit, claim, session_by_id, session_by_token, template_for};
use crate::application::{InterviewError, SingleFlight, TurnPipeline};

/// Command to start a session.
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub token: String,
    pub relationship: String,
    pub respondent_name: Option<String>,
}

/// Result of a successful start.
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session: Session,
    /// Interviewer greeting; absent when opening turns are disabled.
    pub opening: Option<Message>,
}

/// Handler for starting sessions.
pub struct StartSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    templates: Arc<dyn TemplateReader>,
    rate_limiter: Arc<dyn RateLimiter>,
    flights: SingleFlight,
    pipeline: TurnPipeline,
}

impl StartSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        templates: Arc<dyn TemplateReader>,
        rate_limiter: Arc<dyn RateLimiter>,
        flights: SingleFlight,
        pipeline: TurnPipeline,
    ) -> Self {
        Self {
            sessions,
            templates,
            rate_limiter,
            flights,
            pipeline,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartSessionCommand,
    ) -> Result<StartSessionResult, InterviewError> {
        // 1. Resolve session and reject anything but a fresh one
        let session = session_by_token(self.sessions.as_ref(), &cmd.token).await?;
        ensure_not_started(&session)?;

        // 2. Validate the relationship against the template
        let template = template_for(self.templates.as_ref(), &session).await?;
        let relationship = RelationshipId::new(cmd.relationship.trim())
            .map_err(|e| InterviewError::validation("relationship", e.to_string()))?;
        if template.relationship(&relationship).is_none() {
            return Err(InterviewError::validation(
                "relationship",
                format!("'{}' is not offered by this interview", relationship),
            ));
        }

        // 3. Single-flight, re-check, then admission
        let permit = claim(&self.flights, *session.id())?;
        let mut session = session_by_id(self.sessions.as_ref(), session.id()).await?;
        ensure_not_started(&session)?;
        admit(&self.rate_limiter, RateLimitBucket::SessionStart, session.id()).await?;

        // 4. Transition and persist
        session.start(relationship, cmd.respondent_name)?;
        self.sessions.update(&session).await?;

        tracing::info!(
            session_id = %session.id(),
            relationship = %session.relationship().map(|r| r.as_str()).unwrap_or_default(),
            "Session started"
        );

        // 5. Opening turn
        if !self.pipeline.settings().opening_turn {
            return Ok(StartSessionResult {
                session,
                opening: None,
            });
        }
        let opening = Some(self.pipeline.run(permit, &session, &template, &[]).await?);

        Ok(StartSessionResult { session, opening })
    }
}

fn ensure_not_started(session: &Session) -> Result<(), InterviewError> {
    if session.state() != SessionState::NotStarted {
        return Err(InterviewError::invalid_state(format!(
            "Session is already {}",
            session.state()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;
    use crate::adapters::ai::MockTurnGenerator;
    use crate::application::PipelineSettings;
    use crate::domain::interview::Role;
    use crate::ports::{MessageLog, TurnGenerationError};

    fn handler(h: &Harness) -> StartSessionHandler {
        StartSessionHandler::new(
            h.sessions.clone(),
            h.templates.clone(),
            h.limiter.clone(),
            h.flights.clone(),
            h.pipeline(),
        )
    }

    fn cmd(token: &str, relationship: &str) -> StartSessionCommand {
        StartSessionCommand {
            token: token.to_string(),
            relationship: relationship.to_string(),
            respondent_name: Some("Jo".to_string()),
        }
    }

    #[tokio::test]
    async fn starts_session_and_appends_opening_turn() {
        let h = Harness::new(MockTurnGenerator::new().with_turn("Hi Jo! How do you know Sam?")).await;
        let (id, token) = h.invite().await;

        let result = handler(&h).handle(cmd(&token, "peer")).await.unwrap();

        assert_eq!(result.session.state(), SessionState::InProgress);
        assert_eq!(result.session.respondent_name(), Some("Jo"));
        assert!(result.session.started_at().is_some());
        let opening = result.opening.unwrap();
        assert_eq!(opening.role(), Role::Interviewer);
        assert_eq!(opening.sequence().value(), 1);
        assert_eq!(h.session(&id).await.state(), SessionState::InProgress);
    }

    #[tokio::test]
    async fn disabled_opening_turn_leaves_log_empty() {
        let h = Harness::new(MockTurnGenerator::new()).await;
        let (id, token) = h.invite().await;
        let pipeline = TurnPipeline::new(
            h.messages.clone(),
            Arc::new(h.generator.clone()),
            PipelineSettings {
                opening_turn: false,
                ..PipelineSettings::default()
            },
        );
        let handler = StartSessionHandler::new(
            h.sessions.clone(),
            h.templates.clone(),
            h.limiter.clone(),
            h.flights.clone(),
            pipeline,
        );

        let result = handler.handle(cmd(&token, "peer")).await.unwrap();

        assert!(result.opening.is_none());
        assert_eq!(h.generator.call_count(), 0);
        assert!(h.messages.list_by_session(&id).await.unwrap().is_empty());
        assert!(!h.flights.is_in_flight(&id));
    }

    #[tokio::test]
    async fn unknown_relationship_is_rejected_before_transition() {
        let h = Harness::new(MockTurnGenerator::new()).await;
        let (id, token) = h.invite().await;

        let err = handler(&h).handle(cmd(&token, "intern")).await.unwrap_err();

        assert!(matches!(err, InterviewError::Validation { ref field, .. } if field == "relationship"));
        assert_eq!(h.session(&id).await.state(), SessionState::NotStarted);
    }

    #[tokio::test]
    async fn second_start_is_invalid_state() {
        let h = Harness::new(MockTurnGenerator::new()).await;
        let (_, token) = h.invite().await;
        handler(&h).handle(cmd(&token, "peer")).await.unwrap();

        let err = handler(&h).handle(cmd(&token, "peer")).await.unwrap_err();
        assert!(matches!(err, InterviewError::InvalidState(_)));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let h = Harness::new(MockTurnGenerator::new()).await;
        let err = handler(&h)
            .handle(cmd("0123456789abcdef0123456789abcdef", "peer"))
            .await
            .unwrap_err();
        assert_eq!(err, InterviewError::NotFound);
    }

    #[tokio::test]
    async fn failed_opening_leaves_session_in_progress_with_empty_log() {
        let h = Harness::new(
            MockTurnGenerator::new().with_error(TurnGenerationError::unavailable("down")),
        )
        .await;
        let (id, token) = h.invite().await;

        let err = handler(&h).handle(cmd(&token, "peer")).await.unwrap_err();

        assert!(matches!(err, InterviewError::GenerationFailed { .. }));
        assert_eq!(h.session(&id).await.state(), SessionState::InProgress);
        assert!(h.messages.list_by_session(&id).await.unwrap().is_empty());
    }
}
