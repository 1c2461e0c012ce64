//! RetryTurnHandler - Regenerates a missing interviewer turn.
//!
//! Valid only while the interviewer owes a reply: the log ends with a
//! respondent turn, or is empty because the opening greeting failed. With
//! greetings disabled an empty log owes nothing. Appends exactly one
//! interviewer turn and never touches the respondent's message.

use std::sync::Arc;

use crate::domain::interview::{InterviewProgress, Message};
use crate::ports::{MessageLog, RateLimitBucket, RateLimiter, SessionRepository, TemplateReader};

use super::common::{admit, claim, session_by_id, session_by_token, template_for};
use crate::application::{InterviewError, SingleFlight, TurnPipeline};

/// Command to retry the interviewer half of a turn.
#[derive(Debug, Clone)]
pub struct RetryTurnCommand {
    pub token: String,
}

/// Handler for turn retries.
pub struct RetryTurnHandler {
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageLog>,
    templates: Arc<dyn TemplateReader>,
    rate_limiter: Arc<dyn RateLimiter>,
    flights: SingleFlight,
    pipeline: TurnPipeline,
}

impl RetryTurnHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        messages: Arc<dyn MessageLog>,
        templates: Arc<dyn TemplateReader>,
        rate_limiter: Arc<dyn RateLimiter>,
        flights: SingleFlight,
        pipeline: TurnPipeline,
    ) -> Self {
        Self {
            sessions,
            messages,
            templates,
            rate_limiter,
            flights,
            pipeline,
        }
    }

    pub async fn handle(&self, cmd: RetryTurnCommand) -> Result<Message, InterviewError> {
        let session = session_by_token(self.sessions.as_ref(), &cmd.token).await?;
        session.ensure_accepts_turns()?;

        let permit = claim(&self.flights, *session.id())?;
        let session = session_by_id(self.sessions.as_ref(), session.id()).await?;
        session.ensure_accepts_turns()?;
        let template = template_for(self.templates.as_ref(), &session).await?;

        let history = self.messages.list_by_session(session.id()).await?;
        let opening_turn = self.pipeline.settings().opening_turn;
        if !InterviewProgress::replay(&history, opening_turn).awaiting_interviewer {
            return Err(InterviewError::invalid_state(
                "No interviewer turn is pending for this session",
            ));
        }

        admit(&self.rate_limiter, RateLimitBucket::ChatTurn, session.id()).await?;

        tracing::info!(
            session_id = %session.id(),
            logged_turns = history.len(),
            "Retrying interviewer turn"
        );
        self.pipeline.run(permit, &session, &template, &history).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::super::{SendTurnCommand, SendTurnHandler, StartSessionCommand, StartSessionHandler};
    use super::*;
    use crate::adapters::ai::MockTurnGenerator;
    use crate::domain::interview::Role;
    use crate::ports::TurnGenerationError;

    fn retry(h: &Harness) -> RetryTurnHandler {
        RetryTurnHandler::new(
            h.sessions.clone(),
            h.messages.clone(),
            h.templates.clone(),
            h.limiter.clone(),
            h.flights.clone(),
            h.pipeline(),
        )
    }

    async fn start(h: &Harness, token: &str) -> Result<(), InterviewError> {
        StartSessionHandler::new(
            h.sessions.clone(),
            h.templates.clone(),
            h.limiter.clone(),
            h.flights.clone(),
            h.pipeline(),
        )
        .handle(StartSessionCommand {
            token: token.to_string(),
            relationship: "manager".to_string(),
            respondent_name: None,
        })
        .await
        .map(|_| ())
    }

    #[tokio::test]
    async fn retry_produces_missing_opening_turn() {
        let h = Harness::new(
            MockTurnGenerator::new()
                .with_error(TurnGenerationError::network("reset"))
                .with_turn("Hello! How long have you managed Sam?"),
        )
        .await;
        let (id, token) = h.invite().await;
        assert!(start(&h, &token).await.is_err());

        let message = retry(&h)
            .handle(RetryTurnCommand { token })
            .await
            .unwrap();

        assert_eq!(message.role(), Role::Interviewer);
        assert_eq!(h.messages.list_by_session(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn retry_after_failed_reply_does_not_duplicate_respondent_turn() {
        let h = Harness::new(
            MockTurnGenerator::new()
                .with_turn("Welcome!")
                .with_error(TurnGenerationError::unavailable("overloaded"))
                .with_turn("Could you say more?"),
        )
        .await;
        let (id, token) = h.invite().await;
        start(&h, &token).await.unwrap();

        let send = SendTurnHandler::new(
            h.sessions.clone(),
            h.messages.clone(),
            h.templates.clone(),
            h.limiter.clone(),
            h.flights.clone(),
            h.pipeline(),
        );
        assert!(send
            .handle(SendTurnCommand {
                token: token.clone(),
                content: "Very dependable".to_string(),
                rating: None,
            })
            .await
            .is_err());

        retry(&h).handle(RetryTurnCommand { token }).await.unwrap();

        let log = h.messages.list_by_session(&id).await.unwrap();
        let roles: Vec<_> = log.iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            vec![Role::Interviewer, Role::Respondent, Role::Interviewer]
        );
    }

    #[tokio::test]
    async fn retry_without_pending_turn_is_invalid_state() {
        let h = Harness::new(MockTurnGenerator::new()).await;
        let (_, token) = h.invite().await;
        start(&h, &token).await.unwrap();

        let err = retry(&h).handle(RetryTurnCommand { token }).await.unwrap_err();
        assert!(matches!(err, InterviewError::InvalidState(_)));
    }

    #[tokio::test]
    async fn empty_log_without_greeting_has_nothing_to_retry() {
        let h = Harness::new(MockTurnGenerator::new()).await;
        let (id, token) = h.invite().await;
        StartSessionHandler::new(
            h.sessions.clone(),
            h.templates.clone(),
            h.limiter.clone(),
            h.flights.clone(),
            h.silent_pipeline(),
        )
        .handle(StartSessionCommand {
            token: token.clone(),
            relationship: "peer".to_string(),
            respondent_name: None,
        })
        .await
        .unwrap();

        let err = RetryTurnHandler::new(
            h.sessions.clone(),
            h.messages.clone(),
            h.templates.clone(),
            h.limiter.clone(),
            h.flights.clone(),
            h.silent_pipeline(),
        )
        .handle(RetryTurnCommand { token })
        .await
        .unwrap_err();

        assert!(matches!(err, InterviewError::InvalidState(_)));
        assert_eq!(h.generator.call_count(), 0);
        assert!(h.messages.list_by_session(&id).await.unwrap().is_empty());
    }
}
