//! InterviewOrchestrator - Façade over the interview handlers.
//!
//! Builds every handler from one set of ports so they share a single
//! [`SingleFlight`] registry and [`TurnPipeline`]. Callers (the HTTP layer,
//! integration tests) talk to this type instead of wiring handlers one by one.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::interview::Message;
use crate::domain::session::Session;
use crate::ports::{MessageLog, RateLimiter, SessionRepository, SummaryScheduler, TemplateReader, TurnGenerator};

use super::handlers::{
    ClearFlagCommand, ClearFlagHandler, CompleteSessionCommand, CompleteSessionHandler,
    DeleteSessionCommand, DeleteSessionHandler, FlagSessionCommand, FlagSessionHandler,
    GetTranscriptHandler, GetTranscriptQuery, RetryTurnCommand, RetryTurnHandler,
    SendTurnCommand, SendTurnHandler, SendTurnResult, StartSessionCommand, StartSessionHandler,
    StartSessionResult, TranscriptView,
};
use super::{InterviewError, PipelineSettings, SingleFlight, TurnPipeline};

/// Ports the orchestrator is built from.
#[derive(Clone)]
pub struct OrchestratorDeps {
    pub sessions: Arc<dyn SessionRepository>,
    pub messages: Arc<dyn MessageLog>,
    pub templates: Arc<dyn TemplateReader>,
    pub generator: Arc<dyn TurnGenerator>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub summaries: Arc<dyn SummaryScheduler>,
}

/// Entry point for every interview and admin operation.
pub struct InterviewOrchestrator {
    start: StartSessionHandler,
    send: SendTurnHandler,
    retry: RetryTurnHandler,
    complete: CompleteSessionHandler,
    transcript: GetTranscriptHandler,
    flag: FlagSessionHandler,
    clear_flag: ClearFlagHandler,
    delete: DeleteSessionHandler,
    flights: SingleFlight,
}

impl InterviewOrchestrator {
    pub fn new(deps: OrchestratorDeps, settings: PipelineSettings) -> Self {
        let flights = SingleFlight::new();
        let opening_turn = settings.opening_turn;
        let pipeline = TurnPipeline::new(deps.messages.clone(), deps.generator.clone(), settings);

        tracing::info!(
            generator = %deps.generator.generator_info().name,
            model = %deps.generator.generator_info().model,
            max_transcript_turns = pipeline.settings().max_transcript_turns,
            "Interview orchestrator ready"
        );

        Self {
            start: StartSessionHandler::new(
                deps.sessions.clone(),
                deps.templates.clone(),
                deps.rate_limiter.clone(),
                flights.clone(),
                pipeline.clone(),
            ),
            send: SendTurnHandler::new(
                deps.sessions.clone(),
                deps.messages.clone(),
                deps.templates.clone(),
                deps.rate_limiter.clone(),
                flights.clone(),
                pipeline.clone(),
            ),
            retry: RetryTurnHandler::new(
                deps.sessions.clone(),
                deps.messages.clone(),
                deps.templates.clone(),
                deps.rate_limiter.clone(),
                flights.clone(),
                pipeline,
            ),
            complete: CompleteSessionHandler::new(
                deps.sessions.clone(),
                deps.summaries,
                flights.clone(),
            ),
            transcript: GetTranscriptHandler::new(deps.sessions.clone(), deps.messages.clone())
                .with_opening_turn(opening_turn),
            flag: FlagSessionHandler::new(deps.sessions.clone()),
            clear_flag: ClearFlagHandler::new(deps.sessions.clone()),
            delete: DeleteSessionHandler::new(deps.sessions, deps.messages, flights.clone()),
            flights,
        }
    }

    pub async fn start_session(
        &self,
        token: impl Into<String>,
        relationship: impl Into<String>,
        respondent_name: Option<String>,
    ) -> Result<StartSessionResult, InterviewError> {
        self.start
            .handle(StartSessionCommand {
                token: token.into(),
                relationship: relationship.into(),
                respondent_name,
            })
            .await
    }

    pub async fn send_turn(
        &self,
        token: impl Into<String>,
        content: impl Into<String>,
        rating: Option<f64>,
    ) -> Result<SendTurnResult, InterviewError> {
        self.send
            .handle(SendTurnCommand {
                token: token.into(),
                content: content.into(),
                rating,
            })
            .await
    }

    pub async fn retry_turn(&self, token: impl Into<String>) -> Result<Message, InterviewError> {
        self.retry
            .handle(RetryTurnCommand {
                token: token.into(),
            })
            .await
    }

    pub async fn complete_session(
        &self,
        token: impl Into<String>,
    ) -> Result<Session, InterviewError> {
        self.complete
            .handle(CompleteSessionCommand {
                token: token.into(),
            })
            .await
    }

    pub async fn get_transcript(
        &self,
        token: impl Into<String>,
    ) -> Result<TranscriptView, InterviewError> {
        self.transcript
            .handle(GetTranscriptQuery {
                token: token.into(),
            })
            .await
    }

    pub async fn flag_session(
        &self,
        session_id: SessionId,
        reason: impl Into<String>,
    ) -> Result<Session, InterviewError> {
        self.flag
            .handle(FlagSessionCommand {
                session_id,
                reason: reason.into(),
            })
            .await
    }

    pub async fn clear_flag(&self, session_id: SessionId) -> Result<Session, InterviewError> {
        self.clear_flag.handle(ClearFlagCommand { session_id }).await
    }

    /// Deletes a session and its log; returns the number of messages removed.
    pub async fn delete_session(&self, session_id: SessionId) -> Result<u64, InterviewError> {
        self.delete.handle(DeleteSessionCommand { session_id }).await
    }

    /// Returns true while a pipeline is running for the session.
    pub fn is_in_flight(&self, session_id: &SessionId) -> bool {
        self.flights.is_in_flight(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockTurnGenerator;
    use crate::application::handlers::interview::testing::Harness;
    use crate::domain::session::SessionState;

    fn orchestrator(h: &Harness) -> InterviewOrchestrator {
        InterviewOrchestrator::new(
            OrchestratorDeps {
                sessions: h.sessions.clone(),
                messages: h.messages.clone(),
                templates: h.templates.clone(),
                generator: Arc::new(h.generator.clone()),
                rate_limiter: h.limiter.clone(),
                summaries: h.summaries.clone(),
            },
            PipelineSettings::default(),
        )
    }

    #[tokio::test]
    async fn full_interview_round_trip() {
        let h = Harness::new(
            MockTurnGenerator::new()
                .with_turn("Hi! How do you work with Sam?")
                .with_turn("What stands out?"),
        )
        .await;
        let (id, token) = h.invite().await;
        let orchestrator = orchestrator(&h);

        orchestrator.start_session(&token, "peer", None).await.unwrap();
        orchestrator.send_turn(&token, "Daily standups", None).await.unwrap();
        let session = orchestrator.complete_session(&token).await.unwrap();

        assert_eq!(session.state(), SessionState::Completed);
        let view = orchestrator.get_transcript(&token).await.unwrap();
        assert_eq!(view.messages.len(), 3);
        assert!(!orchestrator.is_in_flight(&id));

        let err = orchestrator.send_turn(&token, "One more", None).await.unwrap_err();
        assert_eq!(err, InterviewError::SessionClosed);
    }

    #[tokio::test]
    async fn admin_operations_work_by_session_id() {
        let h = Harness::new(MockTurnGenerator::new()).await;
        let (id, token) = h.invite().await;
        let orchestrator = orchestrator(&h);
        orchestrator.start_session(&token, "manager", None).await.unwrap();

        assert!(orchestrator.flag_session(id, "abusive").await.unwrap().is_flagged());
        assert!(!orchestrator.clear_flag(id).await.unwrap().is_flagged());
        assert_eq!(orchestrator.delete_session(id).await.unwrap(), 1);
        assert_eq!(
            orchestrator.get_transcript(&token).await.unwrap_err(),
            InterviewError::NotFound
        );
    }
}
