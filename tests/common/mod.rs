//! Shared fixture for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use feedback_interviews::adapters::ai::MockTurnGenerator;
use feedback_interviews::adapters::memory::{
    InMemoryMessageLog, InMemorySessionRepository, InMemoryTemplateReader,
};
use feedback_interviews::adapters::rate_limiter::{ManualClock, SlidingWindowRateLimiter};
use feedback_interviews::adapters::summary::LoggingSummaryScheduler;
use feedback_interviews::application::{InterviewOrchestrator, OrchestratorDeps, PipelineSettings};
use feedback_interviews::domain::foundation::{
    QuestionId, RelationshipId, SessionId, SessionToken, TemplateId,
};
use feedback_interviews::domain::interview::{
    Question, RatingScale, RelationshipOption, Template,
};
use feedback_interviews::domain::session::{Session, Subject};
use feedback_interviews::ports::SessionRepository;

pub struct Fixture {
    pub orchestrator: Arc<InterviewOrchestrator>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub messages: Arc<InMemoryMessageLog>,
    pub limiter: Arc<SlidingWindowRateLimiter>,
    pub clock: Arc<ManualClock>,
    pub summaries: Arc<LoggingSummaryScheduler>,
    pub generator: MockTurnGenerator,
    pub template: Template,
}

impl Fixture {
    /// Respondent speaks first; no greeting on start.
    pub async fn new(generator: MockTurnGenerator) -> Self {
        Self::with_settings(
            generator,
            PipelineSettings {
                opening_turn: false,
                ..settings()
            },
        )
        .await
    }

    /// Interviewer greets the respondent on start.
    pub async fn with_opening(generator: MockTurnGenerator) -> Self {
        Self::with_settings(generator, settings()).await
    }

    pub async fn with_settings(generator: MockTurnGenerator, settings: PipelineSettings) -> Self {
        let template = template();
        let templates = Arc::new(InMemoryTemplateReader::new());
        templates.put(template.clone()).await;

        let sessions = Arc::new(InMemorySessionRepository::new());
        let messages = Arc::new(InMemoryMessageLog::new());
        let clock = Arc::new(ManualClock::default());
        let limiter = Arc::new(SlidingWindowRateLimiter::with_clock(clock.clone()));
        let summaries = Arc::new(LoggingSummaryScheduler::new());

        let orchestrator = Arc::new(InterviewOrchestrator::new(
            OrchestratorDeps {
                sessions: sessions.clone(),
                messages: messages.clone(),
                templates,
                generator: Arc::new(generator.clone()),
                rate_limiter: limiter.clone(),
                summaries: summaries.clone(),
            },
            settings,
        ));

        Self {
            orchestrator,
            sessions,
            messages,
            limiter,
            clock,
            summaries,
            generator,
            template,
        }
    }

    /// Creates a `NotStarted` invitation and returns its id and token.
    pub async fn invite(&self) -> (SessionId, String) {
        let session = Session::new(
            SessionId::new(),
            SessionToken::generate(),
            *self.template.id(),
            Subject::new("Priya Natarajan", Some("Product Lead".to_string())).unwrap(),
        );
        self.sessions.insert(&session).await.unwrap();
        (*session.id(), session.token().as_str().to_string())
    }
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        max_transcript_turns: 20,
        generation_timeout: Duration::from_secs(2),
        opening_turn: true,
    }
}

pub fn template() -> Template {
    Template::new(
        TemplateId::new(),
        "Quarterly 360",
        Some("Curious and kind.".to_string()),
        vec![
            RelationshipOption::new(RelationshipId::new("peer").unwrap(), "Peer"),
            RelationshipOption::new(RelationshipId::new("report").unwrap(), "Direct report"),
        ],
        vec![
            Question::text(
                QuestionId::new("strengths").unwrap(),
                "What does {{subjectName}} do well?",
            ),
            Question::rating(
                QuestionId::new("overall").unwrap(),
                "Rate your collaboration with {{subjectName}}.",
                RatingScale::new(1.0, 10.0).unwrap(),
            ),
        ],
    )
    .unwrap()
}
