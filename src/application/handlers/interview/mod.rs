//! Interview command and query handlers.
//!
//! Handles the respondent-facing operations: starting a session, sending and
//! retrying turns, completing, and reading the transcript.

mod common;
mod complete_session;
mod get_transcript;
mod retry_turn;
mod send_turn;
mod start_session;

pub use complete_session::{CompleteSessionCommand, CompleteSessionHandler};
pub use get_transcript::{GetTranscriptHandler, GetTranscriptQuery, TranscriptView};
pub use retry_turn::{RetryTurnCommand, RetryTurnHandler};
pub use send_turn::{SendTurnCommand, SendTurnHandler, SendTurnResult};
pub use start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};

#[cfg(test)]
pub(crate) mod testing {
    //! Shared wiring for handler tests.

    use std::sync::Arc;
    use std::time::Duration;

    use crate::adapters::ai::MockTurnGenerator;
    use crate::adapters::memory::{
        InMemoryMessageLog, InMemorySessionRepository, InMemoryTemplateReader,
    };
    use crate::adapters::rate_limiter::{ManualClock, SlidingWindowRateLimiter};
    use crate::adapters::summary::LoggingSummaryScheduler;
    use crate::application::{PipelineSettings, SingleFlight, TurnPipeline};
    use crate::domain::foundation::{
        QuestionId, RelationshipId, SessionId, SessionToken, TemplateId,
    };
    use crate::domain::interview::{Question, RatingScale, RelationshipOption, Template};
    use crate::domain::session::{Session, Subject};
    use crate::ports::SessionRepository;

    pub struct Harness {
        pub sessions: Arc<InMemorySessionRepository>,
        pub messages: Arc<InMemoryMessageLog>,
        pub templates: Arc<InMemoryTemplateReader>,
        pub limiter: Arc<SlidingWindowRateLimiter>,
        pub clock: Arc<ManualClock>,
        pub summaries: Arc<LoggingSummaryScheduler>,
        pub generator: MockTurnGenerator,
        pub flights: SingleFlight,
        pub template: Template,
    }

    impl Harness {
        pub async fn new(generator: MockTurnGenerator) -> Self {
            let template = template();
            let templates = Arc::new(InMemoryTemplateReader::new());
            templates.put(template.clone()).await;
            let clock = Arc::new(ManualClock::default());
            Self {
                sessions: Arc::new(InMemorySessionRepository::new()),
                messages: Arc::new(InMemoryMessageLog::new()),
                templates,
                limiter: Arc::new(SlidingWindowRateLimiter::with_clock(clock.clone())),
                clock,
                summaries: Arc::new(LoggingSummaryScheduler::new()),
                generator,
                flights: SingleFlight::new(),
                template,
            }
        }

        pub fn pipeline(&self) -> TurnPipeline {
            self.pipeline_with(true)
        }

        /// Pipeline whose sessions start without an interviewer greeting.
        pub fn silent_pipeline(&self) -> TurnPipeline {
            self.pipeline_with(false)
        }

        fn pipeline_with(&self, opening_turn: bool) -> TurnPipeline {
            TurnPipeline::new(
                self.messages.clone(),
                Arc::new(self.generator.clone()),
                PipelineSettings {
                    max_transcript_turns: 20,
                    generation_timeout: Duration::from_secs(2),
                    opening_turn,
                },
            )
        }

        /// Inserts a fresh `NotStarted` session and returns its token.
        pub async fn invite(&self) -> (SessionId, String) {
            let session = Session::new(
                SessionId::new(),
                SessionToken::generate(),
                *self.template.id(),
                Subject::new("Sam Rivera", Some("Staff Engineer".to_string())).unwrap(),
            );
            self.sessions.insert(&session).await.unwrap();
            (*session.id(), session.token().as_str().to_string())
        }

        pub async fn session(&self, id: &SessionId) -> Session {
            self.sessions.find_by_id(id).await.unwrap().unwrap()
        }
    }

    pub fn template() -> Template {
        Template::new(
            TemplateId::new(),
            "360 feedback",
            Some("Warm and curious about {{subjectName}}.".to_string()),
            vec![
                RelationshipOption::new(RelationshipId::new("peer").unwrap(), "Peer"),
                RelationshipOption::new(RelationshipId::new("manager").unwrap(), "Manager"),
            ],
            vec![
                Question::text(
                    QuestionId::new("strengths").unwrap(),
                    "What does {{subjectName}} do especially well?",
                )
                .collecting_multiple(),
                Question::rating(
                    QuestionId::new("overall").unwrap(),
                    "How would you rate working with {{subjectName}}?",
                    RatingScale::new(1.0, 10.0).unwrap(),
                ),
            ],
        )
        .unwrap()
    }
}
