//! Interviewer turn pipeline.
//!
//! One run produces and persists exactly one interviewer turn:
//! build context → window transcript → generate (time-bounded) → sanitize →
//! resolve question link → append.
//!
//! The generate-and-append half runs on a spawned task that owns the
//! session's [`FlightPermit`]. A caller that goes away does not cancel it;
//! the turn still lands in the log and shows up on the next read.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::foundation::SessionId;
use crate::domain::interview::{
    build_context, render_question_text, sanitize, transcript_window, InterviewContext, Message,
    Methodology, NewMessage, QuestionLink, Template, INTERVIEW_METHODOLOGY, MAX_CONTENT_LENGTH,
};
use crate::domain::session::Session;
use crate::ports::{GeneratedTurn, MessageLog, TurnGenerator, TurnRequest};

use super::single_flight::FlightPermit;
use super::InterviewError;

/// Seed prompt for a session's first interviewer turn.
pub const OPENING_SEED: &str =
    "The respondent has just joined. Greet them briefly by acknowledging their relationship \
     to the subject, then ask your first open question.";

/// Tunables for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Most recent turns passed to the generator.
    pub max_transcript_turns: usize,
    /// Upper bound on one generator call.
    pub generation_timeout: Duration,
    /// Whether starting a session produces the interviewer's greeting.
    pub opening_turn: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_transcript_turns: 40,
            generation_timeout: Duration::from_secs(45),
            opening_turn: true,
        }
    }
}

/// Produces and persists interviewer turns.
#[derive(Clone)]
pub struct TurnPipeline {
    messages: Arc<dyn MessageLog>,
    generator: Arc<dyn TurnGenerator>,
    methodology: Methodology,
    settings: PipelineSettings,
}

impl TurnPipeline {
    pub fn new(
        messages: Arc<dyn MessageLog>,
        generator: Arc<dyn TurnGenerator>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            messages,
            generator,
            methodology: INTERVIEW_METHODOLOGY,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Builds the generator instructions for a session.
    pub fn build_context(
        &self,
        session: &Session,
        template: &Template,
    ) -> Result<String, InterviewError> {
        let relationship_label = session
            .relationship()
            .map(|id| {
                template
                    .relationship(id)
                    .map(|option| option.label.as_str())
                    .unwrap_or_else(|| id.as_str())
            })
            .unwrap_or("unspecified");

        let context = InterviewContext {
            subject_name: &session.subject().name,
            subject_role: session.subject().role.as_deref(),
            relationship_label,
            persona: template.persona(),
            questions: template.questions(),
        };
        Ok(build_context(&self.methodology, &context)?)
    }

    /// Generates the next interviewer turn from `history` and appends it.
    ///
    /// `history` is the full log; an empty log produces the opening turn.
    ///
    /// # Errors
    ///
    /// - `InvalidTemplate` if the context cannot be built
    /// - `GenerationFailed` on generator error, timeout, or empty output
    /// - store errors from the append
    pub async fn run(
        &self,
        permit: FlightPermit,
        session: &Session,
        template: &Template,
        history: &[Message],
    ) -> Result<Message, InterviewError> {
        let session_id = *session.id();
        let context = self.build_context(session, template)?;
        let request = if history.is_empty() {
            TurnRequest::opening(session_id, context, OPENING_SEED)
        } else {
            let window = transcript_window(history, self.settings.max_transcript_turns);
            TurnRequest::continuation(session_id, context, window)
        };

        let messages = Arc::clone(&self.messages);
        let generator = Arc::clone(&self.generator);
        let timeout = self.settings.generation_timeout;
        let template = template.clone();
        let subject_name = session.subject().name.clone();

        let task = tokio::spawn(async move {
            let _permit = permit;
            let generated = generate(generator.as_ref(), request, timeout).await?;
            let draft = interviewer_turn(session_id, generated, &template, &subject_name)?;
            let message = messages.append(draft).await?;

            tracing::info!(
                session_id = %session_id,
                sequence = message.sequence().value(),
                question_id = message.question().map(|q| q.question_id.as_str()),
                "Appended interviewer turn"
            );
            Ok::<_, InterviewError>(message)
        });

        task.await
            .map_err(|e| InterviewError::Infrastructure(format!("Turn task failed: {}", e)))?
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Whole milliseconds, saturating at `u64::MAX`.
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

async fn generate(
    generator: &dyn TurnGenerator,
    request: TurnRequest,
    timeout: Duration,
) -> Result<GeneratedTurn, InterviewError> {
    let session_id = request.session_id;
    let opening = request.is_opening();
    let started = Instant::now();

    let outcome = tokio::time::timeout(timeout, generator.generate_turn(request)).await;
    let elapsed_ms = saturating_millis(started.elapsed());

    match outcome {
        Ok(Ok(turn)) => {
            tracing::debug!(session_id = %session_id, opening, elapsed_ms, "Generated turn");
            Ok(turn)
        }
        Ok(Err(err)) => {
            tracing::warn!(
                session_id = %session_id,
                opening,
                elapsed_ms,
                error = %err,
                generator = %generator.generator_info().name,
                "Turn generation failed"
            );
            Err(err.into())
        }
        Err(_) => {
            tracing::warn!(
                session_id = %session_id,
                opening,
                timeout_secs = timeout.as_secs(),
                "Turn generation timed out"
            );
            Err(InterviewError::generation_failed(format!(
                "request timed out after {}s",
                timeout.as_secs()
            )))
        }
    }
}

/// Sanitizes generator output and links it to a template question.
fn interviewer_turn(
    session_id: SessionId,
    generated: GeneratedTurn,
    template: &Template,
    subject_name: &str,
) -> Result<NewMessage, InterviewError> {
    let cleaned = sanitize(&generated.text);
    if cleaned.is_empty() {
        return Err(InterviewError::generation_failed(
            "generator returned no usable text",
        ));
    }
    let content: String = cleaned.chars().take(MAX_CONTENT_LENGTH).collect();

    let link = generated.question_id.and_then(|id| match template.question(&id) {
        Some(question) => Some(QuestionLink::new(
            id,
            render_question_text(question, subject_name),
        )),
        None => {
            tracing::debug!(session_id = %session_id, question_id = %id, "Ignoring unknown question id");
            None
        }
    });

    Ok(NewMessage::interviewer(session_id, content)?.with_question(link))
}
