//! SendTurnHandler - Command handler for a respondent turn.
//!
//! Sequence per turn: validate → resolve → state check → single-flight →
//! alternation check → rate limit → append respondent turn → generate and
//! append interviewer turn.
//!
//! The respondent turn is durable before generation starts. If generation
//! fails it is not rolled back; the caller retries only the interviewer half
//! through `RetryTurn`.

use std::sync::Arc;

use crate::domain::interview::{
    InterviewProgress, Message, NewMessage, RatingValue, MAX_CONTENT_LENGTH,
};
use crate::ports::{MessageLog, RateLimitBucket, RateLimiter, SessionRepository, TemplateReader};

use super::common::{admit, claim, session_by_id, session_by_token, template_for};
use crate::application::{InterviewError, SingleFlight, TurnPipeline};

/// Command to send a respondent turn.
#[derive(Debug, Clone)]
pub struct SendTurnCommand {
    pub token: String,
    pub content: String,
    /// Raw rating for the current question, validated before storage.
    pub rating: Option<f64>,
}

/// The two turns appended by a successful send.
#[derive(Debug, Clone)]
pub struct SendTurnResult {
    pub respondent: Message,
    pub interviewer: Message,
}

impl SendTurnResult {
    pub fn into_messages(self) -> Vec<Message> {
        vec![self.respondent, self.interviewer]
    }
}

/// Handler for respondent turns.
pub struct SendTurnHandler {
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageLog>,
    templates: Arc<dyn TemplateReader>,
    rate_limiter: Arc<dyn RateLimiter>,
    flights: SingleFlight,
    pipeline: TurnPipeline,
}

impl SendTurnHandler {
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

    pub async fn handle(&self, cmd: SendTurnCommand) -> Result<SendTurnResult, InterviewError> {
        // 1. Cheap input validation before any lookup
        let content = cmd.content.trim();
        if content.is_empty() {
            return Err(InterviewError::validation("content", "Message cannot be empty"));
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(InterviewError::validation(
                "content",
                format!("Message must be {} characters or less", MAX_CONTENT_LENGTH),
            ));
        }

        // 2. Resolve and check state
        let session = session_by_token(self.sessions.as_ref(), &cmd.token).await?;
        session.ensure_accepts_turns()?;

        // 3. Single-flight, then re-read; completion may have raced us
        let permit = claim(&self.flights, *session.id())?;
        let session = session_by_id(self.sessions.as_ref(), session.id()).await?;
        session.ensure_accepts_turns()?;
        let template = template_for(self.templates.as_ref(), &session).await?;

        // 4. Alternation: the interviewer must have the last word
        let mut history = self.messages.list_by_session(session.id()).await?;
        let opening_turn = self.pipeline.settings().opening_turn;
        if InterviewProgress::replay(&history, opening_turn).awaiting_interviewer {
            return Err(InterviewError::invalid_state(
                "Awaiting the interviewer's reply; retry the turn instead",
            ));
        }

        // 5. Admission; rejected requests above never spend a slot
        admit(&self.rate_limiter, RateLimitBucket::ChatTurn, session.id()).await?;

        // 6. Link to the open question and validate any rating against it
        let link = history
            .iter()
            .rev()
            .find(|m| m.is_interviewer())
            .and_then(|m| m.question().cloned());
        let question = link
            .as_ref()
            .and_then(|l| template.question(&l.question_id));
        let rating = RatingValue::for_question(cmd.rating, question);

        let draft = NewMessage::respondent(*session.id(), content)?
            .with_question(link)
            .with_rating(rating);
        let respondent = self.messages.append(draft).await?;

        tracing::info!(
            session_id = %session.id(),
            sequence = respondent.sequence().value(),
            rated = respondent.rating().is_some(),
            "Appended respondent turn"
        );

        // 7. Interviewer half
        history.push(respondent.clone());
        let interviewer = self.pipeline.run(permit, &session, &template, &history).await?;

        Ok(SendTurnResult {
            respondent,
            interviewer,
        })
    }
}
