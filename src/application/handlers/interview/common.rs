//! Lookups and admission checks shared by the interview handlers.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, SessionToken};
use crate::domain::interview::Template;
use crate::domain::session::Session;
use crate::ports::{
    RateLimitBucket, RateLimitKey, RateLimitResult, RateLimiter, SessionRepository,
    TemplateReader,
};

use crate::application::{FlightPermit, InterviewError, SingleFlight};

/// Resolves a respondent token. Malformed tokens resolve to nothing.
pub(crate) async fn session_by_token(
    sessions: &dyn SessionRepository,
    token: &str,
) -> Result<Session, InterviewError> {
    let token = SessionToken::new(token).map_err(|_| InterviewError::NotFound)?;
    sessions
        .find_by_token(&token)
        .await?
        .ok_or(InterviewError::NotFound)
}

/// Re-reads a session after its permit is held.
pub(crate) async fn session_by_id(
    sessions: &dyn SessionRepository,
    id: &SessionId,
) -> Result<Session, InterviewError> {
    sessions.find_by_id(id).await?.ok_or(InterviewError::NotFound)
}

pub(crate) async fn template_for(
    templates: &dyn TemplateReader,
    session: &Session,
) -> Result<Template, InterviewError> {
    templates
        .find_by_id(session.template_id())
        .await?
        .ok_or_else(|| {
            InterviewError::InvalidTemplate(format!(
                "Template {} for session {} not found",
                session.template_id(),
                session.id()
            ))
        })
}

pub(crate) fn claim(
    flights: &SingleFlight,
    session_id: SessionId,
) -> Result<FlightPermit, InterviewError> {
    flights.try_acquire(session_id).ok_or_else(|| {
        tracing::debug!(session_id = %session_id, "Rejected concurrent turn");
        InterviewError::AlreadyInProgress
    })
}

/// Applies a rate-limit bucket keyed by session id.
///
/// A limiter backend failure admits the request; the limiter is best-effort.
pub(crate) async fn admit(
    limiter: &Arc<dyn RateLimiter>,
    bucket: RateLimitBucket,
    session_id: &SessionId,
) -> Result<(), InterviewError> {
    let key = RateLimitKey::new(bucket, session_id.to_string());
    match limiter.check(&key).await {
        Ok(RateLimitResult::Allowed(_)) => Ok(()),
        Ok(RateLimitResult::Denied(denied)) => Err(denied.into()),
        Err(err) => {
            tracing::warn!(
                session_id = %session_id,
                bucket = %bucket,
                error = %err,
                "Rate limiter unavailable; admitting request"
            );
            Ok(())
        }
    }
}
