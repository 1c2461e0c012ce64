//! Summary scheduler port.
//!
//! Completion hands the session to a summarizer. Summaries themselves are
//! produced elsewhere; the orchestrator only schedules them and never
//! waits for or fails on the result.

use crate::domain::foundation::{DomainError, SessionId};
use async_trait::async_trait;

/// Port for requesting a post-interview summary.
#[async_trait]
pub trait SummaryScheduler: Send + Sync {
    /// Schedule summary generation for a completed session.
    async fn schedule_summary(&self, session_id: SessionId) -> Result<(), DomainError>;
}
