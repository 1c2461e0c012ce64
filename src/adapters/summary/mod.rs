//! Summary scheduling adapters.
//!
//! Report generation lives outside this service. `LoggingSummaryScheduler`
//! records each hand-off so operators (and tests) can see which completed
//! sessions are waiting for a summary.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use crate::ports::SummaryScheduler;

/// Records summary requests and logs them.
#[derive(Debug, Clone, Default)]
pub struct LoggingSummaryScheduler {
    scheduled: Arc<RwLock<Vec<SessionId>>>,
    fail: bool,
}

impl LoggingSummaryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scheduler whose every hand-off fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Sessions handed off so far, in order.
    pub async fn scheduled(&self) -> Vec<SessionId> {
        self.scheduled.read().await.clone()
    }
}

#[async_trait]
impl SummaryScheduler for LoggingSummaryScheduler {
    async fn schedule_summary(&self, session_id: SessionId) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "Summary queue unavailable",
            ));
        }
        self.scheduled.write().await.push(session_id);
        tracing::info!(session_id = %session_id, "Summary requested");
        Ok(())
    }
}
