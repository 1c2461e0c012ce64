//! Rate limiting port for protecting the turn generator and its budget.
//!
//! Limits are sliding windows over named buckets. Each bucket carries a
//! fixed `(max_requests, window)` policy; keys are namespaced by bucket so
//! the same identifier is counted independently per bucket.
//!
//! The provided adapter is process-local and in-memory. It is NOT a
//! distributed limiter: with several server processes each one enforces
//! its own windows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Port for rate limiting operations.
///
/// Implementations must be safe under concurrent callers sharing a key.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if a request is allowed, recording it if so.
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError>;

    /// Current status without recording a request.
    async fn status(&self, key: &RateLimitKey) -> Result<RateLimitStatus, RateLimitError>;

    /// Forget all recorded requests for a key (admin operation).
    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitError>;
}

/// A `(max_requests, window)` admission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Named buckets with fixed policies.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitBucket {
    /// Respondent turns and retries, keyed by session.
    ChatTurn,
    /// Session starts (each generates an opening turn), keyed by session.
    SessionStart,
    /// Post-interview summaries.
    Summarization,
    /// Cross-session analysis jobs.
    BulkAnalysis,
}

impl RateLimitBucket {
    pub const ALL: [RateLimitBucket; 4] = [
        RateLimitBucket::ChatTurn,
        RateLimitBucket::SessionStart,
        RateLimitBucket::Summarization,
        RateLimitBucket::BulkAnalysis,
    ];

    /// The bucket's fixed policy.
    pub const fn policy(&self) -> RateLimitPolicy {
        match self {
            RateLimitBucket::ChatTurn => RateLimitPolicy::new(20, Duration::from_secs(60)),
            RateLimitBucket::SessionStart => RateLimitPolicy::new(10, Duration::from_secs(3600)),
            RateLimitBucket::Summarization => RateLimitPolicy::new(5, Duration::from_secs(3600)),
            RateLimitBucket::BulkAnalysis => RateLimitPolicy::new(3, Duration::from_secs(3600)),
        }
    }

    /// Longest window across all buckets.
    pub fn longest_window() -> Duration {
        Self::ALL
            .iter()
            .map(|b| b.policy().window)
            .max()
            .unwrap_or(Duration::from_secs(3600))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitBucket::ChatTurn => "chat_turn",
            RateLimitBucket::SessionStart => "session_start",
            RateLimitBucket::Summarization => "summarization",
            RateLimitBucket::BulkAnalysis => "bulk_analysis",
        }
    }
}

impl fmt::Display for RateLimitBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key identifying what to rate limit.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub bucket: RateLimitBucket,
    /// Identifier within the bucket (session id, caller IP, ...).
    pub identifier: String,
}

impl RateLimitKey {
    pub fn new(bucket: RateLimitBucket, identifier: impl Into<String>) -> Self {
        Self {
            bucket,
            identifier: identifier.into(),
        }
    }

    /// Returns the namespaced storage key.
    pub fn storage_key(&self) -> String {
        format!("ratelimit:{}:{}", self.bucket.as_str(), self.identifier)
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.bucket.policy()
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed; includes current status.
    Allowed(RateLimitStatus),
    /// Request is denied; includes denial details.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitResult::Denied(_))
    }

    /// Remaining requests after this check (zero when denied).
    pub fn remaining(&self) -> u32 {
        match self {
            RateLimitResult::Allowed(status) => status.remaining,
            RateLimitResult::Denied(_) => 0,
        }
    }

    /// Time until capacity frees up again.
    pub fn reset_in(&self) -> Duration {
        match self {
            RateLimitResult::Allowed(status) => status.reset_in,
            RateLimitResult::Denied(denied) => denied.reset_in,
        }
    }
}

/// Current rate limit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Time until the oldest recorded request leaves the window.
    pub reset_in: Duration,
    pub window: Duration,
}

/// Details of a rate limit denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDenied {
    pub limit: u32,
    /// Oldest surviving request time plus the window, minus now.
    pub reset_in: Duration,
    pub bucket: RateLimitBucket,
    pub message: String,
}

impl RateLimitDenied {
    /// Whole seconds a client should wait, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        retry_after_secs(self.reset_in)
    }
}

/// Rounds a wait up to whole seconds, at least one.
pub fn retry_after_secs(reset_in: Duration) -> u64 {
    let secs = reset_in.as_secs() + u64::from(reset_in.subsec_nanos() > 0);
    secs.max(1)
}

/// Errors that can occur during rate limiting operations.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Rate limiter backend is unavailable.
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),

    /// Invalid rate limit key provided.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
