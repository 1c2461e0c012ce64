//! Sliding-window rate limiter.
//!
//! Each key keeps the timestamps of its admitted requests inside the
//! window. A check first drops timestamps at or before `now - window`, then
//! compares the surviving count with the policy before recording the new
//! request. Denials report when the oldest surviving request leaves the
//! window.
//!
//! All state lives behind one async mutex and is local to this process.
//! Idle keys are purged by [`RateLimiterJanitor`](super::RateLimiterJanitor),
//! never on the `check` path.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitPolicy, RateLimitResult,
    RateLimitStatus, RateLimiter,
};

use super::clock::{Clock, SystemClock};

/// Outcome of a raw window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_in: Duration,
}

/// Requests recorded for one key.
#[derive(Debug, Clone)]
struct WindowRecord {
    timestamps: VecDeque<Timestamp>,
    last_updated: Timestamp,
}

impl WindowRecord {
    fn new(now: Timestamp) -> Self {
        Self {
            timestamps: VecDeque::new(),
            last_updated: now,
        }
    }

    fn evict_expired(&mut self, now: Timestamp, window: Duration) {
        let cutoff = now.minus(window);
        while self
            .timestamps
            .front()
            .is_some_and(|oldest| !oldest.is_after(&cutoff))
        {
            self.timestamps.pop_front();
        }
    }

    fn count(&self) -> u32 {
        u32::try_from(self.timestamps.len()).unwrap_or(u32::MAX)
    }

    fn reset_in(&self, now: Timestamp, window: Duration) -> Duration {
        match self.timestamps.front() {
            Some(oldest) => oldest.plus(window).saturating_elapsed_since(&now),
            None => window,
        }
    }
}

/// In-process sliding-window limiter.
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
    records: Mutex<HashMap<String, WindowRecord>>,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowRateLimiter {
    /// Creates a limiter driven by wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a limiter driven by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Checks and records a request for a raw identifier.
    pub async fn check_policy(&self, identifier: &str, policy: RateLimitPolicy) -> WindowDecision {
        let now = self.clock.now();
        let mut records = self.records.lock().await;
        let record = records
            .entry(identifier.to_string())
            .or_insert_with(|| WindowRecord::new(now));

        record.evict_expired(now, policy.window);
        record.last_updated = now;

        if record.count() >= policy.max_requests {
            return WindowDecision {
                allowed: false,
                remaining: 0,
                reset_in: record.reset_in(now, policy.window),
            };
        }

        record.timestamps.push_back(now);
        WindowDecision {
            allowed: true,
            remaining: policy.max_requests - record.count(),
            reset_in: record.reset_in(now, policy.window),
        }
    }

    /// Reports the current window for a raw identifier without recording.
    pub async fn peek_policy(&self, identifier: &str, policy: RateLimitPolicy) -> WindowDecision {
        let now = self.clock.now();
        let records = self.records.lock().await;
        let mut view = records
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| WindowRecord::new(now));
        view.evict_expired(now, policy.window);

        WindowDecision {
            allowed: view.count() < policy.max_requests,
            remaining: policy.max_requests.saturating_sub(view.count()),
            reset_in: view.reset_in(now, policy.window),
        }
    }

    /// Forgets a raw identifier.
    pub async fn forget(&self, identifier: &str) -> bool {
        self.records.lock().await.remove(identifier).is_some()
    }

    /// Removes keys with no activity within `horizon`. Returns how many.
    pub async fn purge_stale(&self, horizon: Duration) -> usize {
        let now = self.clock.now();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| now.saturating_elapsed_since(&record.last_updated) <= horizon);
        before - records.len()
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.records.lock().await.len()
    }
}

impl Default for SlidingWindowRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowRateLimiter {
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let policy = key.policy();
        let decision = self.check_policy(&key.storage_key(), policy).await;

        if decision.allowed {
            return Ok(RateLimitResult::Allowed(RateLimitStatus {
                limit: policy.max_requests,
                remaining: decision.remaining,
                reset_in: decision.reset_in,
                window: policy.window,
            }));
        }

        tracing::warn!(
            bucket = %key.bucket,
            identifier = %key.identifier,
            reset_in_ms = u64::try_from(decision.reset_in.as_millis()).unwrap_or(u64::MAX),
            "Rate limit exceeded"
        );
        Ok(RateLimitResult::Denied(RateLimitDenied {
            limit: policy.max_requests,
            reset_in: decision.reset_in,
            bucket: key.bucket,
            message: format!(
                "Rate limit exceeded for {}. Retry in {} seconds.",
                key.bucket,
                crate::ports::retry_after_secs(decision.reset_in)
            ),
        }))
    }

    async fn status(&self, key: &RateLimitKey) -> Result<RateLimitStatus, RateLimitError> {
        let policy = key.policy();
        let decision = self.peek_policy(&key.storage_key(), policy).await;
        Ok(RateLimitStatus {
            limit: policy.max_requests,
            remaining: decision.remaining,
            reset_in: decision.reset_in,
            window: policy.window,
        })
    }

    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitError> {
        self.forget(&key.storage_key()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rate_limiter::ManualClock;
    use crate::ports::RateLimitBucket;

    const HOUR: Duration = Duration::from_secs(3600);

    fn limiter() -> (Arc<ManualClock>, SlidingWindowRateLimiter) {
        let clock = Arc::new(ManualClock::default());
        let limiter = SlidingWindowRateLimiter::with_clock(clock.clone());
        (clock, limiter)
    }

    // ─── Window Semantics ───────────────────────────────────────────

    #[tokio::test]
    async fn five_per_hour_denies_sixth_call() {
        let (_clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(5, HOUR);

        for i in 0..5 {
            let decision = limiter.check_policy("survey-1", policy).await;
            assert!(decision.allowed, "call {} should be allowed", i + 1);
            assert_eq!(decision.remaining, 4 - i);
        }

        let denied = limiter.check_policy("survey-1", policy).await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.reset_in <= HOUR);
    }

    #[tokio::test]
    async fn reset_in_is_measured_from_oldest_request() {
        let (clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(2, HOUR);

        limiter.check_policy("k", policy).await;
        clock.advance(Duration::from_secs(600));
        limiter.check_policy("k", policy).await;
        clock.advance(Duration::from_secs(600));

        let denied = limiter.check_policy("k", policy).await;
        assert!(!denied.allowed);
        // Oldest at t=0, now t=1200 -> 2400s left.
        assert_eq!(denied.reset_in, Duration::from_secs(2400));
    }

    #[tokio::test]
    async fn capacity_returns_after_oldest_leaves_window() {
        let (clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(5, HOUR);

        for _ in 0..5 {
            limiter.check_policy("k", policy).await;
        }
        let denied = limiter.check_policy("k", policy).await;
        assert!(!denied.allowed);

        clock.advance(denied.reset_in);
        let decision = limiter.check_policy("k", policy).await;
        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn denied_calls_are_not_recorded() {
        let (clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(1, Duration::from_secs(60));

        assert!(limiter.check_policy("k", policy).await.allowed);
        clock.advance(Duration::from_secs(30));
        assert!(!limiter.check_policy("k", policy).await.allowed);
        clock.advance(Duration::from_secs(30));
        assert!(limiter.check_policy("k", policy).await.allowed);
    }

    #[tokio::test]
    async fn zero_capacity_policy_always_denies() {
        let (_clock, limiter) = limiter();
        let decision = limiter
            .check_policy("k", RateLimitPolicy::new(0, Duration::from_secs(60)))
            .await;
        assert!(!decision.allowed);
        assert_eq!(decision.reset_in, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn identifiers_are_independent() {
        let (_clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(1, HOUR);
        assert!(limiter.check_policy("a", policy).await.allowed);
        assert!(!limiter.check_policy("a", policy).await.allowed);
        assert!(limiter.check_policy("b", policy).await.allowed);
    }

    // ─── Port Behaviour ─────────────────────────────────────────────

    #[tokio::test]
    async fn bucket_keys_use_bucket_policy() {
        let (_clock, limiter) = limiter();
        let key = RateLimitKey::new(RateLimitBucket::Summarization, "survey-9");

        for _ in 0..5 {
            assert!(limiter.check(&key).await.unwrap().is_allowed());
        }
        match limiter.check(&key).await.unwrap() {
            RateLimitResult::Denied(denied) => {
                assert_eq!(denied.limit, 5);
                assert_eq!(denied.bucket, RateLimitBucket::Summarization);
                assert!(denied.reset_in <= HOUR);
            }
            other => panic!("Expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn same_identifier_in_different_buckets_is_independent() {
        let (_clock, limiter) = limiter();
        let bulk = RateLimitKey::new(RateLimitBucket::BulkAnalysis, "x");
        let summary = RateLimitKey::new(RateLimitBucket::Summarization, "x");

        for _ in 0..3 {
            limiter.check(&bulk).await.unwrap();
        }
        assert!(limiter.check(&bulk).await.unwrap().is_denied());
        assert!(limiter.check(&summary).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn status_does_not_consume() {
        let (_clock, limiter) = limiter();
        let key = RateLimitKey::new(RateLimitBucket::BulkAnalysis, "x");

        assert_eq!(limiter.status(&key).await.unwrap().remaining, 3);
        limiter.check(&key).await.unwrap();
        assert_eq!(limiter.status(&key).await.unwrap().remaining, 2);
        assert_eq!(limiter.status(&key).await.unwrap().remaining, 2);
    }

    #[tokio::test]
    async fn reset_restores_full_quota() {
        let (_clock, limiter) = limiter();
        let key = RateLimitKey::new(RateLimitBucket::BulkAnalysis, "x");
        for _ in 0..3 {
            limiter.check(&key).await.unwrap();
        }
        assert!(limiter.check(&key).await.unwrap().is_denied());

        limiter.reset(&key).await.unwrap();
        assert!(limiter.check(&key).await.unwrap().is_allowed());
    }

    // ─── Garbage Collection ─────────────────────────────────────────

    #[tokio::test]
    async fn purge_removes_only_idle_keys() {
        let (clock, limiter) = limiter();
        let policy = RateLimitPolicy::new(10, Duration::from_secs(60));

        limiter.check_policy("idle", policy).await;
        clock.advance(Duration::from_secs(7000));
        limiter.check_policy("active", policy).await;

        let purged = limiter.purge_stale(Duration::from_secs(7200)).await;
        assert_eq!(purged, 0);

        clock.advance(Duration::from_secs(300));
        let purged = limiter.purge_stale(Duration::from_secs(7200)).await;
        assert_eq!(purged, 1);
        assert_eq!(limiter.tracked_keys().await, 1);
    }

    // ─── Concurrency ────────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checks_never_exceed_limit() {
        let limiter = Arc::new(SlidingWindowRateLimiter::new());
        let policy = RateLimitPolicy::new(20, HOUR);

        let mut handles = Vec::new();
        for _ in 0..100 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.check_policy("shared", policy).await.allowed
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 20);
    }
}
