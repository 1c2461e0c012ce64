//! RateLimiterJanitor - Background purge of idle rate-limit keys.
//!
//! Keeps the limiter's memory bounded without touching the `check` path.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 5 min | How often to purge |
//! | `horizon` | 2 × longest bucket window | Idle time after which a key is dropped |
//!
//! ## Graceful Shutdown
//!
//! The janitor listens for a shutdown signal, runs one final purge, and
//! stops.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::ports::RateLimitBucket;

use super::SlidingWindowRateLimiter;

/// Configuration for the janitor.
#[derive(Debug, Clone)]
pub struct RateLimiterJanitorConfig {
    pub interval: Duration,
    pub horizon: Duration,
}

impl Default for RateLimiterJanitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            horizon: RateLimitBucket::longest_window() * 2,
        }
    }
}

impl RateLimiterJanitorConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Periodically purges idle keys from a [`SlidingWindowRateLimiter`].
pub struct RateLimiterJanitor {
    limiter: Arc<SlidingWindowRateLimiter>,
    config: RateLimiterJanitorConfig,
}

impl RateLimiterJanitor {
    pub fn new(limiter: Arc<SlidingWindowRateLimiter>, config: RateLimiterJanitorConfig) -> Self {
        Self { limiter, config }
    }

    /// Run the purge loop until `shutdown` flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.purge_once().await;
                        tracing::info!("Rate limiter janitor stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.purge_once().await;
                }
            }
        }
    }

    /// Run exactly one purge. Returns how many keys were removed.
    pub async fn purge_once(&self) -> usize {
        let purged = self.limiter.purge_stale(self.config.horizon).await;
        if purged > 0 {
            tracing::info!(purged, "Purged idle rate limit keys");
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rate_limiter::ManualClock;
    use crate::ports::RateLimitPolicy;

    #[test]
    fn default_horizon_is_twice_longest_window() {
        let config = RateLimiterJanitorConfig::default();
        assert_eq!(config.horizon, Duration::from_secs(7200));
    }

    #[tokio::test]
    async fn purge_once_drops_keys_past_horizon() {
        let clock = Arc::new(ManualClock::default());
        let limiter = Arc::new(SlidingWindowRateLimiter::with_clock(clock.clone()));
        limiter
            .check_policy("k", RateLimitPolicy::new(5, Duration::from_secs(60)))
            .await;

        let janitor = RateLimiterJanitor::new(limiter.clone(), RateLimiterJanitorConfig::default());
        assert_eq!(janitor.purge_once().await, 0);

        clock.advance(Duration::from_secs(7201));
        assert_eq!(janitor.purge_once().await, 1);
        assert_eq!(limiter.tracked_keys().await, 0);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let limiter = Arc::new(SlidingWindowRateLimiter::new());
        let janitor = RateLimiterJanitor::new(
            limiter,
            RateLimiterJanitorConfig::default().with_interval(Duration::from_millis(10)),
        );
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { janitor.run(rx).await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("janitor should stop")
            .unwrap();
    }
}
