//! Rate limiter configuration
//!
//! Bucket policies are fixed in code; only housekeeping is configurable.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Rate limiter housekeeping configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimiterConfig {
    /// Seconds between purges of idle keys
    #[serde(default = "default_gc_interval")]
    pub gc_interval_secs: u64,
}

impl RateLimiterConfig {
    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.gc_interval_secs == 0 {
            return Err(ValidationError::InvalidGcInterval);
        }
        Ok(())
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            gc_interval_secs: default_gc_interval(),
        }
    }
}

fn default_gc_interval() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_five_minutes() {
        assert_eq!(RateLimiterConfig::default().gc_interval(), Duration::from_secs(300));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = RateLimiterConfig { gc_interval_secs: 0 };
        assert!(config.validate().is_err());
    }
}
