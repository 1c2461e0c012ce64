//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the signed duration from another timestamp to this one.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Returns the elapsed time since `earlier`, or zero if `earlier` is later.
    pub fn saturating_elapsed_since(&self, earlier: &Timestamp) -> std::time::Duration {
        self.duration_since(earlier)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    /// Creates a new timestamp offset forward by a std duration.
    pub fn plus(&self, offset: std::time::Duration) -> Self {
        let offset = Duration::from_std(offset).unwrap_or_else(|_| Duration::weeks(52_000));
        Self(self.0.checked_add_signed(offset).unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// Creates a new timestamp offset backward by a std duration.
    pub fn minus(&self, offset: std::time::Duration) -> Self {
        let offset = Duration::from_std(offset).unwrap_or_else(|_| Duration::weeks(52_000));
        Self(self.0.checked_sub_signed(offset).unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Creates a timestamp from Unix seconds.
    pub fn from_unix_secs(secs: u64) -> Self {
        Self(
            Utc.timestamp_opt(secs as i64, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        )
    }

    /// Returns the timestamp as Unix seconds.
    pub fn as_unix_secs(&self) -> u64 {
        self.0.timestamp().max(0) as u64
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: u64) -> Self {
        self.plus(std::time::Duration::from_secs(secs))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::time::Duration as StdDuration;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_serializes_to_json() {
        let dt = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_string(&Timestamp::from_datetime(dt)).unwrap();
        assert!(json.contains("2024-01-15"));
    }

    #[test]
    fn timestamp_from_unix_secs_works() {
        let ts = Timestamp::from_unix_secs(1705276800);
        assert_eq!(ts.as_datetime().year(), 2024);
        assert_eq!(ts.as_datetime().month(), 1);
        assert_eq!(ts.as_datetime().day(), 15);
    }

    #[test]
    fn plus_and_minus_are_inverse() {
        let ts = Timestamp::from_unix_secs(10_000);
        let later = ts.plus(StdDuration::from_secs(3600));
        assert_eq!(later.as_unix_secs(), 13_600);
        assert_eq!(later.minus(StdDuration::from_secs(3600)), ts);
    }

    #[test]
    fn saturating_elapsed_since_is_zero_for_future() {
        let ts = Timestamp::from_unix_secs(1000);
        let later = ts.plus_secs(30);
        assert_eq!(later.saturating_elapsed_since(&ts), StdDuration::from_secs(30));
        assert_eq!(ts.saturating_elapsed_since(&later), StdDuration::ZERO);
    }

    #[test]
    fn ordering_follows_time() {
        let ts1 = Timestamp::from_unix_secs(1);
        let ts2 = Timestamp::from_unix_secs(2);
        assert!(ts1 < ts2);
        assert!(ts1.is_before(&ts2));
        assert!(ts2.is_after(&ts1));
    }
}
