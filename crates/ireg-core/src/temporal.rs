//! # Temporal Types: UTC Timestamps and Clocks
//!
//! Defines [`Timestamp`], a UTC-only timestamp truncated to seconds
//! precision, and the [`Clock`] abstraction every registry operation reads
//! its commit time from.
//!
//! ## Invariant
//!
//! Registration and verification times are rendered as
//! `YYYY-MM-DDTHH:MM:SSZ`. Non-UTC inputs are rejected at parse time; there
//! is no silent offset conversion.
//!
//! Production code injects [`SystemClock`]. Tests inject [`FixedClock`] so
//! recorded times are deterministic.

use chrono::{DateTime, Timelike, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string with a `Z` suffix.
    ///
    /// Offsets such as `+00:00` are rejected even when they denote UTC.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp {
                value: s.to_string(),
                reason: "must use Z suffix (UTC only)".to_string(),
            });
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| ValidationError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ValidationError> {
        let dt = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            ValidationError::InvalidTimestamp {
                value: secs.to_string(),
                reason: "out of range".to_string(),
            }
        })?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// Clock abstraction
// ---------------------------------------------------------------------------

/// Source of commit timestamps.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time, truncated to seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A settable clock for deterministic tests and replay.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<Timestamp>,
}

impl FixedClock {
    /// Create a clock pinned at `at`.
    pub fn new(at: Timestamp) -> Self {
        Self {
            current: Mutex::new(at),
        }
    }

    /// Move the clock to `at`.
    pub fn set(&self, at: Timestamp) {
        *self.current.lock() = at;
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        let mut guard = self.current.lock();
        *guard = Timestamp(guard.0 + chrono::Duration::seconds(secs));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.current.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc
            .with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let ts = Timestamp::from_utc(dt);
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn parse_accepts_z_suffix() {
        let ts = Timestamp::parse("2026-03-01T08:30:00Z").unwrap();
        assert_eq!(ts.to_string(), "2026-03-01T08:30:00Z");
    }

    #[test]
    fn parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-03-01T08:30:00+00:00").is_err());
        assert!(Timestamp::parse("2026-03-01T08:30:00+05:30").is_err());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Timestamp::parse("yesterday Z").is_err());
    }

    #[test]
    fn epoch_roundtrip() {
        let ts = Timestamp::from_epoch_secs(1_767_225_600).unwrap();
        assert_eq!(ts.epoch_secs(), 1_767_225_600);
    }

    #[test]
    fn fixed_clock_is_stable_until_moved() {
        let start = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        clock.advance(90);
        assert_eq!(clock.now().to_string(), "2026-01-01T00:01:30Z");

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn serde_roundtrip_preserves_instant() {
        let ts = Timestamp::parse("2026-06-30T23:59:59Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
