//! Timestamps and clock sources
//!
//! Readings carry milliseconds since the Unix epoch. The sensor store writes
//! wall-clock strings (`2024-03-01 14:05:09`) without a zone; they are read
//! and written back as naive UTC so that parsing then formatting is lossless.
//!
//! Clock sources:
//! - System clock (reports and maintenance dates)
//! - Fixed clock (tests)

use chrono::{DateTime, NaiveDateTime};

use crate::errors::{ForecastError, ForecastResult};

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Milliseconds in one hour
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Timestamp layout used by the sensor store
pub const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of "now" for reports
pub trait TimeSource {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    pub fn advance(&mut self, ms: i64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Parse a store timestamp string (`%Y-%m-%d %H:%M:%S`)
///
/// `index` identifies the record in error messages.
pub fn parse_store_timestamp(text: &str, index: usize) -> ForecastResult<Timestamp> {
    NaiveDateTime::parse_from_str(text.trim(), STORE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc().timestamp_millis())
        .map_err(|e| ForecastError::MalformedReading {
            index,
            reason: format!("unparsable timestamp '{}': {}", text, e),
        })
}

/// Render a timestamp in the store layout
///
/// Out-of-range timestamps render as their raw millisecond value.
pub fn format_store_timestamp(timestamp: Timestamp) -> String {
    let secs = timestamp.div_euclid(1000);
    let nanos = (timestamp.rem_euclid(1000) * 1_000_000) as u32;

    match DateTime::from_timestamp(secs, nanos) {
        Some(dt) => dt.format(STORE_TIMESTAMP_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

/// Hours elapsed from `earlier` to `later` (negative if reversed)
pub fn hours_between(earlier: Timestamp, later: Timestamp) -> f64 {
    (later - earlier) as f64 / MS_PER_HOUR as f64
}

/// Timestamp `hours` after `start`, rounded to the millisecond
///
/// `None` when the result is not a calendar date chrono can represent.
pub fn add_hours(start: Timestamp, hours: f64) -> Option<Timestamp> {
    let offset = (hours * MS_PER_HOUR as f64).round();
    if !offset.is_finite() || offset.abs() >= i64::MAX as f64 {
        return None;
    }
    let ts = start.checked_add(offset as Timestamp)?;
    DateTime::from_timestamp_millis(ts).map(|_| ts)
}
