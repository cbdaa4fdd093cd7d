//! Calendar dates and timestamps.
//!
//! Practice records carry ISO calendar dates (`date_solved`) and ISO
//! timestamps (`next_review`, review events). Both are parsed here, once, at
//! the serde boundary: everything past deserialization works with
//! `NaiveDate` and `DateTime<Utc>`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Days from 0001-01-01 (CE) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    #[error("empty date value")]
    Empty,
    #[error("invalid calendar date: {0}")]
    InvalidDate(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Parse an ISO calendar date (`YYYY-MM-DD`).
/// A full timestamp is accepted too and truncated to its date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TemporalError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TemporalError::Empty);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_timestamp(raw)
        .map(|ts| ts.date_naive())
        .map_err(|_| TemporalError::InvalidDate(raw.to_string()))
}

/// Parse an ISO timestamp. Offsets are honoured; naive timestamps and bare
/// dates are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TemporalError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TemporalError::Empty);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    Err(TemporalError::InvalidTimestamp(raw.to_string()))
}

/// Whole days elapsed since 1970-01-01.
pub fn day_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

/// Signed number of days from `earlier` to `later`.
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

pub fn add_days(ts: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    ts + Duration::days(days)
}

/// Source of "now". Core functions never read the wall clock; they receive
/// `today` from whoever holds a `Clock`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Noon UTC on the given date.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or_else(Utc::now);
        FixedClock(noon)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Serde helpers that turn malformed or missing values into `None` instead of
/// failing the whole record.
pub mod lenient {
    use super::*;
    use serde_json::Value;

    pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Value> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => match parse_date(&s) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::debug!(value = %s, error = %e, "Ignoring unparseable date");
                    None
                }
            },
            Some(Value::Null) | None => None,
            Some(other) => {
                tracing::debug!(value = %other, "Ignoring non-string date");
                None
            }
        })
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Value> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => match parse_timestamp(&s) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    tracing::debug!(value = %s, error = %e, "Ignoring unparseable timestamp");
                    None
                }
            },
            _ => None,
        })
    }
}
