//! Time parsing and formatting helpers
//!
//! Event timestamps are times of day with millisecond precision
//! (`HH:MM:SS.mmm`). Durations are rendered in the same shape, with hours
//! allowed to exceed 24.

use crate::types::Timestamp;
use chrono::{Duration, NaiveTime, Timelike};

/// Format string for event timestamps and drawn start times
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Parse an `HH:MM:SS.mmm` time of day
///
/// Second 60 is rejected: chrono would otherwise read it as a leap second.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    NaiveTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .ok()
        .filter(|t| !is_leap_second(t))
}

/// Parse a scheduled start time: `HH:MM:SS`, optionally with a fraction
pub fn parse_time_of_day(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S%.f"))
        .ok()
        .filter(|t| !is_leap_second(t))
}

fn is_leap_second(t: &NaiveTime) -> bool {
    t.nanosecond() >= 1_000_000_000
}

/// Parse a start-window tolerance
///
/// `HH:MM` is hours and minutes. A third field is read as seconds.
pub fn parse_start_delta(s: &str) -> Option<Duration> {
    let fields: Vec<&str> = s.trim().split(':').collect();
    if !(2..=3).contains(&fields.len()) {
        return None;
    }

    let mut values = Vec::with_capacity(fields.len());
    for field in &fields {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        values.push(field.parse::<i64>().ok()?);
    }

    let mut delta = Duration::try_hours(values[0])?.checked_add(&Duration::try_minutes(values[1])?)?;
    if let Some(seconds) = values.get(2) {
        delta = delta.checked_add(&Duration::try_seconds(*seconds)?)?;
    }
    Some(delta)
}

/// Signed time elapsed from `earlier` to `later`
pub fn elapsed(earlier: Timestamp, later: Timestamp) -> Duration {
    later.signed_duration_since(earlier)
}

/// Format a duration as `HH:MM:SS.mmm`
pub fn format_duration(d: Duration) -> String {
    let total_ms = d.num_milliseconds();
    let sign = if total_ms < 0 { "-" } else { "" };
    let ms = total_ms.unsigned_abs();

    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;

    format!("{}{:02}:{:02}:{:02}.{:03}", sign, hours, minutes, seconds, millis)
}

/// Format a time of day as `HH:MM:SS.mmm`
pub fn format_timestamp(t: Timestamp) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}
