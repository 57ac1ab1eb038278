//! Race configuration types
//!
//! This module defines the immutable race settings the state machine is built
//! from. Reading the settings from disk is left to the application layer; the
//! engine only deserializes and validates the record.

use crate::time::{parse_start_delta, parse_time_of_day};
use crate::types::{RaceError, Result, Timestamp};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// Configuration of a single race session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfig {
    /// Number of main laps (must be positive)
    pub laps: i64,

    /// Length of one main lap in meters
    pub lap_len: i64,

    /// Length of one penalty loop in meters
    pub penalty_len: i64,

    /// Number of firing lines on the range
    pub firing_lines: i64,

    /// Scheduled start of the race (`HH:MM:SS`)
    #[serde(with = "time_of_day")]
    pub start: Timestamp,

    /// Tolerance after the drawn start time (`HH:MM`, hours and minutes)
    #[serde(with = "start_delta")]
    pub start_delta: Duration,
}

impl RaceConfig {
    /// Create a configuration with the given lap count and zeroed settings
    pub fn new(laps: i64) -> Self {
        Self {
            laps,
            lap_len: 0,
            penalty_len: 0,
            firing_lines: 1,
            start: NaiveTime::MIN,
            start_delta: Duration::zero(),
        }
    }

    /// Builder method: set the main lap length
    pub fn with_lap_len(mut self, meters: i64) -> Self {
        self.lap_len = meters;
        self
    }

    /// Builder method: set the penalty loop length
    pub fn with_penalty_len(mut self, meters: i64) -> Self {
        self.penalty_len = meters;
        self
    }

    /// Builder method: set the number of firing lines
    pub fn with_firing_lines(mut self, lines: i64) -> Self {
        self.firing_lines = lines;
        self
    }

    /// Builder method: set the scheduled start
    pub fn with_start(mut self, start: Timestamp) -> Self {
        self.start = start;
        self
    }

    /// Builder method: set the start-window tolerance
    pub fn with_start_delta(mut self, delta: Duration) -> Self {
        self.start_delta = delta;
        self
    }

    /// Check the settings the state machine relies on
    pub fn validate(&self) -> Result<()> {
        if self.laps <= 0 {
            return Err(RaceError::InvalidLaps(self.laps));
        }
        if self.start_delta < Duration::zero() {
            return Err(RaceError::InvalidConfig(format!(
                "negative start delta: {}",
                crate::time::format_duration(self.start_delta)
            )));
        }
        Ok(())
    }

    /// Number of configured laps as a collection length
    pub fn lap_count(&self) -> usize {
        usize::try_from(self.laps).unwrap_or(0)
    }
}

mod time_of_day {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time_of_day(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid start time '{}', expected HH:MM:SS", raw)))
    }
}

mod start_delta {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let total = value.num_seconds();
        let text = if total % 60 == 0 {
            format!("{:02}:{:02}", total / 3600, (total % 3600) / 60)
        } else {
            format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_start_delta(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid start delta '{}', expected HH:MM", raw)))
    }
}
