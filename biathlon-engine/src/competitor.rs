//! Per-competitor race state

use crate::types::{CompetitorId, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Race status of a competitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Registered,
    Running,
    Finished,
    NotStarted,
    NotFinished,
}

impl Status {
    /// Whether no further race progress is expected for this status
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Finished | Status::NotStarted | Status::NotFinished)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Registered => write!(f, "Registered"),
            Status::Running => write!(f, "Running"),
            Status::Finished => write!(f, "Finished"),
            Status::NotStarted => write!(f, "NotStarted"),
            Status::NotFinished => write!(f, "NotFinished"),
        }
    }
}

/// Mutable state of one athlete, owned by the race state
#[derive(Debug, Clone, PartialEq)]
pub struct Competitor {
    pub id: CompetitorId,
    pub status: Status,
    /// Start time assigned by the draw
    pub start_time_draw: Option<Timestamp>,
    /// Time the competitor actually crossed the start
    pub actual_start: Option<Timestamp>,
    /// 1-based lap counter
    pub current_lap: i64,
    /// Completed lap durations, in lap order
    pub lap_times: Vec<Duration>,
    pub penalty_entered_at: Option<Timestamp>,
    pub penalty_time: Duration,
    pub on_penalty_loop: bool,
    pub on_firing_range: bool,
    /// Range named by the last firing-range entry
    pub firing_line: Option<String>,
    pub hits: u32,
    pub shots: u32,
    /// Reason given for not finishing
    pub comment: Option<String>,
}

impl Competitor {
    /// Create a freshly registered competitor
    pub fn new(id: CompetitorId) -> Self {
        Self {
            id,
            status: Status::Registered,
            start_time_draw: None,
            actual_start: None,
            current_lap: 0,
            lap_times: Vec::new(),
            penalty_entered_at: None,
            penalty_time: Duration::zero(),
            on_penalty_loop: false,
            on_firing_range: false,
            firing_line: None,
            hits: 0,
            shots: 0,
            comment: None,
        }
    }

    /// Sum of lap times plus penalty time; zero unless the competitor finished
    pub fn total_time(&self) -> Duration {
        if self.status != Status::Finished {
            return Duration::zero();
        }
        self.lap_times
            .iter()
            .fold(self.penalty_time, |total, lap| total + *lap)
    }

    /// Gap between the drawn start time and the actual start
    ///
    /// Zero when either time is unknown.
    pub fn start_gap(&self) -> Duration {
        match (self.start_time_draw, self.actual_start) {
            (Some(drawn), Some(actual)) => crate::time::elapsed(drawn, actual),
            _ => Duration::zero(),
        }
    }
}
