//! Core types for the biathlon replay engine
//!
//! This module defines the event records the engine consumes and the error type
//! shared by the loaders. Events are plain data: all interpretation happens in
//! the race state machine.

use chrono::NaiveTime;
use std::fmt;

/// Time of day used for every event timestamp (millisecond precision)
pub type Timestamp = NaiveTime;

/// Competitor identifier as it appears in the event log
pub type CompetitorId = i64;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, RaceError>;

/// Errors that can occur while loading a race
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid laps count: {0}")]
    InvalidLaps(i64),

    #[error("Invalid event on line {line} ('{content}'): {reason}")]
    EventParse {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One record of the event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Time of day at which the event happened
    pub time: Timestamp,
    /// Competitor the event refers to
    pub competitor: CompetitorId,
    /// What happened, with the kind-specific parameter where there is one
    pub kind: EventKind,
}

impl Event {
    pub fn new(time: Timestamp, competitor: CompetitorId, kind: EventKind) -> Self {
        Self {
            time,
            competitor,
            kind,
        }
    }
}

/// The fixed event vocabulary of a race log
///
/// Variants carrying a `String` keep the free-form parameter text of the log
/// line. Parameters given to the other kinds are dropped by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// 1: the competitor registered
    Registered,
    /// 2: start time set by a draw (parameter: `HH:MM:SS.mmm`)
    StartTimeDrawn(String),
    /// 3: the competitor is on the start line
    OnStartLine,
    /// 4: the competitor has started
    Started,
    /// 5: the competitor is on a firing range (parameter: range number)
    OnFiringRange(String),
    /// 6: a target has been hit (parameter: target number)
    TargetHit(String),
    /// 7: the competitor left the firing range
    LeftFiringRange,
    /// 8: the competitor entered the penalty loop
    EnteredPenaltyLoop,
    /// 9: the competitor left the penalty loop
    LeftPenaltyLoop,
    /// 10: the competitor ended a main lap
    LapCompleted,
    /// 11: the competitor can't continue (parameter: comment)
    CannotContinue(String),
    /// 32: the competitor is disqualified
    Disqualified,
    /// 33: the competitor has finished
    Finished,
}

impl EventKind {
    /// Build an event kind from its numeric log code
    ///
    /// Returns `None` for codes outside the vocabulary.
    pub fn from_code(code: i64, params: String) -> Option<Self> {
        let kind = match code {
            1 => EventKind::Registered,
            2 => EventKind::StartTimeDrawn(params),
            3 => EventKind::OnStartLine,
            4 => EventKind::Started,
            5 => EventKind::OnFiringRange(params),
            6 => EventKind::TargetHit(params),
            7 => EventKind::LeftFiringRange,
            8 => EventKind::EnteredPenaltyLoop,
            9 => EventKind::LeftPenaltyLoop,
            10 => EventKind::LapCompleted,
            11 => EventKind::CannotContinue(params),
            32 => EventKind::Disqualified,
            33 => EventKind::Finished,
            _ => return None,
        };
        Some(kind)
    }

    /// Numeric code of this kind in the event log
    pub fn code(&self) -> u32 {
        match self {
            EventKind::Registered => 1,
            EventKind::StartTimeDrawn(_) => 2,
            EventKind::OnStartLine => 3,
            EventKind::Started => 4,
            EventKind::OnFiringRange(_) => 5,
            EventKind::TargetHit(_) => 6,
            EventKind::LeftFiringRange => 7,
            EventKind::EnteredPenaltyLoop => 8,
            EventKind::LeftPenaltyLoop => 9,
            EventKind::LapCompleted => 10,
            EventKind::CannotContinue(_) => 11,
            EventKind::Disqualified => 32,
            EventKind::Finished => 33,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::StartTimeDrawn(p)
            | EventKind::OnFiringRange(p)
            | EventKind::TargetHit(p)
            | EventKind::CannotContinue(p)
                if !p.is_empty() =>
            {
                write!(f, "{} {}", self.code(), p)
            }
            _ => write!(f, "{}", self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        for code in [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 32, 33] {
            let kind = EventKind::from_code(code, String::new()).unwrap();
            assert_eq!(kind.code() as i64, code);
        }
    }

    #[test]
    fn test_unknown_codes() {
        assert!(EventKind::from_code(0, String::new()).is_none());
        assert!(EventKind::from_code(12, String::new()).is_none());
        assert!(EventKind::from_code(-1, String::new()).is_none());
    }

    #[test]
    fn test_params_kept_only_where_used() {
        let kind = EventKind::from_code(11, "Lost in the forest".to_string()).unwrap();
        assert_eq!(kind, EventKind::CannotContinue("Lost in the forest".to_string()));

        let kind = EventKind::from_code(7, "ignored".to_string()).unwrap();
        assert_eq!(kind, EventKind::LeftFiringRange);
        assert_eq!(kind.to_string(), "7");
    }
}
