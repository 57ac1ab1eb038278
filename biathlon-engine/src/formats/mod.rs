//! Event log readers
//!
//! Each reader is an iterator over parsed events so callers can stream a log,
//! or collect it when a single bad line must reject the whole load.

use crate::types::{Event, Result};
use std::path::Path;

pub mod event_log;

pub use event_log::{load_events, parse_events, EventLogReader};

/// Common trait for event log readers
pub trait LogFileParser: Iterator<Item = Result<Event>> + Sized {
    /// Open a log file and return an iterator over its events
    fn parse(path: &Path) -> Result<Self>;
}
