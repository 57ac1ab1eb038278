//! Biathlon Race Replay Engine
//!
//! A library for replaying the timing log of a biathlon race and turning it
//! into per-competitor results.
//!
//! # Architecture
//!
//! - Reads the text event log into an ordered list of typed events
//! - Folds the events, strictly in log order, into per-competitor state
//! - Aggregates the final state into ranked result rows
//!
//! The library does NOT:
//! - Read configuration files (it only validates the record)
//! - Print progress or reports
//!
//! Both are handled by the application layer (biathlon-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use biathlon_engine::{load_events, RaceConfig, RaceState, ReplayOutcome, standings};
//! use std::path::Path;
//!
//! let config = RaceConfig::new(2).with_lap_len(3651).with_penalty_len(50);
//! let events = load_events(Path::new("events.txt")).unwrap();
//!
//! match RaceState::new(config).unwrap().replay(&events) {
//!     ReplayOutcome::NothingToProcess => println!("No events to process"),
//!     ReplayOutcome::Completed(state) => {
//!         for entry in state.journal() {
//!             println!("{}", entry);
//!         }
//!         for row in standings(&state) {
//!             println!("{} {:?}", row.competitor, row.status);
//!         }
//!     }
//! }
//! ```

// Public modules
pub mod competitor;
pub mod config;
pub mod formats;
pub mod results;
pub mod state;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use competitor::{Competitor, Status};
pub use config::RaceConfig;
pub use formats::{load_events, parse_events, EventLogReader, LogFileParser};
pub use results::{standings, summary, FinishDetail, LapSplit, PenaltySplit, ResultRow, StatusLine};
pub use state::{Action, LogEntry, RaceState, ReplayOutcome, SHOTS_PER_BOUT};
pub use time::{format_duration, format_timestamp};
pub use types::{CompetitorId, Event, EventKind, RaceError, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty race has no competitors
        let state = RaceState::new(RaceConfig::new(1)).unwrap();
        assert_eq!(state.competitors().count(), 0);
        assert!(standings(&state).is_empty());
    }
}
