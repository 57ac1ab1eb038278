//! Text event log reader
//!
//! Parses logs with one event per line:
//!
//! ```text
//! [09:05:59.867] 1 1
//! [09:15:00.841] 2 1 09:30:00.000
//! [09:59:03.872] 11 1 Lost in the forest
//! ```
//!
//! Blank lines are skipped. Everything after the competitor id is rejoined
//! with single spaces into the event parameter.

use super::LogFileParser;
use crate::time::parse_timestamp;
use crate::types::{CompetitorId, Event, EventKind, RaceError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Streaming reader over a text event log
pub struct EventLogReader<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: BufRead> EventLogReader<R> {
    /// Read events from any buffered source
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl LogFileParser for EventLogReader<BufReader<File>> {
    fn parse(path: &Path) -> Result<Self> {
        log::info!("Opening event log: {:?}", path);
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for EventLogReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            match parse_line(self.line_number, &line) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Parse one log line
///
/// Returns `Ok(None)` for blank lines and for event kinds outside the fixed
/// vocabulary.
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<Event>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let fail = |reason: String| RaceError::EventParse {
        line: line_number,
        content: line.to_string(),
        reason,
    };

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(fail(format!(
            "expected '[HH:MM:SS.mmm] <kind> <competitor>', found {} field(s)",
            parts.len()
        )));
    }

    let raw_time = parts[0].trim_matches(|c: char| c == '[' || c == ']');
    let time = parse_timestamp(raw_time)
        .ok_or_else(|| fail(format!("invalid time '{}'", parts[0])))?;

    let code: i64 = parts[1]
        .parse()
        .map_err(|e| fail(format!("invalid event kind '{}': {}", parts[1], e)))?;

    let competitor: CompetitorId = parts[2]
        .parse()
        .map_err(|e| fail(format!("invalid competitor id '{}': {}", parts[2], e)))?;

    let params = parts[3..].join(" ");

    match EventKind::from_code(code, params) {
        Some(kind) => Ok(Some(Event::new(time, competitor, kind))),
        None => {
            log::warn!(
                "Line {}: unknown event kind {} for competitor {}, skipping",
                line_number,
                code,
                competitor
            );
            Ok(None)
        }
    }
}

/// Load a whole event log, failing on the first malformed line
pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    let events = EventLogReader::<BufReader<File>>::parse(path)?.collect::<Result<Vec<_>>>()?;
    log::info!("Loaded {} events from {:?}", events.len(), path);
    Ok(events)
}

/// Parse an in-memory event log, failing on the first malformed line
pub fn parse_events(text: &str) -> Result<Vec<Event>> {
    EventLogReader::from_reader(text.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const SAMPLE: &str = "[09:05:59.867] 1 1
[09:15:00.841] 2 1 09:30:00.000
[09:29:45.734] 3 1
[09:30:01.005] 4 1
[09:49:31.659] 5 1 1
[09:49:33.123] 6 1 1
[09:49:34.650] 6 1 2
[09:49:35.937] 6 1 4
[09:49:37.364] 6 1 5
[09:49:38.339] 7 1
[09:49:55.915] 8 1
[09:51:48.391] 9 1
[09:59:03.872] 10 1
[09:59:03.872] 11 1 Lost in the forest";

    #[test]
    fn test_parse_sample_log() {
        let events = parse_events(SAMPLE).unwrap();
        assert_eq!(events.len(), 14);

        let first = &events[0];
        assert_eq!(first.time, NaiveTime::from_hms_milli_opt(9, 5, 59, 867).unwrap());
        assert_eq!(first.kind, EventKind::Registered);
        assert_eq!(first.competitor, 1);

        assert_eq!(events[1].kind, EventKind::StartTimeDrawn("09:30:00.000".to_string()));
        assert_eq!(
            events[13].kind,
            EventKind::CannotContinue("Lost in the forest".to_string())
        );
    }

    #[test]
    fn test_params_rejoined_with_single_spaces() {
        let events = parse_events("[10:00:00.000] 11 3 Lost   in\tthe forest").unwrap();
        assert_eq!(
            events[0].kind,
            EventKind::CannotContinue("Lost in the forest".to_string())
        );
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let events = parse_events("\r\n[09:00:00.000] 1 1\r\n\r\n   \n[09:00:01.000] 1 2\r\n").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].competitor, 2);
    }

    #[test]
    fn test_invalid_time_is_fatal() {
        let err = parse_events("[invalid time] 1 1").unwrap_err();
        assert!(matches!(err, RaceError::EventParse { line: 1, .. }));
    }

    #[test]
    fn test_short_line_is_fatal() {
        let err = parse_events("[09:00:00.000] 1 1\n[09:00:01.000] 1").unwrap_err();
        assert!(matches!(err, RaceError::EventParse { line: 2, .. }));
    }

    #[test]
    fn test_non_integer_fields_are_fatal() {
        assert!(parse_events("[09:00:00.000] one 1").is_err());
        assert!(parse_events("[09:00:00.000] 1 first").is_err());
        assert!(parse_events("[09:00:00.000] 1 4.5").is_err());
    }

    #[test]
    fn test_any_integer_competitor_id() {
        let events = parse_events("[09:00:00.000] 1 -4\n[09:00:01.000] 1 5000000000").unwrap();
        assert_eq!(events[0].competitor, -4);
        assert_eq!(events[1].competitor, 5_000_000_000);
    }

    #[test]
    fn test_second_sixty_is_fatal() {
        let err = parse_events("[09:05:60.000] 1 1").unwrap_err();
        assert!(matches!(err, RaceError::EventParse { line: 1, .. }));
    }

    #[test]
    fn test_unknown_kind_skipped() {
        let events = parse_events("[09:00:00.000] 1 1\n[09:00:01.000] 12 1\n[09:00:02.000] 4 1").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, EventKind::Started);
    }

    #[test]
    fn test_order_preserved() {
        let events = parse_events("[10:00:00.000] 1 2\n[09:00:00.000] 1 1").unwrap();
        assert_eq!(events[0].competitor, 2);
        assert_eq!(events[1].competitor, 1);
    }
}
