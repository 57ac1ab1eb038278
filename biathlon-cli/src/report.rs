//! Report generation
//!
//! Renders the replay journal, the status summary and the final standings as
//! plain text or JSON.

use biathlon_engine::{
    format_duration, standings, summary, CompetitorId, FinishDetail, RaceState, ResultRow, Status,
};
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Txt,
    Json,
}

/// Write the full report for a replayed race
pub fn write_report<W: Write>(state: &RaceState, format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    match format {
        OutputFormat::Txt => write_text(state, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &JsonReport::from_state(state))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_text<W: Write>(state: &RaceState, out: &mut W) -> io::Result<()> {
    for entry in state.journal() {
        writeln!(out, "{}", entry)?;
    }

    writeln!(out, "\n FINAL REPORT")?;
    writeln!(out, "Participants and their statuses:")?;
    for line in summary(state) {
        writeln!(
            out,
            "Participant {}: status={}, laps={}/{}",
            line.competitor, line.status, line.current_lap, line.laps
        )?;
    }

    for row in standings(state) {
        writeln!(out, "{}", text_row(&row))?;
    }
    Ok(())
}

/// One standings line, e.g. `1 00:30:56.348 [{00:29:02.867, 2.095} {,}] {00:01:52.476, 0.445} 2/5`
fn text_row(row: &ResultRow) -> String {
    match (&row.status, &row.finish) {
        (Status::Finished, Some(finish)) => {
            let laps: Vec<String> = finish
                .laps
                .iter()
                .map(|lap| match lap {
                    Some(split) => format!("{{{}, {:.3}}}", format_duration(split.duration), split.speed),
                    None => "{,}".to_string(),
                })
                .collect();

            format!(
                "{} {} [{}] {{{}, {:.3}}} {}/{}",
                row.competitor,
                format_duration(finish.total_elapsed),
                laps.join(" "),
                format_duration(finish.penalty.duration),
                finish.penalty.speed,
                row.hits,
                row.shots
            )
        }
        (status, _) => format!("[{}] {}", status, row.competitor),
    }
}

#[derive(Debug, Serialize)]
struct JsonReport {
    journal: Vec<String>,
    participants: Vec<JsonParticipant>,
    standings: Vec<JsonStanding>,
}

#[derive(Debug, Serialize)]
struct JsonParticipant {
    id: CompetitorId,
    status: Status,
    lap: i64,
    laps: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonStanding {
    id: CompetitorId,
    status: Status,
    hits: u32,
    shots: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonFinish>,
}

#[derive(Debug, Serialize)]
struct JsonFinish {
    total: String,
    laps: Vec<Option<JsonSplit>>,
    penalty: JsonSplit,
}

#[derive(Debug, Serialize)]
struct JsonSplit {
    time: String,
    speed: f64,
}

impl JsonReport {
    fn from_state(state: &RaceState) -> Self {
        Self {
            journal: state.journal().iter().map(|e| e.to_string()).collect(),
            participants: summary(state)
                .into_iter()
                .map(|line| JsonParticipant {
                    id: line.competitor,
                    status: line.status,
                    lap: line.current_lap,
                    laps: line.laps,
                    comment: line.comment,
                })
                .collect(),
            standings: standings(state)
                .into_iter()
                .map(|row| JsonStanding {
                    id: row.competitor,
                    status: row.status,
                    hits: row.hits,
                    shots: row.shots,
                    result: row.finish.as_ref().map(JsonFinish::from_detail),
                })
                .collect(),
        }
    }
}

impl JsonFinish {
    fn from_detail(detail: &FinishDetail) -> Self {
        Self {
            total: format_duration(detail.total_elapsed),
            laps: detail
                .laps
                .iter()
                .map(|lap| {
                    lap.map(|split| JsonSplit {
                        time: format_duration(split.duration),
                        speed: split.speed,
                    })
                })
                .collect(),
            penalty: JsonSplit {
                time: format_duration(detail.penalty.duration),
                speed: detail.penalty.speed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biathlon_engine::{parse_events, Event, EventKind, RaceConfig, ReplayOutcome};
    use chrono::{Duration, NaiveTime};

    const LOG: &str = "[09:05:59.867] 1 1
[09:15:00.841] 2 1 09:30:00.000
[09:29:45.734] 3 1
[09:30:01.005] 4 1
[09:49:31.659] 5 1 1
[09:49:33.123] 6 1 1
[09:49:34.650] 6 1 2
[09:49:38.339] 7 1
[09:49:55.915] 8 1
[09:51:48.391] 9 1
[09:59:03.872] 10 1
[10:00:00.000] 1 2
[10:01:00.000] 11 2 Lost in the forest
[10:02:00.000] 1 3
[10:03:00.000] 32 3
";

    fn replayed(laps: i64) -> RaceState {
        let config = RaceConfig::new(laps)
            .with_lap_len(3651)
            .with_penalty_len(50)
            .with_start_delta(Duration::minutes(30));
        let events = parse_events(LOG).unwrap();
        match RaceState::new(config).unwrap().replay(&events) {
            ReplayOutcome::Completed(state) => state,
            ReplayOutcome::NothingToProcess => unreachable!(),
        }
    }

    fn render(state: &RaceState, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_report(state, format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_report() {
        let text = render(&replayed(1), OutputFormat::Txt);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "[09:05:59.867] Competitor(1) registered");
        assert!(lines.contains(&" FINAL REPORT"));
        assert!(lines.contains(&"Participant 1: status=Finished, laps=1/1"));
        assert!(lines.contains(&"Participant 2: status=NotFinished, laps=0/1"));

        let tail = &lines[lines.len() - 3..];
        assert_eq!(
            tail[0],
            "1 00:30:56.348 [{00:29:02.867, 2.095}] {00:01:52.476, 0.445} 2/5"
        );
        assert_eq!(tail[1], "[NotFinished] 2");
        assert_eq!(tail[2], "[NotStarted] 3");
    }

    #[test]
    fn test_missing_lap_placeholder() {
        let mut state = replayed(2);
        // Explicit finish on the last lap without a second lap-completion
        state.process_event(&Event::new(
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            1,
            EventKind::Finished,
        ));
        let text = render(&state, OutputFormat::Txt);
        assert!(text.contains("[{00:29:02.867, 2.095} {00:30:56.128, 1.967}]"));

        let mut row = standings(&state).remove(0);
        if let Some(finish) = row.finish.as_mut() {
            finish.laps[1] = None;
        }
        assert!(text_row(&row).contains("[{00:29:02.867, 2.095} {,}]"));
    }

    #[test]
    fn test_json_report() {
        let json = render(&replayed(1), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["standings"][0]["id"], 1);
        assert_eq!(value["standings"][0]["result"]["total"], "00:30:56.348");
        assert_eq!(value["standings"][1]["status"], "NotFinished");
        assert!(value["standings"][1].get("result").is_none());
        assert_eq!(value["participants"][1]["comment"], "Lost in the forest");
    }
}
