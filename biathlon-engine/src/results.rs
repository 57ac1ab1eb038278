//! Result aggregation
//!
//! Turns the final race state into ordered result rows. This is the only place
//! that compares competitors with each other.

use crate::competitor::{Competitor, Status};
use crate::config::RaceConfig;
use crate::state::RaceState;
use crate::types::CompetitorId;
use chrono::Duration;

/// Duration of one lap and the average speed over it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapSplit {
    pub duration: Duration,
    /// Meters per second
    pub speed: f64,
}

/// Time spent in penalty loops and the average speed there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltySplit {
    pub duration: Duration,
    /// Meters per second, zero without penalty time
    pub speed: f64,
}

/// Timing details available for finished competitors
#[derive(Debug, Clone, PartialEq)]
pub struct FinishDetail {
    /// Gap between drawn and actual start plus the total race time
    pub total_elapsed: Duration,
    /// One entry per configured lap; `None` where no lap time was recorded
    pub laps: Vec<Option<LapSplit>>,
    pub penalty: PenaltySplit,
}

/// One row of the final standings
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub competitor: CompetitorId,
    pub status: Status,
    pub total_time: Duration,
    pub hits: u32,
    pub shots: u32,
    /// Present only for finished competitors
    pub finish: Option<FinishDetail>,
}

/// Status overview line for one competitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub competitor: CompetitorId,
    pub status: Status,
    pub current_lap: i64,
    pub laps: i64,
    pub comment: Option<String>,
}

/// Build the final standings
///
/// Finished competitors come first, fastest total time first. Everyone else
/// follows in identifier order. The sort is stable, so equal keys keep that
/// order.
pub fn standings(state: &RaceState) -> Vec<ResultRow> {
    let config = state.config();
    let mut competitors: Vec<&Competitor> = state.competitors().collect();

    competitors.sort_by(|a, b| {
        let a_finished = a.status == Status::Finished;
        let b_finished = b.status == Status::Finished;
        b_finished
            .cmp(&a_finished)
            .then_with(|| match (a_finished, b_finished) {
                (true, true) => a.total_time().cmp(&b.total_time()),
                _ => std::cmp::Ordering::Equal,
            })
    });

    competitors
        .into_iter()
        .map(|c| build_row(c, config))
        .collect()
}

/// Status of every competitor in identifier order
pub fn summary(state: &RaceState) -> Vec<StatusLine> {
    let laps = state.config().laps;
    state
        .competitors()
        .map(|c| StatusLine {
            competitor: c.id,
            status: c.status,
            current_lap: c.current_lap,
            laps,
            comment: c.comment.clone(),
        })
        .collect()
}

fn build_row(competitor: &Competitor, config: &RaceConfig) -> ResultRow {
    let total_time = competitor.total_time();

    let finish = (competitor.status == Status::Finished).then(|| {
        let laps = (0..config.lap_count())
            .map(|i| {
                competitor.lap_times.get(i).map(|duration| LapSplit {
                    duration: *duration,
                    speed: speed(config.lap_len, *duration),
                })
            })
            .collect();

        FinishDetail {
            total_elapsed: competitor.start_gap() + total_time,
            laps,
            penalty: PenaltySplit {
                duration: competitor.penalty_time,
                speed: speed(config.penalty_len, competitor.penalty_time),
            },
        }
    });

    ResultRow {
        competitor: competitor.id,
        status: competitor.status,
        total_time,
        hits: competitor.hits,
        shots: competitor.shots,
        finish,
    }
}

/// Average speed in meters per second; zero for a non-positive duration
fn speed(meters: i64, duration: Duration) -> f64 {
    let ms = duration.num_milliseconds();
    if ms <= 0 {
        return 0.0;
    }
    meters as f64 / (ms as f64 / 1000.0)
}
