//! Race state machine
//!
//! `RaceState` folds the event log, one event at a time and strictly in log
//! order, into per-competitor state. Processing never fails: events for
//! unknown competitors, unparsable draw times and progress reported after a
//! competitor's race is over are dropped.
//!
//! Every processed event leaves one or more [`LogEntry`] records in the
//! journal. The engine never prints them; that is up to the caller.

use crate::competitor::{Competitor, Status};
use crate::config::RaceConfig;
use crate::time::{elapsed, format_timestamp, parse_timestamp};
use crate::types::{CompetitorId, Event, EventKind, Result, Timestamp};
use chrono::Duration;
use std::collections::BTreeMap;
use std::fmt;

/// What happened to a competitor, as recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Registered,
    /// Duplicate registration refused in strict mode
    RegistrationRejected,
    StartTimeDrawn(Timestamp),
    LateToStart,
    OnStartLine,
    Started,
    OnFiringRange(String),
    TargetHit(String),
    LeftFiringRange,
    EnteredPenaltyLoop,
    LeftPenaltyLoop,
    /// Lap ended; carries the measured duration when a boundary was known
    LapCompleted(Option<Duration>),
    AutoFinished,
    CannotContinue(String),
    Disqualified,
    Finished,
    /// Explicit finish before the last lap was reached
    FinishRejected { lap: i64, laps: i64 },
}

/// One journal line: when, who and what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub time: Timestamp,
    pub competitor: CompetitorId,
    pub action: Action,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.competitor;
        write!(f, "[{}] ", format_timestamp(self.time))?;
        match &self.action {
            Action::Registered => write!(f, "Competitor({}) registered", id),
            Action::RegistrationRejected => {
                write!(f, "Competitor({}) already registered, registration ignored", id)
            }
            Action::StartTimeDrawn(start) => write!(
                f,
                "Start time for competitor({}) set by draw to {}",
                id,
                format_timestamp(*start)
            ),
            Action::LateToStart => write!(f, "Competitor({}) disqualified (late to start)", id),
            Action::OnStartLine => write!(f, "Competitor({}) on the start line", id),
            Action::Started => write!(f, "Competitor({}) started the race", id),
            Action::OnFiringRange(range) => {
                write!(f, "Competitor({}) entered firing range ({})", id, range)
            }
            Action::TargetHit(target) => write!(f, "Target({}) hit by competitor({})", target, id),
            Action::LeftFiringRange => write!(f, "Competitor({}) left firing range", id),
            Action::EnteredPenaltyLoop => write!(f, "Competitor({}) entered penalty laps", id),
            Action::LeftPenaltyLoop => write!(f, "Competitor({}) exited penalty laps", id),
            Action::LapCompleted(_) => write!(f, "Competitor({}) ended the main lap", id),
            Action::AutoFinished => write!(f, "Competitor({}) finished (auto)", id),
            Action::CannotContinue(comment) => {
                write!(f, "Competitor({}) cannot continue: {}", id, comment)
            }
            Action::Disqualified => write!(f, "Competitor({}) disqualified", id),
            Action::Finished => write!(f, "Competitor({}) finished", id),
            Action::FinishRejected { lap, laps } => write!(
                f,
                "Competitor({}) reported a finish on lap {}/{}, ignored",
                id, lap, laps
            ),
        }
    }
}

/// Result of replaying a complete event sequence
#[derive(Debug)]
pub enum ReplayOutcome {
    /// The event sequence was empty
    NothingToProcess,
    /// Every event was applied
    Completed(RaceState),
}

/// Owner of all competitor records for one race
#[derive(Debug, Clone)]
pub struct RaceState {
    config: RaceConfig,
    competitors: BTreeMap<CompetitorId, Competitor>,
    /// Time the current lap of each competitor began
    lap_boundaries: BTreeMap<CompetitorId, Timestamp>,
    journal: Vec<LogEntry>,
    strict_registration: bool,
}

impl RaceState {
    /// Create an empty race from a validated configuration
    pub fn new(config: RaceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            competitors: BTreeMap::new(),
            lap_boundaries: BTreeMap::new(),
            journal: Vec::new(),
            strict_registration: false,
        })
    }

    /// Builder method: refuse a second registration of the same competitor
    ///
    /// By default a repeated registration replaces the existing record.
    pub fn with_strict_registration(mut self, strict: bool) -> Self {
        self.strict_registration = strict;
        self
    }

    /// Apply every event in order
    pub fn replay(mut self, events: &[Event]) -> ReplayOutcome {
        if events.is_empty() {
            return ReplayOutcome::NothingToProcess;
        }

        for event in events {
            self.process_event(event);
        }

        log::info!(
            "Replayed {} events for {} competitors",
            events.len(),
            self.competitors.len()
        );
        ReplayOutcome::Completed(self)
    }

    /// Apply a single event
    pub fn process_event(&mut self, event: &Event) {
        let id = event.competitor;
        let now = event.time;

        if event.kind == EventKind::Registered {
            self.register(id, now);
            return;
        }

        let Some(competitor) = self.competitors.get_mut(&id) else {
            log::debug!("Event {} for unregistered competitor {} dropped", event.kind, id);
            return;
        };

        if competitor.status.is_terminal() && event.kind != EventKind::Disqualified {
            log::debug!(
                "Event {} for competitor {} ignored, status is already {}",
                event.kind,
                id,
                competitor.status
            );
            return;
        }

        let mut actions = Vec::with_capacity(2);

        match &event.kind {
            EventKind::Registered => unreachable!("registration handled above"),

            EventKind::StartTimeDrawn(params) => {
                let Some(drawn) = parse_timestamp(params) else {
                    log::debug!("Unparsable draw time '{}' for competitor {} dropped", params, id);
                    return;
                };
                competitor.start_time_draw = Some(drawn);
                actions.push(Action::StartTimeDrawn(drawn));

                if is_late(competitor, now, self.config.start_delta) {
                    competitor.status = Status::NotStarted;
                    actions.push(Action::LateToStart);
                }
            }

            EventKind::OnStartLine => {
                actions.push(Action::OnStartLine);
                if is_late(competitor, now, self.config.start_delta) {
                    competitor.status = Status::NotStarted;
                    actions.push(Action::LateToStart);
                }
            }

            EventKind::Started => {
                competitor.actual_start = Some(now);
                competitor.status = Status::Running;
                competitor.current_lap = 1;
                self.lap_boundaries.insert(id, now);
                actions.push(Action::Started);
            }

            EventKind::OnFiringRange(range) => {
                competitor.on_firing_range = true;
                competitor.firing_line = Some(range.clone());
                actions.push(Action::OnFiringRange(range.clone()));
            }

            EventKind::TargetHit(target) => {
                competitor.hits += 1;
                actions.push(Action::TargetHit(target.clone()));
            }

            EventKind::LeftFiringRange => {
                competitor.on_firing_range = false;
                competitor.shots += SHOTS_PER_BOUT;
                actions.push(Action::LeftFiringRange);
            }

            EventKind::EnteredPenaltyLoop => {
                competitor.on_penalty_loop = true;
                competitor.penalty_entered_at = Some(now);
                actions.push(Action::EnteredPenaltyLoop);
            }

            EventKind::LeftPenaltyLoop => {
                competitor.on_penalty_loop = false;
                if let Some(entered) = competitor.penalty_entered_at.take() {
                    competitor.penalty_time = competitor.penalty_time + elapsed(entered, now);
                }
                actions.push(Action::LeftPenaltyLoop);
            }

            EventKind::LapCompleted => {
                let lap = self.lap_boundaries.get(&id).map(|boundary| elapsed(*boundary, now));
                if let Some(duration) = lap {
                    competitor.lap_times.push(duration);
                    self.lap_boundaries.insert(id, now);
                }
                competitor.current_lap += 1;
                actions.push(Action::LapCompleted(lap));

                if competitor.current_lap > self.config.laps {
                    competitor.status = Status::Finished;
                    competitor.current_lap -= 1;
                    actions.push(Action::AutoFinished);
                }
            }

            EventKind::CannotContinue(comment) => {
                competitor.status = Status::NotFinished;
                competitor.comment = Some(comment.clone());
                actions.push(Action::CannotContinue(comment.clone()));
            }

            EventKind::Disqualified => {
                competitor.status = Status::NotStarted;
                actions.push(Action::Disqualified);
            }

            EventKind::Finished => {
                if competitor.current_lap >= self.config.laps {
                    competitor.status = Status::Finished;
                    if let Some(boundary) = self.lap_boundaries.get(&id) {
                        competitor.lap_times.push(elapsed(*boundary, now));
                    }
                    actions.push(Action::Finished);
                } else {
                    actions.push(Action::FinishRejected {
                        lap: competitor.current_lap,
                        laps: self.config.laps,
                    });
                }
            }
        }

        for action in actions {
            self.record(now, id, action);
        }
    }

    fn register(&mut self, id: CompetitorId, now: Timestamp) {
        if self.competitors.contains_key(&id) {
            if self.strict_registration {
                log::warn!("Duplicate registration of competitor {} rejected", id);
                self.record(now, id, Action::RegistrationRejected);
                return;
            }
            log::warn!("Competitor {} registered again, previous state discarded", id);
        }

        self.competitors.insert(id, Competitor::new(id));
        self.lap_boundaries.remove(&id);
        self.record(now, id, Action::Registered);
    }

    fn record(&mut self, time: Timestamp, competitor: CompetitorId, action: Action) {
        let entry = LogEntry {
            time,
            competitor,
            action,
        };
        log::debug!("{}", entry);
        self.journal.push(entry);
    }

    /// Race configuration
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Look up one competitor
    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.get(&id)
    }

    /// All competitors in identifier order
    pub fn competitors(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.values()
    }

    /// Time the competitor's current lap began, if it has started
    pub fn lap_boundary(&self, id: CompetitorId) -> Option<Timestamp> {
        self.lap_boundaries.get(&id).copied()
    }

    /// Journal of processed events, in processing order
    pub fn journal(&self) -> &[LogEntry] {
        &self.journal
    }

    /// Take the journal, leaving it empty
    pub fn take_journal(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.journal)
    }
}

/// Shots fired per firing-range visit
pub const SHOTS_PER_BOUT: u32 = 5;

/// Late means strictly after the drawn start plus the tolerance
fn is_late(competitor: &Competitor, now: Timestamp, start_delta: Duration) -> bool {
    match competitor.start_time_draw {
        Some(drawn) => elapsed(drawn, now) > start_delta,
        None => false,
    }
}
