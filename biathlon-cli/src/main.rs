//! Biathlon Replay CLI Application
//!
//! This is the command-line interface for the biathlon race replay engine.
//! It uses the biathlon-engine library and adds:
//! - Configuration file loading (JSON/TOML)
//! - Progress journal output
//! - Final report generation (TXT/JSON)

use anyhow::{Context, Result};
use biathlon_engine::{load_events, RaceState, ReplayOutcome};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod report;

use report::OutputFormat;

/// Biathlon Replay - Replay a race event log and report the results
#[derive(Parser, Debug)]
#[command(name = "biathlon")]
#[command(about = "Replay biathlon race events and report results", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the race configuration (JSON or TOML)
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    /// Path to the event log
    #[arg(short, long, value_name = "FILE", default_value = "events.txt")]
    events: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
    format: OutputFormat,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Reject a second registration of the same competitor instead of replacing it
    #[arg(long)]
    strict: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Biathlon Replay CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using engine library v{}", biathlon_engine::VERSION);

    run(&args)
}

/// Load both inputs, replay the race and write the report
fn run(args: &Args) -> Result<()> {
    log::info!("Loading configuration from: {:?}", args.config);
    let config = config::load_config(&args.config).context("Failed to load race configuration")?;

    let events = load_events(&args.events)
        .with_context(|| format!("Failed to load event log: {:?}", args.events))?;

    let state = RaceState::new(config)?.with_strict_registration(args.strict);

    let state = match state.replay(&events) {
        ReplayOutcome::NothingToProcess => {
            println!("No events to process");
            return Ok(());
        }
        ReplayOutcome::Completed(state) => state,
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    report::write_report(&state, args.format, &mut out)?;
    out.flush()?;

    if let Some(path) = &args.output {
        log::info!("Report written to {:?}", path);
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
