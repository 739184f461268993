//! Drift Monitor - Main Entry Point
//!
//! Usage: `drift-monitor [simulate|replay|inspect|clean]`

mod logic;
pub mod constants;

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use logic::baseline;
use logic::config::DetectorConfig;
use logic::drift::DriftDetector;
use logic::features::FeatureLayout;
use logic::simulate::{self, SimulationConfig};
use logic::sink::recorder::{list_log_files, read_records};
use logic::sink::{BackgroundSink, JsonlSink, Sink, SinkRecord, SqliteSink};

/// Seed of the synthetic reference sample
const REFERENCE_SEED: u64 = 0;

/// Reports printed by `inspect`
const INSPECT_REPORTS: usize = 5;

#[derive(Parser)]
#[command(author, version, about = "Input distribution drift monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Drive synthetic traffic with a mid-run shift through the detector
    Simulate {
        /// Total requests sent
        #[arg(long, default_value_t = 1_000)]
        requests: usize,

        /// Requests from this index on are shifted
        #[arg(long, default_value_t = 500)]
        shift_after: usize,

        /// Shift added to every feature in the second phase
        #[arg(long, default_value_t = 2.0)]
        shift: f64,

        /// Sender threads per phase
        #[arg(long, default_value_t = 4)]
        threads: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Ingest observations from stdin (JSONL) or from recorded log files
    Replay {
        /// Directory of recorded `.jsonl` drift logs to read instead of stdin
        #[arg(long, value_name = "DIR")]
        from_log: Option<PathBuf>,
    },

    /// Print row counts and the most recent drift reports
    Inspect,

    /// Delete every stored observation and report
    Clean,
}

impl Default for Command {
    fn default() -> Self {
        let defaults = SimulationConfig::default();
        Command::Simulate {
            requests: defaults.requests,
            shift_after: defaults.shift_after,
            shift: defaults.shift,
            threads: defaults.threads,
            seed: defaults.seed,
        }
    }
}

/// One line of `replay` input
#[derive(Debug, Deserialize)]
struct ReplayLine {
    request_id: String,
    features: Vec<f64>,
    prediction: f64,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command = Cli::parse().command.unwrap_or_default();

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    let result = match command {
        Command::Inspect => inspect(),
        Command::Clean => clean(),
        detector_command => run_detector(detector_command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// DETECTOR MODES
// ============================================================================

fn run_detector(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let config = DetectorConfig::from_env();
    config.validate()?;

    let layout = match constants::get_feature_names() {
        Some(names) => FeatureLayout::new(names),
        None => FeatureLayout::for_count(config.feature_count),
    };

    let baseline = baseline::load_or_derive(&constants::get_baseline_path(), &layout, || {
        simulate::reference_baseline(&layout, REFERENCE_SEED)
    })?;

    let writer = Arc::new(open_sink()?);
    let sink: Arc<dyn Sink> = writer.clone();
    let detector = Arc::new(DriftDetector::new(config, Arc::new(baseline), sink)?);

    match command {
        Command::Simulate { requests, shift_after, shift, threads, seed } => {
            let sim = SimulationConfig { requests, shift_after, shift, threads, seed };
            let summary = simulate::run(Arc::clone(&detector), &sim);
            log::info!(
                "Simulation done: {} requests, {} reports, {} alerts, {} rejected",
                summary.requests_sent,
                summary.reports,
                summary.alerts,
                summary.rejected
            );
        }
        Command::Replay { from_log: Some(dir) } => replay_logs(&detector, &dir)?,
        Command::Replay { from_log: None } => replay_stdin(&detector),
        Command::Inspect | Command::Clean => {}
    }

    writer.shutdown();

    let status = detector.status();
    log::info!(
        "Final status: window {}/{} ({:.1}%), ingested={}, reports={}, alerts={}, sink failures={}, writer failures={}, dropped={}",
        status.window.current_size,
        status.window.capacity,
        status.window.fill_percent,
        status.observations_ingested,
        status.reports_emitted,
        status.alerts_raised,
        status.sink_failures,
        writer.failed(),
        writer.dropped()
    );

    Ok(())
}

/// JSONL recorder when `DRIFT_LOG_DIR` is set, SQLite otherwise
fn open_sink() -> Result<BackgroundSink, logic::sink::SinkError> {
    match constants::get_log_dir() {
        Some(dir) => {
            let recorder = JsonlSink::new(dir)?;
            log::info!("Recording to JSONL at {:?}", recorder.current_file());
            BackgroundSink::spawn(recorder)
        }
        None => {
            let path = constants::get_db_path();
            log::info!("Recording to SQLite at {:?}", path);
            BackgroundSink::spawn(SqliteSink::open(&path)?)
        }
    }
}

fn replay_stdin(detector: &DriftDetector) {
    let stdin = io::stdin();
    let mut skipped = 0u64;

    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("Failed to read stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let parsed: ReplayLine = match serde_json::from_str(&line) {
            Ok(p) => p,
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping line {}: {}", line_no + 1, e);
                continue;
            }
        };

        // Rejections are logged by the detector
        if detector.ingest(&parsed.request_id, parsed.features, parsed.prediction).is_err() {
            skipped += 1;
        }
    }

    log::info!("Replay done ({} lines skipped)", skipped);
}

/// Re-ingest the observations of recorded drift logs, oldest file first.
/// Stored drift reports are skipped; the detector computes its own.
fn replay_logs(detector: &DriftDetector, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let files = list_log_files(dir)?;
    if files.is_empty() {
        log::warn!("No drift logs found in {:?}", dir);
    }

    let mut replayed = 0u64;
    let mut rejected = 0u64;

    for file in &files {
        for record in read_records(file)? {
            if let SinkRecord::Observation(o) = record {
                match detector.ingest(&o.request_id, o.features.into(), o.prediction) {
                    Ok(_) => replayed += 1,
                    Err(_) => rejected += 1,
                }
            }
        }
    }

    log::info!(
        "Replayed {} observations from {} files ({} rejected)",
        replayed,
        files.len(),
        rejected
    );
    Ok(())
}

// ============================================================================
// STORE MODES
// ============================================================================

fn inspect() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteSink::open(&constants::get_db_path())?;

    let counts = serde_json::json!({
        "predictions": store.row_count("predictions")?,
        "metrics": store.row_count("metrics")?,
    });
    println!("{}", serde_json::to_string_pretty(&counts)?);

    let reports = store.recent_reports(INSPECT_REPORTS)?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn clean() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteSink::open(&constants::get_db_path())?;
    store.clear()?;
    log::info!("Cleared predictions and metrics");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::logic::features::{FeatureVector, Observation};
    use crate::logic::sink::MemorySink;

    #[test]
    fn test_cli_defaults_to_simulate() {
        let cli = Cli::try_parse_from(["drift-monitor"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or_default(),
            Command::Simulate { requests: 1_000, shift_after: 500, threads: 4, .. }
        ));
    }

    #[test]
    fn test_cli_subcommands() {
        let cli = Cli::try_parse_from(["drift-monitor", "replay", "--from-log", "/tmp/logs"]).unwrap();
        match cli.command {
            Some(Command::Replay { from_log: Some(dir) }) => assert_eq!(dir, PathBuf::from("/tmp/logs")),
            _ => panic!("expected replay with a log dir"),
        }

        assert!(matches!(
            Cli::try_parse_from(["drift-monitor", "inspect"]).unwrap().command,
            Some(Command::Inspect)
        ));
        assert!(Cli::try_parse_from(["drift-monitor", "bogus"]).is_err());
    }

    #[test]
    fn test_replay_logs_reingests_recorded_observations() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = JsonlSink::new(dir.path()).unwrap();
        for i in 0..5 {
            let fv = FeatureVector::new(vec![i as f64; 8], 8).unwrap();
            recorder
                .store_observation(&Observation::new(Utc::now(), &format!("req-{}", i), fv, 0.5))
                .unwrap();
        }
        drop(recorder);

        let layout = FeatureLayout::default();
        let baseline = crate::logic::baseline::BaselineReference::from_parts(
            &layout,
            vec![0.0; 8],
            vec![0.0; 8],
            vec![0.0; 8],
        )
        .unwrap();
        let memory = Arc::new(MemorySink::new());
        let detector = DriftDetector::new(DetectorConfig::default(), Arc::new(baseline), memory.clone()).unwrap();

        replay_logs(&detector, dir.path()).unwrap();

        let ids: Vec<String> = memory.observations().into_iter().map(|o| o.request_id).collect();
        assert_eq!(ids, vec!["req-0", "req-1", "req-2", "req-3", "req-4"]);
    }
}
