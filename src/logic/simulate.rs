//! Traffic Simulator - Synthetic load with an injected distribution shift
//!
//! Phase one draws every feature from N(0, 1); phase two adds a constant
//! shift to every feature. With the default window the detector sees
//! clean traffic first and starts alerting once shifted requests dominate
//! the window.

use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Serialize;

use super::baseline::{BaselineError, BaselineReference};
use super::drift::DriftDetector;
use super::features::FeatureLayout;

/// Reference rows used for the synthetic baseline
const REFERENCE_ROWS: usize = 5_000;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub requests: usize,
    /// Requests with index >= this are shifted
    pub shift_after: usize,
    pub shift: f64,
    pub threads: usize,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            requests: 1_000,
            shift_after: 500,
            shift: 2.0,
            threads: 4,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationSummary {
    pub requests_sent: usize,
    pub rejected: usize,
    pub reports: usize,
    pub alerts: usize,
}

/// `width` independent N(shift, 1) draws
pub fn sample_row<R: Rng>(rng: &mut R, width: usize, shift: f64) -> Vec<f64> {
    (0..width).map(|_| rng.sample::<f64, _>(StandardNormal) + shift).collect()
}

/// Baseline of an unshifted standard-normal reference sample
pub fn reference_baseline(layout: &FeatureLayout, seed: u64) -> Result<BaselineReference, BaselineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows: Vec<Vec<f64>> = (0..REFERENCE_ROWS)
        .map(|_| sample_row(&mut rng, layout.len(), 0.0))
        .collect();
    BaselineReference::from_samples(layout, &rows)
}

/// Drive the detector phase by phase, each phase split across threads
pub fn run(detector: Arc<DriftDetector>, config: &SimulationConfig) -> SimulationSummary {
    let clean = config.shift_after.min(config.requests);
    let phases = [(0, clean, 0.0), (clean, config.requests, config.shift)];

    let mut summary = SimulationSummary::default();

    for (phase, &(start, end, shift)) in phases.iter().enumerate() {
        if start >= end {
            continue;
        }
        log::info!("Simulation phase {}: requests {}..{} (shift {:+.1})", phase + 1, start, end, shift);

        let threads = config.threads.max(1);
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let detector = Arc::clone(&detector);
                let seed = config.seed.wrapping_add((phase * threads + t) as u64);
                thread::spawn(move || drive(&detector, (start + t..end).step_by(threads), shift, seed))
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(part) => {
                    summary.requests_sent += part.requests_sent;
                    summary.rejected += part.rejected;
                    summary.reports += part.reports;
                    summary.alerts += part.alerts;
                }
                Err(_) => log::error!("Simulation worker panicked"),
            }
        }
    }

    summary
}

fn drive(
    detector: &DriftDetector,
    indices: impl Iterator<Item = usize>,
    shift: f64,
    seed: u64,
) -> SimulationSummary {
    let mut rng = StdRng::seed_from_u64(seed);
    let width = detector.config().feature_count;
    let mut summary = SimulationSummary::default();

    for _ in indices {
        let features = sample_row(&mut rng, width, shift);
        // Stand-in for the served model's score
        let prediction = features.iter().sum::<f64>() / width as f64;
        let request_id = uuid::Uuid::new_v4().to_string();

        summary.requests_sent += 1;
        match detector.ingest(&request_id, features, prediction) {
            Ok(Some(report)) => {
                summary.reports += 1;
                if report.alert {
                    summary.alerts += 1;
                }
            }
            Ok(None) => {}
            Err(_) => summary.rejected += 1,
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::DetectorConfig;
    use crate::logic::sink::MemorySink;

    #[test]
    fn test_reference_baseline_is_standard_normal() {
        let layout = FeatureLayout::default();
        let b = reference_baseline(&layout, 7).unwrap();

        assert_eq!(b.feature_count(), 8);
        assert_eq!(b.samples(), REFERENCE_ROWS as u64);
        for i in 0..8 {
            assert!(b.mean()[i].abs() < 0.1, "mean {} = {}", i, b.mean()[i]);
            assert!((b.variance()[i] - 1.0).abs() < 0.1, "variance {} = {}", i, b.variance()[i]);
            assert!(b.median()[i].abs() < 0.1, "median {} = {}", i, b.median()[i]);
        }
    }

    #[test]
    fn test_sample_row_applies_shift() {
        let mut rng = StdRng::seed_from_u64(3);
        let rows: Vec<Vec<f64>> = (0..2_000).map(|_| sample_row(&mut rng, 4, 2.0)).collect();

        assert!(rows.iter().all(|r| r.len() == 4));
        let mean = rows.iter().flatten().sum::<f64>() / 8_000.0;
        assert!((mean - 2.0).abs() < 0.1, "mean = {}", mean);
    }

    #[test]
    fn test_shifted_phase_raises_alerts() {
        let layout = FeatureLayout::default();
        let baseline = Arc::new(reference_baseline(&layout, 1).unwrap());
        let config = DetectorConfig {
            window_capacity: 400,
            trigger_threshold: 200,
            ..Default::default()
        };
        let sink = Arc::new(MemorySink::new());
        let detector = Arc::new(DriftDetector::new(config, baseline, sink.clone()).unwrap());

        let summary = run(Arc::clone(&detector), &SimulationConfig::default());

        assert_eq!(summary.requests_sent, 1_000);
        assert_eq!(summary.rejected, 0);
        assert_eq!(sink.observation_count(), 1_000);
        assert_eq!(summary.reports, 1_000 - 200);

        // Window is all shifted traffic by the end
        let last = detector.status().last_report.unwrap();
        assert!(last.alert);
        assert_eq!(last.mean_ratio, 1.0);

        // Clean phase never alerts
        assert!(summary.alerts < summary.reports);
    }
}
