//! Drift Detector - Ingestion and recompute orchestration
//!
//! Critical section (under the window lock): stamp, append, evict, decide
//! whether to recompute, take the snapshot. Everything else, including
//! statistics and every sink write, runs after the lock is released.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::logic::baseline::BaselineReference;
use crate::logic::buffer::ObservationWindow;
use crate::logic::config::{ConfigError, DetectorConfig};
use crate::logic::features::{FeatureError, FeatureVector, Observation};
use crate::logic::sink::Sink;
use crate::logic::status::{EngineCounters, EngineStatus};
use super::report::{DriftReport, WindowStatistics};

/// Names listed in the alert log line
const TOP_DRIFTING_LOGGED: usize = 3;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DriftError {
    #[error("invalid detector config: {0}")]
    Config(#[from] ConfigError),

    #[error("baseline has {baseline} features, detector configured for {configured}")]
    BaselineWidth { baseline: usize, configured: usize },

    #[error("rejected observation '{request_id}': {source}")]
    InvalidFeatures {
        request_id: String,
        #[source]
        source: FeatureError,
    },

    #[error("rejected observation '{request_id}': prediction is not finite ({value})")]
    InvalidPrediction { request_id: String, value: f64 },
}

// ============================================================================
// DETECTOR
// ============================================================================

struct WindowState {
    window: ObservationWindow,
    last_timestamp: Option<DateTime<Utc>>,
    // Appends so far; orders snapshots taken by concurrent ingests
    sequence: u64,
}

/// Newest report by the sequence of the snapshot it was computed from
struct LatestReport {
    sequence: u64,
    report: DriftReport,
}

pub struct DriftDetector {
    config: DetectorConfig,
    baseline: Arc<BaselineReference>,
    state: Mutex<WindowState>,
    sink: Arc<dyn Sink>,
    counters: EngineCounters,
    last_report: Mutex<Option<LatestReport>>,
}

impl DriftDetector {
    pub fn new(
        config: DetectorConfig,
        baseline: Arc<BaselineReference>,
        sink: Arc<dyn Sink>,
    ) -> Result<Self, DriftError> {
        config.validate()?;

        if baseline.feature_count() != config.feature_count {
            return Err(DriftError::BaselineWidth {
                baseline: baseline.feature_count(),
                configured: config.feature_count,
            });
        }

        log::info!(
            "Drift detector initialized: capacity={}, trigger>{}, feature threshold={}, global threshold={}, features={}",
            config.window_capacity,
            config.trigger_threshold,
            config.drift_threshold,
            config.global_threshold,
            config.feature_count
        );

        Ok(Self {
            state: Mutex::new(WindowState {
                window: ObservationWindow::new(config.window_capacity),
                last_timestamp: None,
                sequence: 0,
            }),
            config,
            baseline,
            sink,
            counters: EngineCounters::default(),
            last_report: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Accept one served request.
    ///
    /// Returns `Err` only for malformed input, in which case nothing is
    /// appended or stored. Sink failures are logged and counted.
    /// Returns the drift report when this call triggered a recompute.
    pub fn ingest(
        &self,
        request_id: &str,
        features: Vec<f64>,
        prediction: f64,
    ) -> Result<Option<DriftReport>, DriftError> {
        let features = match FeatureVector::new(features, self.config.feature_count) {
            Ok(fv) => fv,
            Err(source) => {
                EngineCounters::bump(&self.counters.rejected);
                log::warn!("Rejected observation '{}': {}", request_id, source);
                return Err(DriftError::InvalidFeatures {
                    request_id: request_id.to_string(),
                    source,
                });
            }
        };

        if !prediction.is_finite() {
            EngineCounters::bump(&self.counters.rejected);
            log::warn!("Rejected observation '{}': prediction {}", request_id, prediction);
            return Err(DriftError::InvalidPrediction {
                request_id: request_id.to_string(),
                value: prediction,
            });
        }

        let (observation, snapshot) = {
            let mut state = self.state.lock();

            // Arrival order must match timestamp order even if the clock steps back
            let now = Utc::now();
            let timestamp = match state.last_timestamp {
                Some(last) if last > now => last,
                _ => now,
            };
            state.last_timestamp = Some(timestamp);

            let observation = Arc::new(Observation::new(timestamp, request_id, features, prediction));
            state.window.append(Arc::clone(&observation));
            state.sequence += 1;

            let snapshot = if state.window.size() > self.config.trigger_threshold {
                Some((state.sequence, state.window.snapshot()))
            } else {
                None
            };

            (observation, snapshot)
        };

        EngineCounters::bump(&self.counters.ingested);

        if let Err(e) = self.sink.store_observation(&observation) {
            EngineCounters::bump(&self.counters.sink_failures);
            log::error!("Failed to store observation '{}': {}", request_id, e);
        }

        Ok(snapshot.and_then(|(sequence, s)| self.recompute(sequence, &s)))
    }

    /// Full statistics pass over one snapshot, emitted to the sink
    fn recompute(&self, sequence: u64, snapshot: &[Arc<Observation>]) -> Option<DriftReport> {
        let window = WindowStatistics::from_snapshot(snapshot, self.config.feature_count)?;

        let report = DriftReport::evaluate(
            &self.baseline,
            &window,
            self.config.drift_threshold,
            self.config.global_threshold,
            Utc::now(),
        );

        EngineCounters::bump(&self.counters.reports);

        if report.alert {
            EngineCounters::bump(&self.counters.alerts);
            let top = report.top_drifting(self.baseline.feature_names(), TOP_DRIFTING_LOGGED);
            log::warn!(
                "Drift alert: score={:.3} (mean={:.3}, median={:.3}, std={:.3}) window={} top={:?}",
                report.drift_score,
                report.mean_ratio,
                report.median_ratio,
                report.std_ratio,
                report.window_size,
                top
            );
        } else {
            log::debug!(
                "Drift report: score={:.3} window={}",
                report.drift_score,
                report.window_size
            );
        }

        if let Err(e) = self.sink.store_drift_report(&report) {
            EngineCounters::bump(&self.counters.sink_failures);
            log::error!("Failed to store drift report: {}", e);
        }

        {
            // Concurrent passes may finish out of order; keep the newest window
            let mut last = self.last_report.lock();
            if last.as_ref().map_or(true, |prev| prev.sequence < sequence) {
                *last = Some(LatestReport {
                    sequence,
                    report: report.clone(),
                });
            }
        }

        Some(report)
    }

    #[cfg(test)]
    pub fn window_size(&self) -> usize {
        self.state.lock().window.size()
    }

    /// Point-in-time copy of the window, oldest first
    #[cfg(test)]
    pub fn window_snapshot(&self) -> Vec<Arc<Observation>> {
        self.state.lock().window.snapshot()
    }

    pub fn status(&self) -> EngineStatus {
        let window = self.state.lock().window.status(self.config.trigger_threshold);

        EngineStatus {
            feature_count: self.config.feature_count,
            layout_hash: self.baseline.layout_hash(),
            window,
            observations_ingested: EngineCounters::read(&self.counters.ingested),
            observations_rejected: EngineCounters::read(&self.counters.rejected),
            reports_emitted: EngineCounters::read(&self.counters.reports),
            alerts_raised: EngineCounters::read(&self.counters.alerts),
            sink_failures: EngineCounters::read(&self.counters.sink_failures),
            last_report: self.last_report.lock().as_ref().map(|latest| latest.report.clone()),
        }
    }
}
