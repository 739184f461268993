//! Window statistics, drift scoring and the emitted report

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::baseline::BaselineReference;
use crate::logic::features::Observation;
use crate::logic::stats::{self, ColumnSummary};
use super::Statistic;

// ============================================================================
// WINDOW STATISTICS
// ============================================================================

/// Per-feature statistics of one window snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStatistics {
    pub window_size: usize,
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    pub median: Vec<f64>,
}

impl WindowStatistics {
    /// Full pass over the snapshot, one column at a time.
    /// `None` for an empty snapshot.
    pub fn from_snapshot(snapshot: &[Arc<Observation>], feature_count: usize) -> Option<Self> {
        if snapshot.is_empty() {
            return None;
        }

        let mut mean = Vec::with_capacity(feature_count);
        let mut variance = Vec::with_capacity(feature_count);
        let mut median = Vec::with_capacity(feature_count);
        let mut column = Vec::with_capacity(snapshot.len());

        for i in 0..feature_count {
            column.clear();
            column.extend(snapshot.iter().filter_map(|o| o.features.get(i)));

            let summary = ColumnSummary::from_values(&column)?;
            mean.push(summary.mean);
            variance.push(summary.variance);
            median.push(summary.median);
        }

        Some(Self {
            window_size: snapshot.len(),
            mean,
            variance,
            median,
        })
    }

    pub fn values(&self, statistic: Statistic) -> &[f64] {
        match statistic {
            Statistic::Mean => &self.mean,
            Statistic::Median => &self.median,
            Statistic::Spread => &self.variance,
        }
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// `|baseline[i] - streaming[i]|` per feature
pub fn absolute_drift(baseline: &[f64], streaming: &[f64]) -> Vec<f64> {
    baseline
        .iter()
        .zip(streaming)
        .map(|(b, s)| (b - s).abs())
        .collect()
}

/// Fraction of features whose drift is strictly above `threshold`.
/// 0.0 when there are no features.
pub fn alert_ratio(drift: &[f64], threshold: f64) -> f64 {
    if drift.is_empty() {
        return 0.0;
    }
    let flagged = drift.iter().filter(|&&d| d > threshold).count();
    flagged as f64 / drift.len() as f64
}

/// Location drift only: the spread ratio is reported but not scored
pub fn drift_score(mean_ratio: f64, median_ratio: f64) -> f64 {
    mean_ratio.max(median_ratio)
}

// ============================================================================
// DRIFT REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub timestamp: DateTime<Utc>,
    pub window_size: usize,

    // Column-wise statistics averaged across features
    pub mean_value: f64,
    pub median_value: f64,
    pub std_value: f64,

    // Per-feature absolute drift, length = feature count
    pub mean_drift: Vec<f64>,
    pub median_drift: Vec<f64>,
    pub std_drift: Vec<f64>,

    // Fraction of features over the per-feature threshold
    pub mean_ratio: f64,
    pub median_ratio: f64,
    pub std_ratio: f64,

    pub drift_score: f64,
    pub alert: bool,
}

impl DriftReport {
    /// Compare window statistics with the baseline
    pub fn evaluate(
        baseline: &BaselineReference,
        window: &WindowStatistics,
        drift_threshold: f64,
        global_threshold: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mean_drift = absolute_drift(baseline.values(Statistic::Mean), window.values(Statistic::Mean));
        let median_drift = absolute_drift(baseline.values(Statistic::Median), window.values(Statistic::Median));
        let std_drift = absolute_drift(baseline.values(Statistic::Spread), window.values(Statistic::Spread));

        let mean_ratio = alert_ratio(&mean_drift, drift_threshold);
        let median_ratio = alert_ratio(&median_drift, drift_threshold);
        let std_ratio = alert_ratio(&std_drift, drift_threshold);

        let drift_score = drift_score(mean_ratio, median_ratio);

        Self {
            timestamp,
            window_size: window.window_size,
            mean_value: stats::mean(&window.mean).unwrap_or(0.0),
            median_value: stats::mean(&window.median).unwrap_or(0.0),
            std_value: stats::mean(&window.variance).unwrap_or(0.0),
            mean_drift,
            median_drift,
            std_drift,
            mean_ratio,
            median_ratio,
            std_ratio,
            drift_score,
            alert: drift_score >= global_threshold,
        }
    }

    /// Features with the largest mean drift, descending
    pub fn top_drifting(&self, names: &[String], limit: usize) -> Vec<(String, f64)> {
        let mut feature_drifts: Vec<(String, f64)> = self
            .mean_drift
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let name = names.get(i).cloned().unwrap_or_else(|| format!("feature{}", i + 1));
                (name, d)
            })
            .collect();

        feature_drifts.sort_by(|a, b| b.1.total_cmp(&a.1));
        feature_drifts.truncate(limit);
        feature_drifts
    }
}
