//! Baseline Module - Reference statistics of the expected input distribution
//!
//! One (mean, population variance, median) triple per feature index,
//! computed once from a reference dataset and never mutated afterwards.
//! The detector holds it behind an `Arc` and only reads it.
//!
//! # Architecture
//! - `validate.rs`: `BaselineError`, layout/width validation
//! - `storage.rs`: JSON persistence with validation on load
//!
//! # Failure Strategy
//! If the stored baseline is missing or was built for another layout,
//! derive a fresh one and persist it.

pub mod validate;
pub mod storage;
#[cfg(test)]
mod tests;

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::logic::drift::Statistic;
use crate::logic::features::FeatureLayout;
use crate::logic::stats::ColumnSummary;

pub use storage::{load_baseline, save_baseline};
pub use validate::BaselineError;

// ============================================================================
// BASELINE REFERENCE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineReference {
    feature_version: u8,
    layout_hash: u32,
    feature_names: Vec<String>,
    samples: u64,
    created_at: i64, // Unix timestamp

    // Statistics for all features (in order of layout)
    mean: Vec<f64>,
    variance: Vec<f64>,
    median: Vec<f64>,
}

impl BaselineReference {
    /// Baseline from precomputed per-feature statistics
    pub fn from_parts(
        layout: &FeatureLayout,
        mean: Vec<f64>,
        variance: Vec<f64>,
        median: Vec<f64>,
    ) -> Result<Self, BaselineError> {
        validate::check_columns(&mean, &variance, &median, layout.len())?;

        Ok(Self {
            feature_version: layout.version(),
            layout_hash: layout.hash(),
            feature_names: layout.names().to_vec(),
            samples: 0,
            created_at: Utc::now().timestamp(),
            mean,
            variance,
            median,
        })
    }

    /// Derive the baseline from a reference dataset, one row per sample
    pub fn from_samples<R: AsRef<[f64]>>(
        layout: &FeatureLayout,
        rows: &[R],
    ) -> Result<Self, BaselineError> {
        if rows.is_empty() || layout.is_empty() {
            return Err(BaselineError::EmptyDataset);
        }

        let width = layout.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); width];

        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(BaselineError::WrongWidth {
                    what: "reference row",
                    expected: width,
                    actual: row.len(),
                });
            }
            for (column, &value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        let mut mean = Vec::with_capacity(width);
        let mut variance = Vec::with_capacity(width);
        let mut median = Vec::with_capacity(width);

        for column in &columns {
            let summary = ColumnSummary::from_values(column).ok_or(BaselineError::EmptyDataset)?;
            mean.push(summary.mean);
            variance.push(summary.variance);
            median.push(summary.median);
        }

        let mut baseline = Self::from_parts(layout, mean, variance, median)?;
        baseline.samples = rows.len() as u64;
        Ok(baseline)
    }

    pub fn feature_version(&self) -> u8 {
        self.feature_version
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn feature_count(&self) -> usize {
        self.mean.len()
    }

    /// Number of reference rows, 0 when built from parts
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn variance(&self) -> &[f64] {
        &self.variance
    }

    pub fn median(&self) -> &[f64] {
        &self.median
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
// INITIALIZATION
// ============================================================================

/// Load the baseline from `path`, or derive one with `derive` and persist it
/// when the file is missing or invalid.
pub fn load_or_derive<F>(
    path: &Path,
    layout: &FeatureLayout,
    derive: F,
) -> Result<BaselineReference, BaselineError>
where
    F: FnOnce() -> Result<BaselineReference, BaselineError>,
{
    match load_baseline(path, layout) {
        Ok(b) => {
            log::info!(
                "Loaded baseline v{} (hash: {:x}, features: {}, samples: {}, created: {})",
                b.feature_version(), b.layout_hash(), b.feature_count(), b.samples(), b.created_at()
            );
            Ok(b)
        }
        Err(e) => {
            log::warn!("Baseline load failed/invalid: {}. Deriving new baseline.", e);
            let new_b = derive()?;

            if let Err(save_err) = save_baseline(&new_b, path) {
                log::error!("Failed to save new baseline: {}", save_err);
            }

            Ok(new_b)
        }
    }
}
