//! Column summaries over a window snapshot
//!
//! All functions return `None` on empty input instead of dividing by zero.

use serde::{Deserialize, Serialize};

use super::median::OrderStatisticEstimator;

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by n)
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Median of one column, through a fresh estimator that is dropped on return
pub fn column_median(values: &[f64]) -> Option<f64> {
    let mut estimator = OrderStatisticEstimator::with_capacity(values.len());
    estimator.extend(values.iter().copied());
    estimator.median()
}

/// Mean, population variance and median of one feature column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub mean: f64,
    pub variance: f64,
    pub median: f64,
}

impl ColumnSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            mean: mean(values)?,
            variance: population_variance(values)?,
            median: column_median(values)?,
        })
    }
}
