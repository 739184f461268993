//! Drift Module - Window-vs-baseline comparison
//!
//! - `report.rs` - `WindowStatistics`, scoring functions, `DriftReport`
//! - `detector.rs` - `DriftDetector`, the ingestion entry point

pub mod report;
pub mod detector;

use serde::{Deserialize, Serialize};

pub use detector::DriftDetector;
pub use report::DriftReport;

/// Statistic kinds compared against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Mean,
    Median,
    /// Population variance
    Spread,
}
