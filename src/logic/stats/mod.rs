//! Stats Module - Order statistics and column summaries
//!
//! - `median.rs` - Two-heap `OrderStatisticEstimator`
//! - `summary.rs` - Mean / population variance / median per column

pub mod median;
pub mod summary;

pub use summary::{mean, ColumnSummary};
