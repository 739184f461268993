//! Logic Module - Drift detection engine
//!
//! ## Architecture
//! - `features/` - Feature layout, vectors and observations
//! - `stats/` - Mean, variance and streaming median
//! - `buffer` - Bounded FIFO window of recent observations
//! - `baseline/` - Reference statistics, validation and storage
//! - `drift/` - Report computation and the ingesting detector
//! - `sink/` - Persistence of observations and reports
//! - `simulate` - Synthetic traffic with an injected shift

pub mod config;
pub mod status;

pub mod features;
pub mod stats;
pub mod buffer;
pub mod baseline;
pub mod drift;
pub mod sink;
pub mod simulate;
