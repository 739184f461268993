//! Sink Module - Where observations and drift reports are persisted
//!
//! The detector only sees the narrow `Sink` trait. Failures are returned
//! to the caller of the sink, which logs them and moves on; nothing here
//! is retried.
//!
//! ## Structure
//! - `sqlite.rs` - `SqliteSink`, the durable store read by the dashboard
//! - `recorder.rs` - `JsonlSink`, append-only JSONL with rotation
//! - `memory.rs` - `MemorySink`, in-process recorder
//! - `background.rs` - `BackgroundSink`, moves writes to a worker thread

pub mod sqlite;
pub mod recorder;
#[cfg(test)]
pub mod memory;
pub mod background;

use serde::{Deserialize, Serialize};

use crate::logic::drift::DriftReport;
use crate::logic::features::Observation;

pub use background::BackgroundSink;
#[cfg(test)]
pub use memory::MemorySink;
pub use recorder::JsonlSink;
pub use sqlite::SqliteSink;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sink is closed")]
    Closed,

    #[error("sink queue is full ({capacity} records pending)")]
    QueueFull { capacity: usize },

    #[error("stored timestamp out of range: {0}")]
    InvalidTimestamp(f64),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SINK TRAIT
// ============================================================================

/// Append-only recorder for raw observations and drift reports
pub trait Sink: Send + Sync {
    fn store_observation(&self, observation: &Observation) -> Result<(), SinkError>;

    fn store_drift_report(&self, report: &DriftReport) -> Result<(), SinkError>;
}

impl<S: Sink + ?Sized> Sink for std::sync::Arc<S> {
    fn store_observation(&self, observation: &Observation) -> Result<(), SinkError> {
        (**self).store_observation(observation)
    }

    fn store_drift_report(&self, report: &DriftReport) -> Result<(), SinkError> {
        (**self).store_drift_report(report)
    }
}

/// One line of a JSONL sink, and the unit of work of `BackgroundSink`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkRecord {
    Observation(Observation),
    DriftReport(DriftReport),
}

impl SinkRecord {
    /// Forward this record to `sink`
    pub fn store_in(&self, sink: &dyn Sink) -> Result<(), SinkError> {
        match self {
            SinkRecord::Observation(o) => sink.store_observation(o),
            SinkRecord::DriftReport(r) => sink.store_drift_report(r),
        }
    }
}
