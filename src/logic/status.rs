//! Engine status snapshot for operators

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::buffer::BufferStatus;
use super::drift::DriftReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub feature_count: usize,
    pub layout_hash: u32,

    pub window: BufferStatus,

    pub observations_ingested: u64,
    pub observations_rejected: u64,
    pub reports_emitted: u64,
    pub alerts_raised: u64,
    pub sink_failures: u64,

    pub last_report: Option<DriftReport>,
}

/// Running totals kept by the detector
#[derive(Debug, Default)]
pub struct EngineCounters {
    pub ingested: AtomicU64,
    pub rejected: AtomicU64,
    pub reports: AtomicU64,
    pub alerts: AtomicU64,
    pub sink_failures: AtomicU64,
}

impl EngineCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
