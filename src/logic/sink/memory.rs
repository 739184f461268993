//! In-process sink for tests

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::logic::drift::DriftReport;
use crate::logic::features::Observation;
use super::{Sink, SinkError};

#[derive(Default)]
pub struct MemorySink {
    observations: Mutex<Vec<Observation>>,
    reports: Mutex<Vec<DriftReport>>,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().clone()
    }

    pub fn reports(&self) -> Vec<DriftReport> {
        self.reports.lock().clone()
    }

    pub fn observation_count(&self) -> usize {
        self.observations.lock().len()
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().len()
    }

    fn check(&self) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(SinkError::Unavailable("memory sink set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Sink for MemorySink {
    fn store_observation(&self, observation: &Observation) -> Result<(), SinkError> {
        self.check()?;
        self.observations.lock().push(observation.clone());
        Ok(())
    }

    fn store_drift_report(&self, report: &DriftReport) -> Result<(), SinkError> {
        self.check()?;
        self.reports.lock().push(report.clone());
        Ok(())
    }
}
