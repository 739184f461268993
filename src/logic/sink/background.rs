//! Background Sink - Fire-and-forget persistence
//!
//! Records are queued over a bounded channel to a dedicated writer thread
//! that forwards them to the wrapped sink. The caller only pays for the
//! enqueue and never waits: when the queue is full the record is dropped,
//! counted and reported as `SinkError::QueueFull`. Write failures are
//! logged and counted by the worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::logic::drift::DriftReport;
use crate::logic::features::Observation;
use super::{Sink, SinkError, SinkRecord};

/// Records allowed to wait for the writer
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct WorkerStats {
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

pub struct BackgroundSink {
    sender: Mutex<Option<SyncSender<SinkRecord>>>,
    capacity: usize,
    worker: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<WorkerStats>,
}

impl BackgroundSink {
    /// Spawn the writer thread in front of `inner`
    pub fn spawn<S: Sink + 'static>(inner: S) -> Result<Self, SinkError> {
        Self::with_capacity(inner, DEFAULT_QUEUE_CAPACITY)
    }

    /// Same as `spawn`, with at most `capacity` records queued
    pub fn with_capacity<S: Sink + 'static>(inner: S, capacity: usize) -> Result<Self, SinkError> {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::sync_channel::<SinkRecord>(capacity);
        let stats = Arc::new(WorkerStats::default());
        let worker_stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name("drift-sink-writer".to_string())
            .spawn(move || {
                log::debug!("Sink writer thread started");
                for record in rx {
                    match record.store_in(&inner) {
                        Ok(()) => {
                            worker_stats.written.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            worker_stats.failed.fetch_add(1, Ordering::Relaxed);
                            log::error!("Sink write failed: {}", e);
                        }
                    }
                }
                log::debug!("Sink writer thread stopped");
            })?;

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            capacity,
            worker: Mutex::new(Some(handle)),
            stats,
        })
    }

    /// Records persisted by the worker so far
    pub fn written(&self) -> u64 {
        self.stats.written.load(Ordering::Relaxed)
    }

    /// Records the wrapped sink rejected so far
    pub fn failed(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }

    /// Records refused because the queue was full
    pub fn dropped(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting records, drain the queue and join the worker
    pub fn shutdown(&self) {
        // Dropping the sender ends the worker loop once the queue is empty
        self.sender.lock().take();

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                log::error!("Sink writer thread panicked");
            }
        }

        log::info!(
            "Sink writer shutdown. Written: {}, failed: {}, dropped: {}",
            self.written(),
            self.failed(),
            self.dropped()
        );
    }

    fn enqueue(&self, record: SinkRecord) -> Result<(), SinkError> {
        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(SinkError::Closed)?;
        match sender.try_send(record) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                Err(SinkError::QueueFull { capacity: self.capacity })
            }
            Err(TrySendError::Disconnected(_)) => Err(SinkError::Closed),
        }
    }
}

impl Sink for BackgroundSink {
    fn store_observation(&self, observation: &Observation) -> Result<(), SinkError> {
        self.enqueue(SinkRecord::Observation(observation.clone()))
    }

    fn store_drift_report(&self, report: &DriftReport) -> Result<(), SinkError> {
        self.enqueue(SinkRecord::DriftReport(report.clone()))
    }
}

impl Drop for BackgroundSink {
    fn drop(&mut self) {
        if self.worker.get_mut().is_some() {
            self.shutdown();
        }
    }
}
