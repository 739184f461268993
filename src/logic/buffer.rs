//! Observation Window - Bounded FIFO of the most recent observations
//!
//! Not synchronized on its own. The detector keeps it behind a mutex and
//! takes a `snapshot()` before releasing the lock.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::features::Observation;

// ============================================================================
// WINDOW
// ============================================================================

#[derive(Debug, Clone)]
pub struct ObservationWindow {
    entries: VecDeque<Arc<Observation>>,
    capacity: usize,
}

impl ObservationWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push to the tail, evicting from the head once over capacity.
    /// Returns the evicted observation, if any.
    pub fn append(&mut self, observation: Arc<Observation>) -> Option<Arc<Observation>> {
        self.entries.push_back(observation);

        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Point-in-time copy of the current contents, oldest first.
    /// Only reference counts are bumped; observations are shared.
    pub fn snapshot(&self) -> Vec<Arc<Observation>> {
        self.entries.iter().cloned().collect()
    }

    pub fn status(&self, trigger_threshold: usize) -> BufferStatus {
        let current_size = self.entries.len();

        BufferStatus {
            current_size,
            capacity: self.capacity,
            trigger_threshold,
            is_ready: current_size > trigger_threshold,
            fill_percent: if self.capacity > 0 {
                (current_size as f64 / self.capacity as f64 * 100.0).min(100.0)
            } else {
                0.0
            },
        }
    }
}

/// Buffer status information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferStatus {
    pub current_size: usize,
    pub capacity: usize,
    pub trigger_threshold: usize,
    pub is_ready: bool,
    pub fill_percent: f64,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureVector;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn obs(i: usize) -> Arc<Observation> {
        let ts = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
        let fv = FeatureVector::new(vec![i as f64], 1).unwrap();
        Arc::new(Observation::new(ts, format!("req-{}", i), fv, 0.0))
    }

    #[test]
    fn test_buffer_operations() {
        let mut window = ObservationWindow::new(3);
        assert_eq!(window.size(), 0);
        assert_eq!(window.status(1).capacity, 3);

        for i in 0..3 {
            assert!(window.append(obs(i)).is_none());
        }
        assert_eq!(window.size(), 3);

        let evicted = window.append(obs(3)).unwrap();
        assert_eq!(evicted.request_id, "req-0");
        assert_eq!(window.size(), 3);
        assert_eq!(window.snapshot().last().unwrap().request_id, "req-3");
    }

    #[test]
    fn test_snapshot_is_stable() {
        let mut window = ObservationWindow::new(4);
        window.append(obs(0));
        window.append(obs(1));

        let snapshot = window.snapshot();
        window.append(obs(2));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(window.size(), 3);
    }

    #[test]
    fn test_status() {
        let mut window = ObservationWindow::new(10);
        for i in 0..5 {
            window.append(obs(i));
        }

        let status = window.status(4);
        assert_eq!(status.current_size, 5);
        assert!(status.is_ready);
        assert_eq!(status.fill_percent, 50.0);

        assert!(!window.status(5).is_ready);
    }

    proptest! {
        #[test]
        fn prop_window_keeps_most_recent(capacity in 1usize..50, appends in 0usize..200) {
            let mut window = ObservationWindow::new(capacity);
            for i in 0..appends {
                window.append(obs(i));
                prop_assert!(window.size() <= capacity);
            }

            let expected_len = appends.min(capacity);
            prop_assert_eq!(window.size(), expected_len);

            let snapshot = window.snapshot();
            let ids: Vec<String> = snapshot.iter().map(|o| o.request_id.clone()).collect();
            let expected: Vec<String> = (appends - expected_len..appends)
                .map(|i| format!("req-{}", i))
                .collect();
            prop_assert_eq!(ids, expected);

            let timestamps: Vec<_> = snapshot.iter().map(|o| o.timestamp).collect();
            prop_assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
