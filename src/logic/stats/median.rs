//! Streaming Median - Two-heap order statistic estimator
//!
//! Lower half lives in a max-heap, upper half in a min-heap. Every value in
//! `low` is <= every value in `high` and the sizes never differ by more
//! than one, so the median is always at one or both heap tops.
//!
//! Insert: O(log n). Median: O(1). There is no removal: an estimator is
//! built for one column snapshot, queried, and dropped.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

#[derive(Debug, Default, Clone)]
pub struct OrderStatisticEstimator {
    /// Lower half (max-heap)
    low: BinaryHeap<OrderedFloat<f64>>,
    /// Upper half (min-heap)
    high: BinaryHeap<Reverse<OrderedFloat<f64>>>,
}

impl OrderStatisticEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let half = capacity / 2 + 1;
        Self {
            low: BinaryHeap::with_capacity(half),
            high: BinaryHeap::with_capacity(half),
        }
    }

    pub fn len(&self) -> usize {
        self.low.len() + self.high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty() && self.high.is_empty()
    }

    pub fn insert(&mut self, value: f64) {
        let value = OrderedFloat(value);

        match self.low.peek() {
            Some(&top) if value > top => self.high.push(Reverse(value)),
            _ => self.low.push(value),
        }

        // Balance heaps
        if self.low.len() > self.high.len() + 1 {
            if let Some(moved) = self.low.pop() {
                self.high.push(Reverse(moved));
            }
        } else if self.high.len() > self.low.len() + 1 {
            if let Some(Reverse(moved)) = self.high.pop() {
                self.low.push(moved);
            }
        }
    }

    /// Current median, `None` if nothing was inserted
    pub fn median(&self) -> Option<f64> {
        let low = self.low.peek().map(|v| v.0);
        let high = self.high.peek().map(|Reverse(v)| v.0);

        match self.low.len().cmp(&self.high.len()) {
            std::cmp::Ordering::Equal => match (low, high) {
                (Some(l), Some(h)) => Some((l + h) / 2.0),
                _ => None,
            },
            std::cmp::Ordering::Greater => low,
            std::cmp::Ordering::Less => high,
        }
    }
}

impl Extend<f64> for OrderStatisticEstimator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl FromIterator<f64> for OrderStatisticEstimator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut estimator = Self::new();
        estimator.extend(iter);
        estimator
    }
}

// ============================================================================
// TESTS
// ============================================================================
