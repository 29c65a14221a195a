//! Bounded history of the second bob's positions.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::engine::state::Point2;

/// Fixed-capacity FIFO of 2D positions; the oldest entry is evicted first.
///
/// The length never exceeds the current capacity, including right after
/// the capacity shrinks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceBuffer {
    points: VecDeque<Point2>,
    capacity: usize,
}

impl TraceBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting from the front while full.
    ///
    /// With a capacity of zero nothing is stored.
    pub fn add(&mut self, point: Point2) {
        if self.capacity == 0 {
            self.points.clear();
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Current capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity. Excess oldest entries are dropped immediately.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        let excess = self.points.len().saturating_sub(capacity);
        self.points.drain(..excess);
    }

    /// Number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Point2> {
        self.points.iter()
    }

    /// Owned snapshot, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Point2> {
        self.points.iter().copied().collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// After k > capacity adds, exactly the last `capacity` points remain.
        #[test]
        fn prop_keeps_last_capacity_points(capacity in 1usize..64, extra in 1usize..200) {
            let mut trace = TraceBuffer::new(capacity);
            let k = capacity + extra;
            for i in 0..k {
                trace.add(Point2::new(i as f64, 0.0));
            }
            prop_assert_eq!(trace.len(), capacity);
            let xs: Vec<f64> = trace.iter().map(|pt| pt.x).collect();
            let expected: Vec<f64> = (k - capacity..k).map(|i| i as f64).collect();
            prop_assert_eq!(xs, expected);
        }

        /// Length never exceeds capacity across arbitrary resizes.
        #[test]
        fn prop_len_bounded(ops in proptest::collection::vec((0usize..20, any::<bool>()), 1..100)) {
            let mut trace = TraceBuffer::new(5);
            for (value, resize) in ops {
                if resize {
                    trace.set_capacity(value);
                } else {
                    trace.add(Point2::new(value as f64, 0.0));
                }
                prop_assert!(trace.len() <= trace.capacity());
            }
        }
    }
}
