use std::collections::VecDeque;
use std::time::Duration;

use color_eyre::eyre::{Result, eyre};
use serde::Serialize;

pub const DEFAULT_CAPACITY: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricPoint {
    /// Monotonic offset from the sampler's start.
    pub at: Duration,
    pub value: f64,
}

impl MetricPoint {
    pub fn new(at: Duration, value: f64) -> Self {
        MetricPoint { at, value }
    }
}

/// Fixed-capacity FIFO window of samples. The backing buffer is allocated
/// once at construction and never grows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlidingWindowSeries {
    points: VecDeque<MetricPoint>,
    capacity: usize,
}

impl SlidingWindowSeries {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(eyre!("sliding window capacity must be greater than 0"));
        }
        Ok(Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// A new, empty window with the same capacity.
    pub fn empty_like(&self) -> Self {
        Self {
            points: VecDeque::with_capacity(self.capacity),
            capacity: self.capacity,
        }
    }

    pub fn append(&mut self, point: MetricPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn latest(&self) -> Option<MetricPoint> {
        self.points.back().copied()
    }

    /// Oldest first.
    pub fn values(&self) -> Vec<MetricPoint> {
        self.points.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: u64) -> MetricPoint {
        MetricPoint::new(Duration::from_secs(i), i as f64)
    }

    #[test]
    fn append_and_latest() {
        let mut series = SlidingWindowSeries::new(60).unwrap();
        assert!(series.latest().is_none());
        series.append(point(1));
        series.append(point(2));
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest(), Some(point(2)));
    }

    #[test]
    fn ring_buffer_caps_at_capacity() {
        let mut series = SlidingWindowSeries::new(5).unwrap();
        for i in 0..10 {
            series.append(point(i));
        }
        let values = series.values();
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], point(5));
        assert_eq!(values[4], point(9));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(SlidingWindowSeries::new(0).is_err());
    }
}
