use serde::Serialize;

use super::series::{MetricPoint, SlidingWindowSeries};
use crate::system::battery::BatterySample;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryStatus {
    pub sample: BatterySample,
    /// Change in charge since the previous sample, 0 on the first one.
    pub delta_percent: f64,
    pub history: SlidingWindowSeries,
}

/// Follows battery charge across power ticks.
pub struct BatteryTracker {
    previous: Option<f64>,
    history: SlidingWindowSeries,
}

impl BatteryTracker {
    pub fn new(history: SlidingWindowSeries) -> Self {
        BatteryTracker {
            previous: None,
            history,
        }
    }

    pub fn record(&mut self, sample: BatterySample) -> BatteryStatus {
        let delta_percent = self
            .previous
            .map(|previous| sample.percent - previous)
            .unwrap_or(0.0);
        self.previous = Some(sample.percent);
        self.history.append(MetricPoint::new(sample.at, sample.percent));

        BatteryStatus {
            sample,
            delta_percent,
            history: self.history.clone(),
        }
    }

    /// Forgets the last charge so a returning battery starts at delta 0.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
