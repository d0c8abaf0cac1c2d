use std::time::Duration;

use serde::Serialize;

use super::series::SlidingWindowSeries;
use crate::system::battery::BatterySample;
use crate::system::cpu::CpuReading;
use crate::system::disk::DiskReading;
use crate::system::gpu::GpuReading;
use crate::system::memory::MemoryReading;
use crate::system::network::NetworkReading;
use crate::system::source::Reading;

/// Raw readings taken on one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReadings {
    pub cpu: Reading<CpuReading>,
    pub memory: Reading<MemoryReading>,
    pub disk: Reading<DiskReading>,
    pub network: Reading<NetworkReading>,
    pub gpu: Reading<GpuReading>,
    pub battery: Reading<BatterySample>,
}

impl TickReadings {
    pub fn unavailable() -> Self {
        TickReadings {
            cpu: Reading::Unavailable,
            memory: Reading::Unavailable,
            disk: Reading::Unavailable,
            network: Reading::Unavailable,
            gpu: Reading::Unavailable,
            battery: Reading::Unavailable,
        }
    }
}

/// Every metric window as of one sampling tick. A metric whose source was
/// unavailable on that tick is `None` rather than a stale or zero window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub taken_at: Duration,
    pub cpu: Option<SlidingWindowSeries>,
    pub cpu_cores: Option<Vec<SlidingWindowSeries>>,
    pub memory: Option<SlidingWindowSeries>,
    pub disk: Option<SlidingWindowSeries>,
    pub gpu: Option<SlidingWindowSeries>,
    pub bytes_sent: Option<SlidingWindowSeries>,
    pub bytes_received: Option<SlidingWindowSeries>,
    pub battery: Option<SlidingWindowSeries>,
    pub readings: TickReadings,
}

impl Snapshot {
    /// The state before the first tick.
    pub fn empty() -> Self {
        Snapshot {
            tick: 0,
            taken_at: Duration::ZERO,
            cpu: None,
            cpu_cores: None,
            memory: None,
            disk: None,
            gpu: None,
            bytes_sent: None,
            bytes_received: None,
            battery: None,
            readings: TickReadings::unavailable(),
        }
    }
}

pub fn latest_value(series: &Option<SlidingWindowSeries>) -> Option<f64> {
    series.as_ref().and_then(|s| s.latest()).map(|p| p.value)
}
