use std::sync::Arc;
use std::time::Instant;

use color_eyre::eyre::Result;

use super::series::{MetricPoint, SlidingWindowSeries};
use super::snapshot::{Snapshot, TickReadings};
use crate::system::battery::{BatterySample, BatterySource};
use crate::system::cpu::{CpuReading, CpuSource};
use crate::system::disk::{DiskReading, DiskSource};
use crate::system::gpu::{Accelerator, GpuReading, GpuSource};
use crate::system::memory::{MemoryReading, MemorySource};
use crate::system::network::{NetworkReading, NetworkSource};
use crate::system::source::{MetricSource, Reading};

type Source<T> = Box<dyn MetricSource<Output = T> + Send>;

pub struct SamplerSources {
    pub cpu: Source<CpuReading>,
    pub memory: Source<MemoryReading>,
    pub disk: Source<DiskReading>,
    pub network: Source<NetworkReading>,
    pub gpu: Source<GpuReading>,
    pub battery: Source<BatterySample>,
}

impl SamplerSources {
    /// Sources backed by the running host.
    pub fn host(accelerator: Arc<Accelerator>, epoch: Instant) -> Self {
        SamplerSources {
            cpu: Box::new(CpuSource::new()),
            memory: Box::new(MemorySource::new()),
            disk: Box::new(DiskSource::new()),
            network: Box::new(NetworkSource::new()),
            gpu: Box::new(GpuSource::new(accelerator)),
            battery: Box::new(BatterySource::new(epoch)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
    Published,
}

pub struct Sampler {
    sources: SamplerSources,
    epoch: Instant,
    state: SamplerState,
    tick: u64,
    cpu: SlidingWindowSeries,
    cpu_cores: Vec<SlidingWindowSeries>,
    memory: SlidingWindowSeries,
    disk: SlidingWindowSeries,
    gpu: SlidingWindowSeries,
    bytes_sent: SlidingWindowSeries,
    bytes_received: SlidingWindowSeries,
    battery: SlidingWindowSeries,
}

/// Appends a point when the reading exists and returns the window to publish.
fn record<T>(
    series: &mut SlidingWindowSeries,
    reading: &Reading<T>,
    point: impl FnOnce(&T) -> MetricPoint,
) -> Option<SlidingWindowSeries> {
    let value = reading.value()?;
    series.append(point(value));
    Some(series.clone())
}

impl Sampler {
    pub fn new(sources: SamplerSources, capacity: usize, epoch: Instant) -> Result<Self> {
        let window = SlidingWindowSeries::new(capacity)?;
        Ok(Sampler {
            sources,
            epoch,
            state: SamplerState::Idle,
            tick: 0,
            cpu: window.empty_like(),
            cpu_cores: Vec::new(),
            memory: window.empty_like(),
            disk: window.empty_like(),
            gpu: window.empty_like(),
            bytes_sent: window.empty_like(),
            bytes_received: window.empty_like(),
            battery: window,
        })
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Returns to `Idle` once the snapshot from the last tick has been handed off.
    pub fn mark_idle(&mut self) {
        self.state = SamplerState::Idle;
    }

    /// Queries every source once and produces the snapshot for this tick.
    pub fn tick(&mut self) -> Snapshot {
        let _span = tracing::debug_span!("sampler.tick", tick = self.tick + 1).entered();
        self.state = SamplerState::Sampling;

        let readings = TickReadings {
            cpu: self.sources.cpu.sample(),
            memory: self.sources.memory.sample(),
            disk: self.sources.disk.sample(),
            network: self.sources.network.sample(),
            gpu: self.sources.gpu.sample(),
            battery: self.sources.battery.sample(),
        };
        let at = self.epoch.elapsed();
        self.tick += 1;

        let cpu = record(&mut self.cpu, &readings.cpu, |r| {
            MetricPoint::new(at, r.usage_percent)
        });
        let cpu_cores = readings.cpu.value().map(|r| self.record_cores(at, &r.per_core_percent));
        let memory = record(&mut self.memory, &readings.memory, |r| {
            MetricPoint::new(at, r.percent)
        });
        let disk = record(&mut self.disk, &readings.disk, |r| {
            MetricPoint::new(at, r.primary_percent)
        });
        let gpu = match readings.gpu.value().and_then(|r| r.primary_utilization()) {
            Some(utilization) => {
                self.gpu.append(MetricPoint::new(at, utilization));
                Some(self.gpu.clone())
            }
            None => None,
        };
        let bytes_sent = record(&mut self.bytes_sent, &readings.network, |r| {
            MetricPoint::new(at, r.bytes_sent as f64)
        });
        let bytes_received = record(&mut self.bytes_received, &readings.network, |r| {
            MetricPoint::new(at, r.bytes_received as f64)
        });
        let battery = record(&mut self.battery, &readings.battery, |r| {
            MetricPoint::new(at, r.percent)
        });

        let unavailable: Vec<&str> = [
            (!readings.cpu.is_available()).then(|| self.sources.cpu.name()),
            (!readings.memory.is_available()).then(|| self.sources.memory.name()),
            (!readings.disk.is_available()).then(|| self.sources.disk.name()),
            (!readings.network.is_available()).then(|| self.sources.network.name()),
            (!readings.gpu.is_available()).then(|| self.sources.gpu.name()),
            (!readings.battery.is_available()).then(|| self.sources.battery.name()),
        ]
        .into_iter()
        .flatten()
        .collect();
        tracing::trace!(tick = self.tick, ?unavailable, "tick sampled");

        self.state = SamplerState::Published;
        Snapshot {
            tick: self.tick,
            taken_at: at,
            cpu,
            cpu_cores,
            memory,
            disk,
            gpu,
            bytes_sent,
            bytes_received,
            battery,
            readings,
        }
    }

    /// One window per logical core, rebuilt if the core count changes.
    fn record_cores(
        &mut self,
        at: std::time::Duration,
        per_core: &[f64],
    ) -> Vec<SlidingWindowSeries> {
        if self.cpu_cores.len() != per_core.len() {
            self.cpu_cores = per_core.iter().map(|_| self.cpu.empty_like()).collect();
        }
        for (series, &value) in self.cpu_cores.iter_mut().zip(per_core) {
            series.append(MetricPoint::new(at, value));
        }
        self.cpu_cores.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct Fixed<T: Clone>(Reading<T>);

    impl<T: Clone> MetricSource for Fixed<T> {
        type Output = T;

        fn name(&self) -> &'static str {
            "fixed"
        }

        fn sample(&mut self) -> Reading<T> {
            self.0.clone()
        }
    }

    fn cpu(cores: usize) -> CpuReading {
        CpuReading {
            usage_percent: 25.0,
            per_core_percent: (0..cores).map(|c| c as f64 * 10.0).collect(),
            frequency_mhz: 2000.0,
            physical_cores: Some(cores),
            logical_cores: cores,
        }
    }

    fn memory() -> MemoryReading {
        MemoryReading {
            total_bytes: 100,
            available_bytes: 40,
            used_bytes: 60,
            percent: 60.0,
            swap_total_bytes: 0,
            swap_used_bytes: 0,
        }
    }

    fn fake_sources() -> SamplerSources {
        SamplerSources {
            cpu: Box::new(Fixed(Reading::Value(cpu(4)))),
            memory: Box::new(Fixed(Reading::Value(memory()))),
            disk: Box::new(Fixed(Reading::Unavailable)),
            network: Box::new(Fixed(Reading::Value(NetworkReading {
                bytes_sent: 10,
                bytes_received: 20,
                sent_per_sec: 0.0,
                received_per_sec: 0.0,
                interfaces: 1,
            }))),
            gpu: Box::new(Fixed(Reading::Unavailable)),
            battery: Box::new(Fixed(Reading::Unavailable)),
        }
    }

    #[test]
    fn unavailable_metrics_are_omitted() {
        let mut sampler = Sampler::new(fake_sources(), 5, Instant::now()).unwrap();
        let snapshot = sampler.tick();

        assert_eq!(snapshot.tick, 1);
        assert!(snapshot.cpu.is_some());
        assert!(snapshot.memory.is_some());
        assert!(snapshot.bytes_sent.is_some());
        assert!(snapshot.disk.is_none());
        assert!(snapshot.gpu.is_none());
        assert!(snapshot.battery.is_none());
        assert_eq!(snapshot.readings.gpu, Reading::Unavailable);
    }

    #[test]
    fn every_core_gets_a_point_each_tick() {
        let mut sampler = Sampler::new(fake_sources(), 5, Instant::now()).unwrap();
        for _ in 0..3 {
            sampler.tick();
        }
        let snapshot = sampler.tick();
        let cores = snapshot.cpu_cores.unwrap();
        assert_eq!(cores.len(), 4);
        assert!(cores.iter().all(|c| c.len() == 4));
        assert_eq!(snapshot.cpu.unwrap().len(), 4);
    }

    #[test]
    fn windows_stay_bounded_and_timestamps_monotonic() {
        let mut sampler = Sampler::new(fake_sources(), 3, Instant::now()).unwrap();
        let mut last = Duration::ZERO;
        for _ in 0..10 {
            let snapshot = sampler.tick();
            assert!(snapshot.taken_at >= last);
            last = snapshot.taken_at;
            assert!(snapshot.memory.unwrap().len() <= 3);
        }
    }

    #[test]
    fn state_machine_cycles() {
        let mut sampler = Sampler::new(fake_sources(), 3, Instant::now()).unwrap();
        assert_eq!(sampler.state(), SamplerState::Idle);
        sampler.tick();
        assert_eq!(sampler.state(), SamplerState::Published);
        sampler.mark_idle();
        assert_eq!(sampler.state(), SamplerState::Idle);
    }

    #[test]
    fn zero_capacity_fails_construction() {
        assert!(Sampler::new(fake_sources(), 0, Instant::now()).is_err());
    }
}
