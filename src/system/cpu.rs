use serde::Serialize;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use super::source::{MetricSource, Reading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuReading {
    pub usage_percent: f64,
    /// One entry per logical core, in OS order.
    pub per_core_percent: Vec<f64>,
    pub frequency_mhz: f64,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
}

impl CpuReading {
    pub fn utilization_fraction(&self) -> f64 {
        (self.usage_percent / 100.0).clamp(0.0, 1.0)
    }
}

pub struct CpuSource {
    sys: System,
    physical_cores: Option<usize>,
}

impl Default for CpuSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSource {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()),
        );
        CpuSource {
            sys,
            physical_cores: System::physical_core_count(),
        }
    }
}

impl MetricSource for CpuSource {
    type Output = CpuReading;

    fn name(&self) -> &'static str {
        "cpu"
    }

    fn sample(&mut self) -> Reading<CpuReading> {
        self.sys.refresh_cpu_all();
        let cpus = self.sys.cpus();
        if cpus.is_empty() {
            return Reading::Unavailable;
        }

        let per_core_percent: Vec<f64> = cpus.iter().map(|c| c.cpu_usage() as f64).collect();
        let frequency_mhz =
            cpus.iter().map(|c| c.frequency() as f64).sum::<f64>() / cpus.len() as f64;

        Reading::Value(CpuReading {
            usage_percent: self.sys.global_cpu_usage() as f64,
            logical_cores: per_core_percent.len(),
            per_core_percent,
            frequency_mhz,
            physical_cores: self.physical_cores,
        })
    }
}
