//! Heuristic power model.
//!
//! Nothing here is a measurement except the GPU term, which comes straight
//! from the accelerator driver. CPU and RAM figures are a fixed proportional
//! model and every estimate carries `estimated = true` so consumers label it.

use serde::Serialize;

use super::snapshot::Snapshot;
use crate::config::PowerConfig;
use crate::system::source::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GpuPower {
    Measured { watts: f64 },
    /// No accelerator reported a power draw. Counted as 0 in the total.
    Unmeasured,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerEstimate {
    pub cpu_watts: f64,
    pub ram_watts: f64,
    pub gpu: GpuPower,
    pub total_watts: f64,
    pub estimated: bool,
}

impl PowerEstimate {
    /// The state before any estimation has run.
    pub fn unmeasured() -> Self {
        PowerEstimate {
            cpu_watts: 0.0,
            ram_watts: 0.0,
            gpu: GpuPower::Unmeasured,
            total_watts: 0.0,
            estimated: true,
        }
    }

    pub fn gpu_watts(&self) -> f64 {
        match self.gpu {
            GpuPower::Measured { watts } => watts,
            GpuPower::Unmeasured => 0.0,
        }
    }

    pub fn gpu_measured(&self) -> bool {
        matches!(self.gpu, GpuPower::Measured { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PowerInputs {
    /// 0.0 to 1.0
    pub cpu_utilization: f64,
    pub frequency_mhz: f64,
    pub physical_cores: usize,
    pub memory_percent: f64,
    pub gpu_milliwatts: Option<u64>,
}

impl PowerInputs {
    pub fn from_snapshot(snapshot: &Snapshot, gpu_milliwatts: Option<u64>) -> Self {
        let (cpu_utilization, frequency_mhz, physical_cores) = match &snapshot.readings.cpu {
            Reading::Value(cpu) => (
                cpu.utilization_fraction(),
                cpu.frequency_mhz,
                cpu.physical_cores.unwrap_or(cpu.logical_cores),
            ),
            Reading::Unavailable => (0.0, 0.0, 0),
        };
        let memory_percent = snapshot
            .readings
            .memory
            .value()
            .map(|m| m.percent)
            .unwrap_or(0.0);

        PowerInputs {
            cpu_utilization,
            frequency_mhz,
            physical_cores,
            memory_percent,
            gpu_milliwatts,
        }
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

pub struct PowerEstimator {
    model: PowerConfig,
}

impl PowerEstimator {
    pub fn new(model: PowerConfig) -> Self {
        PowerEstimator { model }
    }

    pub fn cpu_watts(&self, inputs: &PowerInputs) -> f64 {
        let utilization = non_negative(inputs.cpu_utilization).min(1.0);
        if utilization <= 0.0 {
            return 0.0;
        }
        let freq_ratio = if self.model.reference_freq_mhz > 0.0 {
            non_negative(inputs.frequency_mhz) / self.model.reference_freq_mhz
        } else {
            1.0
        };
        let raw = non_negative(self.model.base_tdp_watts)
            * freq_ratio
            * utilization
            * inputs.physical_cores.max(1) as f64;
        non_negative(raw).max(non_negative(self.model.cpu_floor_watts))
    }

    pub fn ram_watts(&self, inputs: &PowerInputs) -> f64 {
        non_negative(inputs.memory_percent) * non_negative(self.model.ram_watts_per_percent)
    }

    pub fn estimate(&self, inputs: &PowerInputs) -> PowerEstimate {
        let _span = tracing::debug_span!("power.estimate").entered();

        let cpu_watts = self.cpu_watts(inputs);
        let ram_watts = self.ram_watts(inputs);
        let gpu = match inputs.gpu_milliwatts {
            Some(mw) => GpuPower::Measured {
                watts: mw as f64 / 1000.0,
            },
            None => GpuPower::Unmeasured,
        };
        let mut estimate = PowerEstimate {
            cpu_watts,
            ram_watts,
            gpu,
            total_watts: 0.0,
            estimated: true,
        };
        estimate.total_watts = cpu_watts + ram_watts + estimate.gpu_watts();
        estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(utilization: f64) -> PowerInputs {
        PowerInputs {
            cpu_utilization: utilization,
            frequency_mhz: 2000.0,
            physical_cores: 4,
            memory_percent: 50.0,
            gpu_milliwatts: None,
        }
    }

    #[test]
    fn cpu_term_follows_model() {
        let estimator = PowerEstimator::new(PowerConfig::default());
        // 35 W * (2000 / 2000) * 0.5 * 4 cores
        assert!((estimator.cpu_watts(&inputs(0.5)) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn active_cpu_is_floored_at_one_watt() {
        let estimator = PowerEstimator::new(PowerConfig::default());
        let mut tiny = inputs(0.0001);
        tiny.frequency_mhz = 100.0;
        assert!((estimator.cpu_watts(&tiny) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn idle_cpu_draws_nothing() {
        let estimator = PowerEstimator::new(PowerConfig::default());
        assert_eq!(estimator.cpu_watts(&inputs(0.0)), 0.0);
    }

    #[test]
    fn ram_term_is_proportional() {
        let estimator = PowerEstimator::new(PowerConfig::default());
        assert!((estimator.ram_watts(&inputs(0.0)) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn missing_accelerator_is_flagged_unmeasured() {
        let estimator = PowerEstimator::new(PowerConfig::default());
        let estimate = estimator.estimate(&inputs(0.25));
        assert_eq!(estimate.gpu, GpuPower::Unmeasured);
        assert_eq!(estimate.gpu_watts(), 0.0);
        assert!(!estimate.gpu_measured());
        assert!(estimate.estimated);
        assert!((estimate.total_watts - (estimate.cpu_watts + estimate.ram_watts)).abs() < 1e-9);
    }

    #[test]
    fn zero_draw_gpu_is_still_measured() {
        let estimator = PowerEstimator::new(PowerConfig::default());
        let mut with_gpu = inputs(0.25);
        with_gpu.gpu_milliwatts = Some(0);
        let estimate = estimator.estimate(&with_gpu);
        assert_eq!(estimate.gpu, GpuPower::Measured { watts: 0.0 });
        assert!(estimate.gpu_measured());
    }

    #[test]
    fn gpu_milliwatts_convert_to_watts() {
        let estimator = PowerEstimator::new(PowerConfig::default());
        let mut with_gpu = inputs(0.0);
        with_gpu.gpu_milliwatts = Some(45_500);
        let estimate = estimator.estimate(&with_gpu);
        assert!((estimate.gpu_watts() - 45.5).abs() < 1e-9);
        assert!((estimate.total_watts - (15.0 + 45.5)).abs() < 1e-9);
    }

    #[test]
    fn inputs_from_empty_snapshot_are_idle() {
        let inputs = PowerInputs::from_snapshot(&Snapshot::empty(), None);
        assert_eq!(inputs, PowerInputs::default());
    }
}
