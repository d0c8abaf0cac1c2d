use std::sync::Arc;

use nvml_wrapper::Nvml;
use serde::Serialize;

use super::source::{MetricSource, Reading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuDeviceStats {
    pub index: u32,
    pub name: String,
    pub utilization_percent: f64,
    pub memory_total_bytes: u64,
    pub memory_used_bytes: u64,
    pub memory_free_bytes: u64,
    pub power_milliwatts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuReading {
    pub devices: Vec<GpuDeviceStats>,
}

impl GpuReading {
    /// Utilization of the primary (index 0) device.
    pub fn primary_utilization(&self) -> Option<f64> {
        self.devices.first().map(|d| d.utilization_percent)
    }
}

/// Process-wide handle to the accelerator management library.
///
/// Initialized once; a failed initialization or a driver with zero devices
/// leaves the handle permanently absent. The library is shut down when the
/// handle is dropped, so sharing it through `Arc` releases it exactly once.
pub struct Accelerator {
    nvml: Option<Nvml>,
    device_count: u32,
}

impl Accelerator {
    pub fn acquire() -> Self {
        let nvml = match Nvml::init() {
            Ok(nvml) => nvml,
            Err(err) => {
                tracing::info!(%err, "accelerator driver unavailable, GPU metrics disabled");
                return Self::absent();
            }
        };
        match nvml.device_count() {
            Ok(count) if count > 0 => {
                tracing::info!(devices = count, "accelerator driver initialized");
                Accelerator {
                    nvml: Some(nvml),
                    device_count: count,
                }
            }
            Ok(_) => {
                tracing::info!("accelerator driver reports no devices, GPU metrics disabled");
                release(nvml);
                Self::absent()
            }
            Err(err) => {
                tracing::info!(%err, "accelerator device count failed, GPU metrics disabled");
                release(nvml);
                Self::absent()
            }
        }
    }

    pub fn absent() -> Self {
        Accelerator {
            nvml: None,
            device_count: 0,
        }
    }

    pub fn is_present(&self) -> bool {
        self.nvml.is_some()
    }

    pub fn device_count(&self) -> u32 {
        self.device_count
    }

    pub fn device_stats(&self, index: u32) -> Option<GpuDeviceStats> {
        let nvml = self.nvml.as_ref()?;
        let device = nvml.device_by_index(index).ok()?;
        let utilization = device.utilization_rates().ok()?;
        let memory = device.memory_info().ok();

        Some(GpuDeviceStats {
            index,
            name: device
                .name()
                .unwrap_or_else(|_| format!("GPU {index}")),
            utilization_percent: utilization.gpu as f64,
            memory_total_bytes: memory.as_ref().map(|m| m.total).unwrap_or(0),
            memory_used_bytes: memory.as_ref().map(|m| m.used).unwrap_or(0),
            memory_free_bytes: memory.as_ref().map(|m| m.free).unwrap_or(0),
            power_milliwatts: device.power_usage().ok(),
        })
    }

    pub fn sample(&self) -> Reading<GpuReading> {
        if !self.is_present() {
            return Reading::Unavailable;
        }
        let devices: Vec<GpuDeviceStats> = (0..self.device_count)
            .filter_map(|i| self.device_stats(i))
            .collect();
        if devices.is_empty() {
            return Reading::Unavailable;
        }
        Reading::Value(GpuReading { devices })
    }

    /// Total reported power draw across devices, `None` when nothing reports power.
    pub fn power_draw_milliwatts(&self) -> Option<u64> {
        if !self.is_present() {
            return None;
        }
        let draws: Vec<u64> = (0..self.device_count)
            .filter_map(|i| {
                let nvml = self.nvml.as_ref()?;
                nvml.device_by_index(i).ok()?.power_usage().ok()
            })
            .map(u64::from)
            .collect();
        if draws.is_empty() {
            None
        } else {
            Some(draws.iter().sum())
        }
    }
}

fn release(nvml: Nvml) {
    if let Err(err) = nvml.shutdown() {
        tracing::warn!(%err, "accelerator driver shutdown failed");
    }
}

impl Drop for Accelerator {
    fn drop(&mut self) {
        if let Some(nvml) = self.nvml.take() {
            release(nvml);
            tracing::debug!("accelerator driver released");
        }
    }
}

pub struct GpuSource {
    accelerator: Arc<Accelerator>,
}

impl GpuSource {
    pub fn new(accelerator: Arc<Accelerator>) -> Self {
        GpuSource { accelerator }
    }
}

impl MetricSource for GpuSource {
    type Output = GpuReading;

    fn name(&self) -> &'static str {
        "gpu"
    }

    fn sample(&mut self) -> Reading<GpuReading> {
        self.accelerator.sample()
    }
}
