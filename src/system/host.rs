use serde::Serialize;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use super::platform::{self, FrequencyBounds};

/// Static description of the host, gathered once at engine start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostInfo {
    pub system: String,
    pub node_name: String,
    pub release: String,
    pub version: String,
    pub machine: String,
    pub processor: String,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub current_frequency_mhz: f64,
    pub frequency_bounds: Option<FrequencyBounds>,
}

const UNKNOWN: &str = "unknown";

impl HostInfo {
    pub fn collect() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()),
        );
        let cpus = sys.cpus();
        let processor = cpus
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let current_frequency_mhz = cpus.first().map(|c| c.frequency() as f64).unwrap_or(0.0);

        HostInfo {
            system: System::name().unwrap_or_else(|| UNKNOWN.to_string()),
            node_name: System::host_name().unwrap_or_else(|| UNKNOWN.to_string()),
            release: System::kernel_version().unwrap_or_else(|| UNKNOWN.to_string()),
            version: System::os_version().unwrap_or_else(|| UNKNOWN.to_string()),
            machine: std::env::consts::ARCH.to_string(),
            processor,
            physical_cores: System::physical_core_count(),
            logical_cores: cpus.len(),
            current_frequency_mhz,
            frequency_bounds: platform::cpu_frequency_bounds(),
        }
    }
}
