use serde::Serialize;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use super::source::{MetricSource, Reading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_bytes: u64,
    pub percent: f64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
}

pub struct MemorySource {
    sys: System,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource {
            sys: System::new_with_specifics(
                RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
            ),
        }
    }
}

/// Share of memory not available to new allocations.
pub fn memory_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    total.saturating_sub(available) as f64 / total as f64 * 100.0
}

impl MetricSource for MemorySource {
    type Output = MemoryReading;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn sample(&mut self) -> Reading<MemoryReading> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Reading::Unavailable;
        }
        let available = self.sys.available_memory();

        Reading::Value(MemoryReading {
            total_bytes: total,
            available_bytes: available,
            used_bytes: self.sys.used_memory(),
            percent: memory_percent(total, available),
            swap_total_bytes: self.sys.total_swap(),
            swap_used_bytes: self.sys.used_swap(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_from_available() {
        assert!((memory_percent(1000, 250) - 75.0).abs() < 1e-9);
        assert_eq!(memory_percent(0, 0), 0.0);
        assert_eq!(memory_percent(100, 200), 0.0);
    }
}
