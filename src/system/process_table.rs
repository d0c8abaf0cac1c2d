use std::time::Instant;

use sysinfo::{MemoryRefreshKind, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

use super::process::{ProcessListing, ProcessRecord};

pub struct ProcessTable {
    sys: System,
    epoch: Instant,
}

impl ProcessTable {
    pub fn new(epoch: Instant) -> Self {
        let mut sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        // CPU usage needs a previous measurement to diff against.
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        ProcessTable { sys, epoch }
    }

    /// Enumerates every process visible to the current user.
    ///
    /// Processes that exit between enumeration and inspection are dropped by
    /// the refresh; kernel-visible threads are not reported as processes.
    pub fn refresh(&mut self) -> ProcessListing {
        let _span = tracing::debug_span!("process_table.refresh").entered();

        self.sys.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );

        let total_memory = self.sys.total_memory();
        let mut records: Vec<ProcessRecord> = self
            .sys
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| ProcessRecord {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().to_string(),
                memory_percent: share_of(process.memory(), total_memory),
                cpu_percent: process.cpu_usage() as f64,
                status: process.status().into(),
            })
            .collect();
        // The OS table is unordered; ascending pid gives ties a stable order.
        records.sort_unstable_by_key(|r| r.pid);

        tracing::debug!(processes = records.len(), "process table refreshed");
        ProcessListing {
            refreshed_at: self.epoch.elapsed(),
            records,
        }
    }
}

fn share_of(bytes: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        bytes as f64 / total as f64 * 100.0
    }
}
