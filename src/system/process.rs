use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_TOP_N: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Idle,
    DiskSleep,
    Stopped,
    Zombie,
    Dead,
    Other,
}

impl ProcessStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::Idle => "idle",
            ProcessStatus::DiskSleep => "disk-sleep",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Dead => "dead",
            ProcessStatus::Other => "other",
        }
    }
}

impl From<sysinfo::ProcessStatus> for ProcessStatus {
    fn from(status: sysinfo::ProcessStatus) -> Self {
        match status {
            sysinfo::ProcessStatus::Run => ProcessStatus::Running,
            sysinfo::ProcessStatus::Sleep => ProcessStatus::Sleeping,
            sysinfo::ProcessStatus::Idle => ProcessStatus::Idle,
            sysinfo::ProcessStatus::UninterruptibleDiskSleep => ProcessStatus::DiskSleep,
            sysinfo::ProcessStatus::Stop => ProcessStatus::Stopped,
            sysinfo::ProcessStatus::Zombie => ProcessStatus::Zombie,
            sysinfo::ProcessStatus::Dead => ProcessStatus::Dead,
            _ => ProcessStatus::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub memory_percent: f64,
    pub cpu_percent: f64,
    pub status: ProcessStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Memory,
    Cpu,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Memory => "Memory",
            SortKey::Cpu => "CPU",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cpu" => SortKey::Cpu,
            _ => SortKey::Memory,
        }
    }

    fn value(self, record: &ProcessRecord) -> f64 {
        match self {
            SortKey::Memory => record.memory_percent,
            SortKey::Cpu => record.cpu_percent,
        }
    }
}

/// Every visible process from one enumeration, in enumeration order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProcessListing {
    pub refreshed_at: Duration,
    pub records: Vec<ProcessRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessView {
    pub sort_key: SortKey,
    pub total_processes: usize,
    pub records: Vec<ProcessRecord>,
}

/// Full descending sort by `key`, then truncation to `top_n`.
///
/// The sort is stable, so ties keep enumeration order.
pub fn rank_processes(
    records: &[ProcessRecord],
    key: SortKey,
    top_n: usize,
) -> Vec<ProcessRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| key.value(b).total_cmp(&key.value(a)));
    ranked.truncate(top_n);
    ranked
}

impl ProcessListing {
    pub fn view(&self, key: SortKey, top_n: usize) -> ProcessView {
        ProcessView {
            sort_key: key,
            total_processes: self.records.len(),
            records: rank_processes(&self.records, key, top_n),
        }
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.records.iter().any(|r| r.pid == pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: u32, memory: f64, cpu: f64) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: format!("proc_{pid}"),
            memory_percent: memory,
            cpu_percent: cpu,
            status: ProcessStatus::Running,
        }
    }

    #[test]
    fn rank_by_cpu_descending() {
        let records = vec![record(1, 50.0, 5.0), record(2, 10.0, 90.0), record(3, 30.0, 50.0)];
        let pids: Vec<u32> = rank_processes(&records, SortKey::Cpu, 20)
            .iter()
            .map(|r| r.pid)
            .collect();
        assert_eq!(pids, vec![2, 3, 1]);
    }

    #[test]
    fn ties_keep_enumeration_order() {
        let records = vec![record(7, 1.0, 0.0), record(3, 2.0, 0.0), record(5, 1.0, 0.0)];
        let pids: Vec<u32> = rank_processes(&records, SortKey::Memory, 20)
            .iter()
            .map(|r| r.pid)
            .collect();
        assert_eq!(pids, vec![3, 7, 5]);
    }

    #[test]
    fn sort_key_from_config_defaults_to_memory() {
        assert_eq!(SortKey::from_str_config("CPU"), SortKey::Cpu);
        assert_eq!(SortKey::from_str_config("memory"), SortKey::Memory);
        assert_eq!(SortKey::from_str_config("bogus"), SortKey::Memory);
    }

    #[test]
    fn view_reports_total_before_truncation() {
        let listing = ProcessListing {
            refreshed_at: Duration::ZERO,
            records: (0..30).map(|i| record(i, i as f64, 0.0)).collect(),
        };
        let view = listing.view(SortKey::Memory, 5);
        assert_eq!(view.total_processes, 30);
        assert_eq!(view.records.len(), 5);
        assert_eq!(view.records[0].pid, 29);
        assert!(listing.contains(12));
        assert!(!listing.contains(99));
    }
}
