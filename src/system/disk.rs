use serde::Serialize;
use sysinfo::Disks;

use super::source::{MetricSource, Reading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionUsage {
    pub device: String,
    pub mount_point: String,
    pub file_system: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskReading {
    pub partitions: Vec<PartitionUsage>,
    /// Usage of the root volume, or the first partition when no root is mounted.
    pub primary_percent: f64,
}

pub struct DiskSource {
    disks: Disks,
}

impl Default for DiskSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskSource {
    pub fn new() -> Self {
        DiskSource {
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

fn partition_usage(
    device: String,
    mount_point: String,
    file_system: String,
    total: u64,
    available: u64,
) -> Option<PartitionUsage> {
    // Partitions that could not be queried report no capacity.
    if total == 0 {
        return None;
    }
    let free = available.min(total);
    let used = total - free;
    Some(PartitionUsage {
        device,
        mount_point,
        file_system,
        total_bytes: total,
        used_bytes: used,
        free_bytes: free,
        percent: used as f64 / total as f64 * 100.0,
    })
}

fn is_root_mount(mount_point: &str) -> bool {
    mount_point == "/" || mount_point.eq_ignore_ascii_case("C:\\")
}

fn primary_percent(partitions: &[PartitionUsage]) -> Option<f64> {
    partitions
        .iter()
        .find(|p| is_root_mount(&p.mount_point))
        .or_else(|| partitions.first())
        .map(|p| p.percent)
}

impl MetricSource for DiskSource {
    type Output = DiskReading;

    fn name(&self) -> &'static str {
        "disk"
    }

    fn sample(&mut self) -> Reading<DiskReading> {
        self.disks.refresh(true);

        let partitions: Vec<PartitionUsage> = self
            .disks
            .list()
            .iter()
            .filter_map(|disk| {
                partition_usage(
                    disk.name().to_string_lossy().to_string(),
                    disk.mount_point().display().to_string(),
                    disk.file_system().to_string_lossy().to_string(),
                    disk.total_space(),
                    disk.available_space(),
                )
            })
            .collect();

        match primary_percent(&partitions) {
            Some(primary_percent) => Reading::Value(DiskReading {
                partitions,
                primary_percent,
            }),
            None => Reading::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(mount: &str, total: u64, available: u64) -> Option<PartitionUsage> {
        partition_usage("dev".into(), mount.into(), "ext4".into(), total, available)
    }

    #[test]
    fn zero_capacity_partition_is_skipped() {
        assert!(usage("/proc", 0, 0).is_none());
    }

    #[test]
    fn usage_splits_used_and_free() {
        let p = usage("/", 1000, 400).unwrap();
        assert_eq!(p.used_bytes, 600);
        assert_eq!(p.free_bytes, 400);
        assert!((p.percent - 60.0).abs() < 1e-9);
    }

    #[test]
    fn primary_prefers_root_mount() {
        let parts = vec![
            usage("/boot", 100, 50).unwrap(),
            usage("/", 100, 90).unwrap(),
        ];
        assert_eq!(primary_percent(&parts), Some(10.0));
    }

    #[test]
    fn primary_falls_back_to_first_partition() {
        let parts = vec![usage("/data", 100, 25).unwrap()];
        assert_eq!(primary_percent(&parts), Some(75.0));
        assert_eq!(primary_percent(&[]), None);
    }
}
