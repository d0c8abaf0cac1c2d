//! Plain-text and JSON views of the hub for the command-line consumer.

use color_eyre::eyre::Result;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::format::{format_percent, format_size, truncate_unicode};
use crate::system::host::HostInfo;
use crate::system::process::{ProcessRecord, ProcessView, SortKey};
use crate::system::source::Reading;
use crate::telemetry::TelemetryHub;
use crate::telemetry::battery::BatteryStatus;
use crate::telemetry::notice::Notice;
use crate::telemetry::power::{GpuPower, PowerEstimate};
use crate::telemetry::snapshot::{Snapshot, latest_value};

const LABEL_WIDTH: usize = 10;
const NAME_WIDTH: usize = 20;
const NOT_AVAILABLE: &str = "n/a";

/// Everything the hub serves at one instant, copied out of its handles.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub host: HostInfo,
    pub snapshot: Snapshot,
    pub processes: ProcessView,
    pub power: PowerEstimate,
    pub battery: Option<BatteryStatus>,
}

impl Report {
    pub fn collect(hub: &TelemetryHub, sort_key: SortKey) -> Self {
        Report {
            host: (*hub.get_host_info()).clone(),
            snapshot: (*hub.get_snapshot()).clone(),
            processes: hub.get_process_view(sort_key),
            power: *hub.get_power_estimate(),
            battery: hub.get_battery_status().map(|status| (*status).clone()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self, notice: Option<&Notice>) -> String {
        let snapshot = &self.snapshot;
        let host = &self.host;
        let mut lines = vec![format!(
            "{} | {} {} | {} | {}",
            host.node_name, host.system, host.version, host.machine, host.processor
        )];

        lines.push(metric_line(
            "CPU",
            latest_value(&snapshot.cpu).map(format_percent),
        ));
        lines.push(metric_line(
            "Memory",
            snapshot.readings.memory.value().map(|m| {
                format!(
                    "{} ({} / {})",
                    format_percent(m.percent),
                    format_size(m.used_bytes),
                    format_size(m.total_bytes)
                )
            }),
        ));
        lines.push(metric_line(
            "Disk",
            latest_value(&snapshot.disk).map(format_percent),
        ));
        lines.push(metric_line(
            "GPU",
            latest_value(&snapshot.gpu).map(format_percent),
        ));
        lines.push(metric_line(
            "Network",
            match &snapshot.readings.network {
                Reading::Value(n) => Some(format!(
                    "sent {} received {}",
                    format_size(n.bytes_sent),
                    format_size(n.bytes_received)
                )),
                Reading::Unavailable => None,
            },
        ));
        lines.push(metric_line(
            "Battery",
            self.battery.as_ref().map(|status| {
                let charging = if status.sample.charging { " charging" } else { "" };
                format!(
                    "{} ({:+.2}%){}",
                    format_percent(status.sample.percent),
                    status.delta_percent,
                    charging
                )
            }),
        ));
        lines.push(metric_line("Power", Some(power_summary(&self.power))));
        if let Some(notice) = notice {
            lines.push(notice.message());
        }

        let view = &self.processes;
        lines.push(format!(
            "Top {} of {} processes by {}",
            view.records.len(),
            view.total_processes,
            view.sort_key.label()
        ));
        lines.push(process_row("PID", "NAME", "MEM%", "CPU%", "STATUS"));
        lines.extend(view.records.iter().map(record_row));

        lines.join("\n")
    }
}

fn metric_line(label: &str, value: Option<String>) -> String {
    let value = value.unwrap_or_else(|| NOT_AVAILABLE.to_string());
    format!("{label:<LABEL_WIDTH$}{value}")
}

fn power_summary(power: &PowerEstimate) -> String {
    let gpu = match power.gpu {
        GpuPower::Measured { watts } => format!("{watts:.2} W"),
        GpuPower::Unmeasured => "unmeasured".to_string(),
    };
    format!(
        "{:.2} W estimated (cpu {:.2} W, ram {:.2} W, gpu {gpu})",
        power.total_watts, power.cpu_watts, power.ram_watts
    )
}

fn pad_name(name: &str) -> String {
    let mut cell = truncate_unicode(name, NAME_WIDTH);
    let fill = NAME_WIDTH.saturating_sub(cell.width());
    cell.extend(std::iter::repeat_n(' ', fill));
    cell
}

fn process_row(pid: &str, name: &str, memory: &str, cpu: &str, status: &str) -> String {
    format!(
        "{pid:>7}  {}  {memory:>8}  {cpu:>8}  {status}",
        pad_name(name)
    )
}

fn record_row(record: &ProcessRecord) -> String {
    process_row(
        &record.pid.to_string(),
        &record.name,
        &format_percent(record.memory_percent),
        &format_percent(record.cpu_percent),
        record.status.label(),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use insta::assert_snapshot;

    use super::*;
    use crate::system::battery::{BatterySample, SecondsRemaining};
    use crate::system::memory::MemoryReading;
    use crate::system::network::NetworkReading;
    use crate::system::process::{ProcessListing, ProcessStatus};
    use crate::telemetry::series::{MetricPoint, SlidingWindowSeries};

    fn window(value: f64) -> SlidingWindowSeries {
        let mut series = SlidingWindowSeries::new(4).unwrap();
        series.append(MetricPoint::new(Duration::from_secs(1), value));
        series
    }

    fn record(
        pid: u32,
        name: &str,
        memory_percent: f64,
        cpu_percent: f64,
        status: ProcessStatus,
    ) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.to_string(),
            memory_percent,
            cpu_percent,
            status,
        }
    }

    fn report() -> Report {
        let mut snapshot = Snapshot::empty();
        snapshot.cpu = Some(window(25.0));
        snapshot.memory = Some(window(60.0));
        snapshot.readings.memory = Reading::Value(MemoryReading {
            total_bytes: 100,
            available_bytes: 40,
            used_bytes: 60,
            percent: 60.0,
            swap_total_bytes: 0,
            swap_used_bytes: 0,
        });
        snapshot.readings.network = Reading::Value(NetworkReading {
            bytes_sent: 10,
            bytes_received: 20,
            sent_per_sec: 0.0,
            received_per_sec: 0.0,
            interfaces: 1,
        });

        let listing = ProcessListing {
            refreshed_at: Duration::ZERO,
            records: vec![
                record(7, "a-very-long-process-name-here", 2.25, 0.0, ProcessStatus::Sleeping),
                record(42, "postgres", 12.5, 3.0, ProcessStatus::Running),
                record(99, "idle-helper", 0.5, 0.0, ProcessStatus::Idle),
            ],
        };

        Report {
            host: HostInfo {
                system: "Linux".into(),
                node_name: "node".into(),
                release: "6.1.0".into(),
                version: "6.1".into(),
                machine: "x86_64".into(),
                processor: "cpu".into(),
                physical_cores: Some(4),
                logical_cores: 8,
                current_frequency_mhz: 2000.0,
                frequency_bounds: None,
            },
            snapshot,
            processes: listing.view(SortKey::Memory, 2),
            power: PowerEstimate {
                cpu_watts: 1.0,
                ram_watts: 18.0,
                gpu: GpuPower::Unmeasured,
                total_watts: 19.0,
                estimated: true,
            },
            battery: Some(BatteryStatus {
                sample: BatterySample {
                    at: Duration::from_secs(1),
                    percent: 80.0,
                    charging: false,
                    plugged_in: false,
                    seconds_remaining: SecondsRemaining::Seconds(3600),
                },
                delta_percent: -1.5,
                history: window(80.0),
            }),
        }
    }

    #[test]
    fn text_report_layout() {
        let text = report().render_text(Some(&Notice::TimeRemaining(3600)));
        assert_snapshot!(text, @r"
node | Linux 6.1 | x86_64 | cpu
CPU       25.00%
Memory    60.00% (60.00B / 100.00B)
Disk      n/a
GPU       n/a
Network   sent 10.00B received 20.00B
Battery   80.00% (-1.50%)
Power     19.00 W estimated (cpu 1.00 W, ram 18.00 W, gpu unmeasured)
Battery time remaining: 1h 0m 0s
Top 2 of 3 processes by Memory
    PID  NAME                      MEM%      CPU%  STATUS
     42  postgres                12.50%     3.00%  running
      7  a-very-long-process…     2.25%     0.00%  sleeping
");
    }

    #[test]
    fn json_report_labels_power_as_estimated() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["power"]["estimated"], serde_json::Value::Bool(true));
        assert_eq!(value["power"]["gpu"]["state"], "unmeasured");
        assert_eq!(value["processes"]["records"][0]["pid"], 42);
    }
}
