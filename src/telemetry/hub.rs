use std::sync::Arc;

use tokio::sync::watch;

use super::battery::BatteryStatus;
use super::power::PowerEstimate;
use super::snapshot::Snapshot;
use crate::system::battery::BatterySample;
use crate::system::host::HostInfo;
use crate::system::kill::{ProcessTerminator, TerminateOutcome};
use crate::system::process::{ProcessListing, ProcessView, SortKey};

/// Latest published state of every producer.
///
/// Each field is a `watch` channel holding an `Arc`: a publish swaps the whole
/// value in one step, and readers clone the `Arc` without waiting on a writer.
pub struct TelemetryHub {
    snapshot: watch::Sender<Arc<Snapshot>>,
    processes: watch::Sender<Arc<ProcessListing>>,
    power: watch::Sender<Arc<PowerEstimate>>,
    battery: watch::Sender<Option<Arc<BatteryStatus>>>,
    host: Arc<HostInfo>,
    terminator: ProcessTerminator,
    top_n: usize,
}

impl TelemetryHub {
    pub fn new(host: HostInfo, top_n: usize) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::empty()));
        let (processes, _) = watch::channel(Arc::new(ProcessListing::default()));
        let (power, _) = watch::channel(Arc::new(PowerEstimate::unmeasured()));
        let (battery, _) = watch::channel(None);
        TelemetryHub {
            snapshot,
            processes,
            power,
            battery,
            host: Arc::new(host),
            terminator: ProcessTerminator::new(),
            top_n,
        }
    }

    pub fn get_snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Woken each time a new snapshot is published.
    pub fn subscribe_snapshots(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    pub fn get_process_listing(&self) -> Arc<ProcessListing> {
        self.processes.borrow().clone()
    }

    /// The latest listing ranked by `sort_key` and cut to the configured top N.
    pub fn get_process_view(&self, sort_key: SortKey) -> ProcessView {
        self.get_process_listing().view(sort_key, self.top_n)
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Requests graceful termination of a process from the latest listing.
    ///
    /// A pid the consumer could not have seen is `NotFound` without any
    /// signal being sent. Otherwise the request runs on the caller's thread
    /// against a dedicated process table and never waits on a producer tick.
    pub fn terminate_process(&self, pid: u32) -> TerminateOutcome {
        if !self.processes.borrow().contains(pid) {
            return TerminateOutcome::NotFound { pid };
        }
        self.terminator.terminate(pid)
    }

    pub fn get_power_estimate(&self) -> Arc<PowerEstimate> {
        self.power.borrow().clone()
    }

    /// `None` on hosts without a battery, on every call.
    pub fn get_battery_sample(&self) -> Option<BatterySample> {
        self.battery.borrow().as_ref().map(|status| status.sample.clone())
    }

    pub fn get_battery_status(&self) -> Option<Arc<BatteryStatus>> {
        self.battery.borrow().clone()
    }

    pub fn get_host_info(&self) -> Arc<HostInfo> {
        Arc::clone(&self.host)
    }

    pub(crate) fn publish_snapshot(&self, snapshot: Snapshot) {
        self.snapshot.send_replace(Arc::new(snapshot));
    }

    pub(crate) fn publish_processes(&self, listing: ProcessListing) {
        self.processes.send_replace(Arc::new(listing));
    }

    pub(crate) fn publish_power(&self, estimate: PowerEstimate) {
        self.power.send_replace(Arc::new(estimate));
    }

    /// `None` clears the last status once the battery stops reporting.
    pub(crate) fn publish_battery(&self, status: Option<BatteryStatus>) {
        self.battery.send_replace(status.map(Arc::new));
    }
}
