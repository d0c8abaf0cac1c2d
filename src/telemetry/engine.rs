use std::sync::Arc;
use std::time::Instant;

use color_eyre::eyre::{Result, eyre};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::battery::BatteryTracker;
use super::hub::TelemetryHub;
use super::power::{PowerEstimator, PowerInputs};
use super::sampler::{Sampler, SamplerSources};
use super::series::SlidingWindowSeries;
use super::ticker::run_periodic;
use crate::config::Config;
use crate::system::gpu::Accelerator;
use crate::system::host::HostInfo;
use crate::system::process_table::ProcessTable;

/// Power and battery work done on each power tick.
struct PowerTick {
    hub: Arc<TelemetryHub>,
    accelerator: Arc<Accelerator>,
    estimator: PowerEstimator,
    battery: BatteryTracker,
}

impl PowerTick {
    fn run(&mut self) {
        let snapshot = self.hub.get_snapshot();
        let gpu_milliwatts = self.accelerator.power_draw_milliwatts();
        let inputs = PowerInputs::from_snapshot(&snapshot, gpu_milliwatts);
        let estimate = self.estimator.estimate(&inputs);
        tracing::debug!(total_watts = estimate.total_watts, "power estimated");
        self.hub.publish_power(estimate);

        let status = match snapshot.readings.battery.value() {
            Some(sample) => Some(self.battery.record(sample.clone())),
            None => {
                self.battery.reset();
                None
            }
        };
        self.hub.publish_battery(status);
    }
}

/// Owns the producer tasks and the hub they publish into.
///
/// Every producer runs once synchronously in [`Engine::start`], so the hub is
/// populated before the first consumer read.
pub struct Engine {
    hub: Arc<TelemetryHub>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Must be called from within a Tokio runtime.
    pub fn start(config: &Config) -> Result<Engine> {
        let general = &config.general;
        if general.history_capacity == 0 {
            return Err(eyre!("history_capacity must be greater than 0"));
        }
        let epoch = Instant::now();

        let accelerator = Arc::new(Accelerator::acquire());
        let hub = Arc::new(TelemetryHub::new(
            HostInfo::collect(),
            config.processes.top_n,
        ));

        let mut sampler = Sampler::new(
            SamplerSources::host(Arc::clone(&accelerator), epoch),
            general.history_capacity,
            epoch,
        )?;
        let mut table = ProcessTable::new(epoch);
        let mut power = PowerTick {
            hub: Arc::clone(&hub),
            accelerator,
            estimator: PowerEstimator::new(config.power),
            battery: BatteryTracker::new(SlidingWindowSeries::new(general.history_capacity)?),
        };

        hub.publish_snapshot(sampler.tick());
        sampler.mark_idle();
        hub.publish_processes(table.refresh());
        power.run();

        let (shutdown, _) = watch::channel(false);
        let mut tasks = Vec::with_capacity(3);

        let sampler_hub = Arc::clone(&hub);
        tasks.push(tokio::spawn(run_periodic(
            "sampler",
            general.sample_interval(),
            shutdown.subscribe(),
            move || {
                sampler_hub.publish_snapshot(sampler.tick());
                sampler.mark_idle();
            },
        )));

        let table_hub = Arc::clone(&hub);
        tasks.push(tokio::spawn(run_periodic(
            "process_table",
            general.process_interval(),
            shutdown.subscribe(),
            move || table_hub.publish_processes(table.refresh()),
        )));

        tasks.push(tokio::spawn(run_periodic(
            "power",
            general.power_interval(),
            shutdown.subscribe(),
            move || power.run(),
        )));

        tracing::info!(
            sample_interval = ?general.sample_interval(),
            process_interval = ?general.process_interval(),
            power_interval = ?general.power_interval(),
            capacity = general.history_capacity,
            "telemetry engine started"
        );
        Ok(Engine {
            hub,
            shutdown,
            tasks,
        })
    }

    pub fn hub(&self) -> Arc<TelemetryHub> {
        Arc::clone(&self.hub)
    }

    /// Signals every producer and waits for all of them to exit. The
    /// accelerator handle is released once the last producer is gone.
    pub async fn shutdown(mut self) {
        self.shutdown.send_replace(true);
        for task in std::mem::take(&mut self.tasks) {
            if let Err(err) = task.await {
                tracing::warn!(%err, "producer task ended abnormally");
            }
        }
        tracing::info!("telemetry engine stopped");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Producers exit on their next loop iteration.
        self.shutdown.send_replace(true);
    }
}
