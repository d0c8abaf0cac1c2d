use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

/// Runs `tick` every `period` until `shutdown` flips to `true` or its sender
/// is dropped. The first tick fires one period after start.
///
/// Ticks missed under load are skipped rather than replayed in a burst.
pub async fn run_periodic<F>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) where
    F: FnMut() + Send,
{
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::debug!(producer = name, ?period, "producer started");

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = interval.tick() => tick(),
        }
    }

    tracing::debug!(producer = name, "producer stopped");
}
