use std::time::Instant;

use serde::Serialize;
use sysinfo::Networks;

use super::source::{MetricSource, Reading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkReading {
    /// Cumulative counters summed over all interfaces.
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub sent_per_sec: f64,
    pub received_per_sec: f64,
    pub interfaces: usize,
}

struct Counters {
    sent: u64,
    received: u64,
    at: Instant,
}

pub struct NetworkSource {
    networks: Networks,
    previous: Option<Counters>,
}

impl Default for NetworkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSource {
    pub fn new() -> Self {
        NetworkSource {
            networks: Networks::new_with_refreshed_list(),
            previous: None,
        }
    }
}

fn rate(current: u64, previous: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    // Counters can reset when an interface goes away.
    current.saturating_sub(previous) as f64 / elapsed_secs
}

impl MetricSource for NetworkSource {
    type Output = NetworkReading;

    fn name(&self) -> &'static str {
        "network"
    }

    fn sample(&mut self) -> Reading<NetworkReading> {
        self.networks.refresh(true);
        let now = Instant::now();

        let mut sent = 0u64;
        let mut received = 0u64;
        let mut interfaces = 0usize;
        for (_name, data) in self.networks.iter() {
            sent = sent.saturating_add(data.total_transmitted());
            received = received.saturating_add(data.total_received());
            interfaces += 1;
        }
        if interfaces == 0 {
            self.previous = None;
            return Reading::Unavailable;
        }

        let (sent_per_sec, received_per_sec) = match &self.previous {
            Some(prev) => {
                let elapsed = now.duration_since(prev.at).as_secs_f64();
                (
                    rate(sent, prev.sent, elapsed),
                    rate(received, prev.received, elapsed),
                )
            }
            None => (0.0, 0.0),
        };
        self.previous = Some(Counters {
            sent,
            received,
            at: now,
        });

        Reading::Value(NetworkReading {
            bytes_sent: sent,
            bytes_received: received,
            sent_per_sec,
            received_per_sec,
            interfaces,
        })
    }
}
