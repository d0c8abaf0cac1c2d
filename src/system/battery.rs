use std::time::{Duration, Instant};

use battery::units::time::second;
use battery::{Manager, State};
use serde::Serialize;

use super::source::{MetricSource, Reading};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "seconds", rename_all = "snake_case")]
pub enum SecondsRemaining {
    Seconds(u64),
    /// On external power; the battery is not draining.
    Unlimited,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatterySample {
    /// Offset from the owning producer's start.
    pub at: Duration,
    pub percent: f64,
    /// Actively charging.
    pub charging: bool,
    /// External power connected, including a battery held at a charge limit.
    pub plugged_in: bool,
    pub seconds_remaining: SecondsRemaining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Undetermined,
    Absent,
    Present,
}

/// Reads the first battery reported by the OS.
///
/// The first query decides presence for the life of the source: a host with
/// no battery stays `Unavailable` and is never queried again.
pub struct BatterySource {
    epoch: Instant,
    presence: Presence,
}

impl BatterySource {
    pub fn new(epoch: Instant) -> Self {
        BatterySource {
            epoch,
            presence: Presence::Undetermined,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.presence == Presence::Absent
    }

    fn read(&self) -> Option<BatterySample> {
        let manager = Manager::new().ok()?;
        let mut batteries = manager.batteries().ok()?;
        let battery = batteries.next()?.ok()?;

        let time_to_empty = battery.time_to_empty().map(|t| t.get::<second>());
        Some(build_sample(
            self.epoch.elapsed(),
            battery.state_of_charge().get::<battery::units::ratio::percent>() as f64,
            battery.state(),
            time_to_empty,
        ))
    }
}

fn build_sample(
    at: Duration,
    percent: f64,
    state: State,
    time_to_empty_secs: Option<f32>,
) -> BatterySample {
    // Unknown is reported by some firmware while on AC at a charge limit.
    let plugged_in = !matches!(state, State::Discharging | State::Empty);
    let seconds_remaining = if plugged_in {
        SecondsRemaining::Unlimited
    } else {
        match time_to_empty_secs {
            Some(secs) if secs.is_finite() && secs >= 0.0 => SecondsRemaining::Seconds(secs as u64),
            _ => SecondsRemaining::Unknown,
        }
    };
    BatterySample {
        at,
        percent: percent.clamp(0.0, 100.0),
        charging: matches!(state, State::Charging),
        plugged_in,
        seconds_remaining,
    }
}

impl MetricSource for BatterySource {
    type Output = BatterySample;

    fn name(&self) -> &'static str {
        "battery"
    }

    fn sample(&mut self) -> Reading<BatterySample> {
        if self.presence == Presence::Absent {
            return Reading::Unavailable;
        }
        let sample = self.read();
        if self.presence == Presence::Undetermined {
            self.presence = if sample.is_some() {
                Presence::Present
            } else {
                tracing::info!("no battery detected, battery metrics disabled");
                Presence::Absent
            };
        }
        sample.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugged_in_battery_has_unlimited_time() {
        let sample = build_sample(Duration::ZERO, 80.0, State::Charging, Some(100.0));
        assert!(sample.charging);
        assert!(sample.plugged_in);
        assert_eq!(sample.seconds_remaining, SecondsRemaining::Unlimited);
    }

    #[test]
    fn battery_held_at_charge_limit_counts_as_plugged_in() {
        let sample = build_sample(Duration::ZERO, 80.0, State::Unknown, None);
        assert!(!sample.charging);
        assert!(sample.plugged_in);
        assert_eq!(sample.seconds_remaining, SecondsRemaining::Unlimited);

        let full = build_sample(Duration::ZERO, 100.0, State::Full, None);
        assert!(!full.charging);
        assert!(full.plugged_in);
    }

    #[test]
    fn discharging_battery_reports_seconds_or_unknown() {
        let known = build_sample(Duration::ZERO, 50.0, State::Discharging, Some(3600.5));
        assert!(!known.charging);
        assert!(!known.plugged_in);
        assert_eq!(known.seconds_remaining, SecondsRemaining::Seconds(3600));

        let unknown = build_sample(Duration::ZERO, 50.0, State::Discharging, None);
        assert_eq!(unknown.seconds_remaining, SecondsRemaining::Unknown);
    }

    #[test]
    fn percent_is_clamped() {
        let sample = build_sample(Duration::ZERO, 104.0, State::Full, None);
        assert_eq!(sample.percent, 100.0);
    }

    #[test]
    fn absence_is_sticky() {
        let mut source = BatterySource::new(Instant::now());
        let first = source.sample();
        if !first.is_available() {
            assert!(source.is_absent());
            for _ in 0..3 {
                assert_eq!(source.sample(), Reading::Unavailable);
            }
        }
    }
}
