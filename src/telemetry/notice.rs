//! One-line battery notices for consumers.
//!
//! "Shown once" notices are tracked in a `NoticeState` the consumer owns, so
//! two consumers of the same hub each get their own session.

use crate::format::format_duration_hms;
use crate::system::battery::{BatterySample, SecondsRemaining};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NoticeState {
    no_battery_shown: bool,
    adapter_shown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoBattery,
    AdapterConnected,
    TimeRemaining(u64),
    TimeCalculating,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::NoBattery => "No battery detected".to_string(),
            Notice::AdapterConnected => "Power adapter connected".to_string(),
            Notice::TimeRemaining(secs) => {
                format!("Battery time remaining: {}", format_duration_hms(*secs))
            }
            Notice::TimeCalculating => "Battery time remaining: calculating".to_string(),
        }
    }
}

pub fn battery_notice(sample: Option<&BatterySample>, state: &mut NoticeState) -> Option<Notice> {
    let Some(sample) = sample else {
        if state.no_battery_shown {
            return None;
        }
        state.no_battery_shown = true;
        return Some(Notice::NoBattery);
    };

    if sample.plugged_in {
        if state.adapter_shown {
            return None;
        }
        state.adapter_shown = true;
        return Some(Notice::AdapterConnected);
    }

    // unplugging re-arms the adapter notice
    state.adapter_shown = false;
    match sample.seconds_remaining {
        SecondsRemaining::Seconds(secs) => Some(Notice::TimeRemaining(secs)),
        SecondsRemaining::Unlimited | SecondsRemaining::Unknown => Some(Notice::TimeCalculating),
    }
}
