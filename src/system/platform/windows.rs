use super::{FrequencyBounds, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_frequency_bounds() -> Option<FrequencyBounds> {
        // Not exposed without WMI; sysinfo still reports the current frequency.
        None
    }
}
