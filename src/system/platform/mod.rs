use serde::Serialize;

/// Hardware frequency limits of the first CPU, in MHz.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrequencyBounds {
    pub min_mhz: f64,
    pub max_mhz: f64,
}

pub trait PlatformExtensions {
    fn cpu_frequency_bounds() -> Option<FrequencyBounds>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
pub fn cpu_frequency_bounds() -> Option<FrequencyBounds> {
    platform_impl::Platform::cpu_frequency_bounds()
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn cpu_frequency_bounds() -> Option<FrequencyBounds> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_ordered_when_present() {
        if let Some(bounds) = cpu_frequency_bounds() {
            assert!(bounds.min_mhz <= bounds.max_mhz);
        }
    }
}
