use std::ffi::CStr;

use super::{FrequencyBounds, PlatformExtensions};

pub struct Platform;

fn sysctl_u64(name: &CStr) -> Option<u64> {
    let mut value: u64 = 0;
    let mut size = std::mem::size_of::<u64>();
    let ret = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            (&mut value as *mut u64).cast(),
            &mut size,
            std::ptr::null_mut(),
            0,
        )
    };
    if ret == 0 && size == std::mem::size_of::<u64>() {
        Some(value)
    } else {
        None
    }
}

impl PlatformExtensions for Platform {
    fn cpu_frequency_bounds() -> Option<FrequencyBounds> {
        // Only Intel Macs expose these; Apple silicon returns an error.
        let min = sysctl_u64(c"hw.cpufrequency_min")?;
        let max = sysctl_u64(c"hw.cpufrequency_max")?;
        Some(FrequencyBounds {
            min_mhz: min as f64 / 1_000_000.0,
            max_mhz: max as f64 / 1_000_000.0,
        })
    }
}
