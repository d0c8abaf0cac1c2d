use super::{FrequencyBounds, PlatformExtensions};

pub struct Platform;

const CPUFREQ_DIR: &str = "/sys/devices/system/cpu/cpu0/cpufreq";

fn read_khz(file: &str) -> Option<f64> {
    let contents = std::fs::read_to_string(format!("{CPUFREQ_DIR}/{file}")).ok()?;
    contents.trim().parse::<f64>().ok()
}

impl PlatformExtensions for Platform {
    fn cpu_frequency_bounds() -> Option<FrequencyBounds> {
        // cpufreq reports kHz
        let min = read_khz("cpuinfo_min_freq")?;
        let max = read_khz("cpuinfo_max_freq")?;
        Some(FrequencyBounds {
            min_mhz: min / 1000.0,
            max_mhz: max / 1000.0,
        })
    }
}
