use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub processes: ProcessesConfig,
    pub power: PowerConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub sample_interval_ms: u64,
    pub process_interval_ms: u64,
    pub power_interval_ms: u64,
    pub history_capacity: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            sample_interval_ms: 1000,
            process_interval_ms: 1000,
            power_interval_ms: 5000,
            history_capacity: 60,
        }
    }
}

impl GeneralConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn process_interval(&self) -> Duration {
        Duration::from_millis(self.process_interval_ms.max(1))
    }

    pub fn power_interval(&self) -> Duration {
        Duration::from_millis(self.power_interval_ms.max(1))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProcessesConfig {
    pub top_n: usize,
    pub default_sort: String,
}

impl Default for ProcessesConfig {
    fn default() -> Self {
        ProcessesConfig {
            top_n: 20,
            default_sort: "memory".to_string(),
        }
    }
}

/// Constants of the heuristic power model. None of these are measured.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub base_tdp_watts: f64,
    pub reference_freq_mhz: f64,
    pub ram_watts_per_percent: f64,
    pub cpu_floor_watts: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        PowerConfig {
            base_tdp_watts: 35.0,
            reference_freq_mhz: 2000.0,
            ram_watts_per_percent: 0.3,
            cpu_floor_watts: 1.0,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostpulse").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "invalid config, using defaults");
                Config::default()
            }
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "unreadable config, using defaults");
            Config::default()
        }
    }
}
