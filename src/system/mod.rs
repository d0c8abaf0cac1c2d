//! OS- and driver-facing adapters. Nothing outside this module talks to
//! sysinfo, NVML or the battery API directly.

pub mod battery;
pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod host;
pub mod kill;
pub mod memory;
pub mod network;
pub mod platform;
pub mod process;
pub mod process_table;
pub mod source;
