//! Platform-independent telemetry: windows, sampling, ranking views, the
//! power model and the hub that serves consumers.

pub mod battery;
pub mod engine;
pub mod hub;
pub mod notice;
pub mod power;
pub mod sampler;
pub mod series;
pub mod snapshot;
pub mod ticker;

pub use engine::Engine;
pub use hub::TelemetryHub;
