//! Telemetry frame construction for the actuator link.

pub mod codec;
pub mod frame;

pub use frame::{TelemetryFrame, TelemetryFramer};
