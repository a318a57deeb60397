//! Outbound transport for finished telemetry frames.

use crate::error::Result;
use crate::telemetry::frame::TelemetryFrame;
use std::sync::{Arc, Mutex};

/// Sink for finished telemetry frames.
///
/// Sending is fire-and-forget from the tracker's perspective: the frame
/// loop logs sink errors and keeps going. The real actuator link (serial,
/// radio) lives outside this crate.
pub trait FrameSink: Send {
    /// Hand one frame to the link.
    fn send(&mut self, frame: &TelemetryFrame) -> Result<()>;
}

/// Sink that hex-dumps each frame to the log.
///
/// Stands in for the actuator link during bring-up and simulation runs.
pub struct LogSink;

impl FrameSink for LogSink {
    fn send(&mut self, frame: &TelemetryFrame) -> Result<()> {
        if log::log_enabled!(log::Level::Debug) {
            let hex: String = frame
                .as_bytes()
                .iter()
                .map(|b| format!("{:02X} ", b))
                .collect();
            log::debug!(
                "frame out: {} (yaw={} x={} z={})",
                hex.trim_end(),
                frame.yaw_decidegrees(),
                frame.centroid_x_mm(),
                frame.centroid_z_mm()
            );
        }
        Ok(())
    }
}

/// Sink that records every frame, for tests.
#[derive(Clone, Default)]
pub struct MockSink {
    inner: Arc<Mutex<Vec<TelemetryFrame>>>,
}

impl MockSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All frames sent so far
    pub fn sent(&self) -> Vec<TelemetryFrame> {
        self.inner.lock().unwrap().clone()
    }

    /// Number of frames sent so far
    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

impl FrameSink for MockSink {
    fn send(&mut self, frame: &TelemetryFrame) -> Result<()> {
        self.inner.lock().unwrap().push(*frame);
        Ok(())
    }
}
