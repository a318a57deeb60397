//! Depth sensing devices.

pub mod mock;

use crate::core::types::DepthFrame;
use crate::error::Result;

pub use mock::{AxisEstimator, MockDepthSource, MockSourceConfig};

/// Depth sensor abstraction.
///
/// `acquire_frame` blocks until the next camera frame is available and
/// returns the point cloud together with the candidate body pixels picked
/// out by the upstream segmenter. A device error is fatal: the frame loop
/// propagates it and stops. There is no per-frame retry.
pub trait DepthSource: Send {
    /// Block for the next frame.
    fn acquire_frame(&mut self) -> Result<DepthFrame>;
}
