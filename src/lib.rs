//! DehaTrack - body orientation tracking and telemetry core
//!
//! Once per depth-camera frame the pipeline:
//!
//! 1. pulls a point cloud plus candidate body pixels from the depth source,
//! 2. drops transient noise with a density grid filter over the (x, z) plane,
//! 3. summarizes the surviving points into a centroid and yaw angle,
//! 4. packs the summary into a checksummed 10-byte frame for the actuator
//!    link.
//!
//! The depth camera driver, the production body estimator and the physical
//! actuator link are external collaborators behind the [`devices::DepthSource`],
//! [`orientation::OrientationEstimator`] and [`transport::FrameSink`] traits;
//! this crate ships simulated implementations so the daemon runs end-to-end
//! without hardware.

pub mod app;
pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod filter;
pub mod orientation;
pub mod telemetry;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
