//! Per-frame orchestration for the tracking daemon.
//!
//! One synchronous, single-threaded loop: block on the depth source,
//! density-filter the candidate points, hand the survivors to the
//! orientation estimator, and on success pack yaw + centroid into a
//! telemetry frame for the sink. Exactly one frame is in flight at any
//! time; shutdown is only observed between frames.

use crate::config::AppConfig;
use crate::core::types::{DepthFrame, PointCloud};
use crate::devices::DepthSource;
use crate::error::{Error, Result};
use crate::filter::DensityGridFilter;
use crate::orientation::{compute_yaw, OrientationEstimator};
use crate::telemetry::frame::TelemetryFramer;
use crate::transport::FrameSink;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Interval between statistics log lines
const STATS_INTERVAL_SECS: u64 = 10;

/// What happened to a single camera frame.
///
/// Every frame starts out segmenting; it only reaches reporting when the
/// filter keeps a non-empty subset and the estimator produces an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No usable body this frame (empty retained set or no estimate);
    /// no telemetry emitted
    Segmenting,
    /// A body summary was produced and a telemetry frame handed to the sink
    Reported,
    /// A body summary was produced but a quantized field overflowed;
    /// the frame was skipped
    Skipped,
}

/// Running counters, logged periodically.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackerStats {
    /// Camera frames processed
    pub frames: u64,
    /// Telemetry frames handed to the sink
    pub reported: u64,
    /// Frames skipped because of quantization overflow
    pub skipped: u64,
    /// Frames whose codec/CRC self-check failed
    pub self_check_failures: u64,
}

/// The tracking daemon: wires source, filter, estimator, framer and sink
/// together and runs the frame loop.
pub struct TrackerApp {
    filter: DensityGridFilter,
    framer: TelemetryFramer,
    source: Box<dyn DepthSource>,
    estimator: Box<dyn OrientationEstimator>,
    sink: Box<dyn FrameSink>,
    shutdown: Arc<AtomicBool>,
    dumper: Option<PointDumper>,
    stats: TrackerStats,
}

impl TrackerApp {
    /// Assemble the pipeline from configuration and collaborators.
    pub fn new(
        config: &AppConfig,
        source: Box<dyn DepthSource>,
        estimator: Box<dyn OrientationEstimator>,
        sink: Box<dyn FrameSink>,
    ) -> Self {
        Self {
            filter: DensityGridFilter::new(config.filter),
            framer: TelemetryFramer::new(),
            source,
            estimator,
            sink,
            shutdown: Arc::new(AtomicBool::new(false)),
            dumper: config
                .debug
                .dump_points_dir
                .as_ref()
                .map(|dir| PointDumper::new(dir.clone())),
            stats: TrackerStats::default(),
        }
    }

    /// Flag that stops the loop at the next frame boundary.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Run the frame loop until shutdown is requested.
    ///
    /// A sensor acquisition failure is fatal and propagates out; everything
    /// downstream of acquisition recovers per-frame.
    pub fn run(&mut self) -> Result<()> {
        let mut last_stats = Instant::now();
        let mut frames_since = 0u64;

        while !self.shutdown.load(Ordering::Relaxed) {
            let frame = self.source.acquire_frame()?;
            self.process_frame(&frame)?;
            frames_since += 1;

            if last_stats.elapsed().as_secs() >= STATS_INTERVAL_SECS {
                let fps = frames_since as f32 / last_stats.elapsed().as_secs_f32();
                info!(
                    "tracking: {:.1} fps, frames={} reported={} skipped={} self_check_failures={}",
                    fps,
                    self.stats.frames,
                    self.stats.reported,
                    self.stats.skipped,
                    self.stats.self_check_failures
                );
                frames_since = 0;
                last_stats = Instant::now();
            }
        }

        info!("Shutdown requested, stopping frame loop");
        Ok(())
    }

    /// Process one camera frame through the full pipeline.
    pub fn process_frame(&mut self, frame: &DepthFrame) -> Result<FrameOutcome> {
        self.stats.frames += 1;

        let mask = self.filter.filter(&frame.cloud, &frame.candidates);

        if let Some(dumper) = &mut self.dumper {
            if let Err(e) = dumper.write(&frame.cloud, &frame.candidates, &mask) {
                warn!("point dump disabled: {}", e);
                self.dumper = None;
            }
        }

        let retained: Vec<usize> = frame
            .candidates
            .iter()
            .zip(&mask)
            .filter(|(_, &keep)| keep)
            .map(|(&index, _)| index)
            .collect();

        if retained.is_empty() {
            return Ok(FrameOutcome::Segmenting);
        }

        let estimate = match self.estimator.estimate(&frame.cloud, &retained) {
            Some(e) => e,
            None => return Ok(FrameOutcome::Segmenting),
        };

        let yaw = compute_yaw(estimate.direction);
        debug!(
            "body: centroid=({:.3}, {:.3}) yaw={:.1} deg confidence={:.2} retained={}",
            estimate.centroid.x,
            estimate.centroid.z,
            yaw,
            estimate.confidence,
            retained.len()
        );

        let (telemetry, ok) = match self.framer.build(yaw, estimate.centroid) {
            Ok(pair) => pair,
            Err(e @ Error::ValueOutOfRange { .. }) => {
                warn!("telemetry frame skipped: {}", e);
                self.stats.skipped += 1;
                return Ok(FrameOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };
        if !ok {
            self.stats.self_check_failures += 1;
        }

        // Fire-and-forget: a sink hiccup drops this frame, not the loop
        if let Err(e) = self.sink.send(&telemetry) {
            warn!("frame sink error (frame dropped): {}", e);
        }
        self.stats.reported += 1;

        Ok(FrameOutcome::Reported)
    }
}

/// Writes per-frame candidate dumps for offline inspection.
struct PointDumper {
    dir: PathBuf,
    frame_no: u64,
}

impl PointDumper {
    fn new(dir: PathBuf) -> Self {
        Self { dir, frame_no: 0 }
    }

    fn write(&mut self, cloud: &PointCloud, candidates: &[usize], mask: &[bool]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        self.frame_no += 1;
        let path = self.dir.join(format!("points_{}.log", self.frame_no));
        let mut out = BufWriter::new(File::create(path)?);
        for (&index, &keep) in candidates.iter().zip(mask) {
            if let Some(p) = cloud.get(index) {
                writeln!(out, "{} {} {} {}", p.x, p.y, p.z, keep as u8)?;
            }
        }
        Ok(())
    }
}
