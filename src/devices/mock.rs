//! Simulated depth source and estimator.
//!
//! Generates frames as if a person were standing in front of the camera:
//! a dense cluster of surface points drifting slowly side to side, plus
//! scattered noise returns. This lets the whole pipeline run end-to-end
//! without camera hardware, and gives tests a deterministic source when
//! seeded.

use crate::core::types::{DepthFrame, OrientationEstimate, Point3, PointCloud};
use crate::devices::DepthSource;
use crate::error::Result;
use crate::orientation::OrientationEstimator;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::time::Duration;

/// Configuration for the simulated depth source.
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Raster width in pixels
    pub width: usize,
    /// Raster height in pixels
    pub height: usize,
    /// Surface points making up the simulated body
    pub body_points: usize,
    /// Scattered noise returns per frame
    pub noise_points: usize,
    /// Seed for reproducibility; 0 uses random entropy
    pub seed: u64,
    /// Blocking delay per acquisition (the simulated frame interval)
    pub frame_period: Duration,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            body_points: 20_000,
            noise_points: 500,
            seed: 0,
            frame_period: Duration::from_millis(33),
        }
    }
}

/// Simulated depth camera + segmenter.
pub struct MockDepthSource {
    config: MockSourceConfig,
    rng: SmallRng,
    frame_no: u64,
}

impl MockDepthSource {
    /// Create a simulated source.
    pub fn new(config: MockSourceConfig) -> Self {
        let rng = if config.seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(config.seed)
        };
        Self {
            config,
            rng,
            frame_no: 0,
        }
    }

    #[inline]
    fn gaussian(&mut self, stddev: f32) -> f32 {
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }
}

impl DepthSource for MockDepthSource {
    fn acquire_frame(&mut self) -> Result<DepthFrame> {
        if !self.config.frame_period.is_zero() {
            std::thread::sleep(self.config.frame_period);
        }

        let pixel_count = self.config.width * self.config.height;
        let body_points = self.config.body_points.min(pixel_count);
        let noise_points = self.config.noise_points.min(pixel_count - body_points);

        // Body sways slowly from side to side at ~0.8 m range
        let center_x = 0.3 * (self.frame_no as f32 * 0.05).sin();
        let center_z = 0.8;

        let mut points = vec![Point3::ZERO; pixel_count];
        let mut candidates = Vec::with_capacity(body_points + noise_points);

        // Dense body cluster; the vertical extent collapses into a handful
        // of (x, z) bins, which is what the density filter keys on
        for index in 0..body_points {
            let x = center_x + self.gaussian(0.05);
            let y = self.rng.gen_range(-0.9..0.9);
            let z = center_z + self.gaussian(0.02);
            points[index] = Point3::new(x, y, z);
            candidates.push(index);
        }

        // Sparse speckle, some of it outside the grid entirely
        for index in body_points..body_points + noise_points {
            let x = self.rng.gen_range(-1.6..1.6);
            let y = self.rng.gen_range(-1.0..1.0);
            let z = self.rng.gen_range(0.0..1.5);
            points[index] = Point3::new(x, y, z);
            candidates.push(index);
        }

        self.frame_no += 1;
        Ok(DepthFrame {
            cloud: PointCloud::from_points(points, self.config.width, self.config.height),
            candidates,
        })
    }
}

/// Principal-axis orientation estimator.
///
/// Stand-in for the production body estimator: centroid of the retained
/// points, body axis from the dominant eigenvector of the horizontal
/// (x, z) covariance, confidence from the eigenvalue ratio (1 when the
/// points form a clean line, 0 when they are isotropic).
pub struct AxisEstimator {
    min_points: usize,
}

impl AxisEstimator {
    /// Create an estimator that requires at least `min_points` retained
    /// points before producing an estimate.
    pub fn new(min_points: usize) -> Self {
        Self { min_points }
    }
}

impl Default for AxisEstimator {
    fn default() -> Self {
        Self::new(30)
    }
}

impl OrientationEstimator for AxisEstimator {
    fn estimate(&mut self, cloud: &PointCloud, retained: &[usize]) -> Option<OrientationEstimate> {
        let mut n = 0usize;
        let (mut sx, mut sy, mut sz) = (0f64, 0f64, 0f64);
        for &index in retained {
            if let Some(p) = cloud.get(index) {
                sx += p.x as f64;
                sy += p.y as f64;
                sz += p.z as f64;
                n += 1;
            }
        }
        if n < self.min_points.max(1) {
            return None;
        }

        let inv = 1.0 / n as f64;
        let centroid = Point3::new(
            (sx * inv) as f32,
            (sy * inv) as f32,
            (sz * inv) as f32,
        );

        // Horizontal-plane covariance
        let (mut cxx, mut cxz, mut czz) = (0f64, 0f64, 0f64);
        for &index in retained {
            if let Some(p) = cloud.get(index) {
                let dx = (p.x - centroid.x) as f64;
                let dz = (p.z - centroid.z) as f64;
                cxx += dx * dx;
                cxz += dx * dz;
                czz += dz * dz;
            }
        }
        cxx *= inv;
        cxz *= inv;
        czz *= inv;

        // Closed-form eigen decomposition of the symmetric 2x2 matrix
        let trace = cxx + czz;
        let det = cxx * czz - cxz * cxz;
        let disc = ((trace * trace) / 4.0 - det).max(0.0).sqrt();
        let l1 = trace / 2.0 + disc;
        let l2 = trace / 2.0 - disc;

        let (dx, dz) = if cxz.abs() > 1e-12 {
            (l1 - czz, cxz)
        } else if cxx >= czz {
            (1.0, 0.0)
        } else {
            (0.0, 1.0)
        };
        let len = (dx * dx + dz * dz).sqrt();
        if len <= 1e-12 {
            return None;
        }

        let confidence = if l1 > 0.0 {
            (1.0 - (l2 / l1).max(0.0)).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };

        Some(OrientationEstimate {
            centroid,
            direction: [(dx / len) as f32, 0.0, (dz / len) as f32],
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DensityGridFilter, FilterConfig};

    fn test_config() -> MockSourceConfig {
        MockSourceConfig {
            seed: 42,
            frame_period: Duration::ZERO,
            ..MockSourceConfig::default()
        }
    }

    #[test]
    fn test_seeded_source_is_deterministic() {
        let mut a = MockDepthSource::new(test_config());
        let mut b = MockDepthSource::new(test_config());

        let fa = a.acquire_frame().unwrap();
        let fb = b.acquire_frame().unwrap();
        assert_eq!(fa.candidates, fb.candidates);
        assert_eq!(fa.cloud.points(), fb.cloud.points());
    }

    #[test]
    fn test_candidates_are_distinct_and_in_bounds() {
        let mut source = MockDepthSource::new(test_config());
        let frame = source.acquire_frame().unwrap();

        let mut seen = frame.candidates.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), frame.candidates.len());
        assert!(frame.candidates.iter().all(|&i| i < frame.cloud.len()));
    }

    #[test]
    fn test_simulated_body_survives_density_filter() {
        let mut source = MockDepthSource::new(test_config());
        let filter = DensityGridFilter::new(FilterConfig::default());

        let frame = source.acquire_frame().unwrap();
        let mask = filter.filter(&frame.cloud, &frame.candidates);
        let retained = mask.iter().filter(|&&b| b).count();

        // The dense cluster should mostly pass; speckle should not bring
        // retention anywhere near the full candidate count
        assert!(retained > 1_000, "only {retained} points retained");
        assert!(retained < frame.candidates.len());
    }

    #[test]
    fn test_axis_estimator_finds_line_direction() {
        // Points along the X axis at fixed range
        let points: Vec<Point3> = (0..200)
            .map(|i| Point3::new(0.3 + 0.002 * i as f32, 0.1, 0.8))
            .collect();
        let n = points.len();
        let cloud = PointCloud::from_points(points, n, 1);
        let retained: Vec<usize> = (0..n).collect();

        let mut estimator = AxisEstimator::default();
        let estimate = estimator.estimate(&cloud, &retained).unwrap();

        assert!(estimate.direction[0].abs() > 0.99);
        assert!(estimate.direction[2].abs() < 0.1);
        assert!(estimate.confidence > 0.9);
        assert!((estimate.centroid.z - 0.8).abs() < 1e-3);
    }

    #[test]
    fn test_axis_estimator_needs_enough_points() {
        let cloud = PointCloud::from_points(vec![Point3::new(0.0, 0.0, 0.8); 10], 10, 1);
        let mut estimator = AxisEstimator::new(30);
        assert!(estimator.estimate(&cloud, &[0, 1, 2]).is_none());
    }

    #[test]
    fn test_axis_estimator_confidence_in_unit_range() {
        let mut source = MockDepthSource::new(test_config());
        let frame = source.acquire_frame().unwrap();
        let mut estimator = AxisEstimator::default();

        if let Some(estimate) = estimator.estimate(&frame.cloud, &frame.candidates) {
            assert!((0.0..=1.0).contains(&estimate.confidence));
        }
    }
}
