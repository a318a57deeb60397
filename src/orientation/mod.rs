//! Yaw computation and the orientation estimator seam.

use crate::core::types::{OrientationEstimate, PointCloud};

/// Horizontal magnitude below which a direction counts as degenerate
/// (body axis pointing straight up or down).
const MIN_HORIZONTAL_MAGNITUDE: f32 = 1e-5;

/// Compute the yaw angle in degrees from a body direction vector.
///
/// Yaw is rotation about the vertical axis, so only the horizontal
/// components (x, z) participate; the vertical component is ignored.
/// A near-vertical direction has no meaningful yaw and maps to 0.
pub fn compute_yaw(direction: [f32; 3]) -> f32 {
    let l = (direction[0] * direction[0] + direction[2] * direction[2]).sqrt();
    if l <= MIN_HORIZONTAL_MAGNITUDE {
        return 0.0;
    }
    // Rounding can push the ratio just past ±1; clamp so asin never
    // returns NaN into the telemetry path.
    let ratio = (direction[0] / l).clamp(-1.0, 1.0);
    ratio.asin().to_degrees()
}

/// Turns the retained candidate subset into a single centroid + direction
/// + confidence summary.
///
/// Implemented outside the tracking core (the production estimator is the
/// body segmenter's concern); `None` means no usable body this frame and
/// ends the frame without telemetry.
pub trait OrientationEstimator: Send {
    /// Estimate body pose from the retained point indices.
    fn estimate(&mut self, cloud: &PointCloud, retained: &[usize]) -> Option<OrientationEstimate>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_direction_yields_zero_yaw() {
        assert_eq!(compute_yaw([0.0, 1.0, 0.0]), 0.0);
        assert_eq!(compute_yaw([0.0, -1.0, 0.0]), 0.0);
        assert_eq!(compute_yaw([0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_tiny_horizontal_magnitude_is_degenerate() {
        assert_eq!(compute_yaw([1e-7, 1.0, 1e-7]), 0.0);
    }

    #[test]
    fn test_forward_direction_is_zero() {
        assert!(compute_yaw([0.0, 0.0, 1.0]).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_is_45_degrees() {
        let yaw = compute_yaw([1.0, 0.0, 1.0]);
        assert!((yaw - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_sideways_directions_are_90_degrees() {
        assert!((compute_yaw([1.0, 0.0, 0.0]) - 90.0).abs() < 1e-4);
        assert!((compute_yaw([-1.0, 0.0, 0.0]) + 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_vertical_component_ignored() {
        let flat = compute_yaw([0.5, 0.0, 0.5]);
        let tilted = compute_yaw([0.5, 3.0, 0.5]);
        assert!((flat - tilted).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_is_always_finite() {
        // Ratios that would leave asin's domain without the clamp
        let yaw = compute_yaw([1.000001, 0.0, 0.0]);
        assert!(yaw.is_finite());
        assert!((yaw - 90.0).abs() < 1e-3);
    }
}
