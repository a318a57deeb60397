//! Density-based spatial filter over a fixed occupancy grid.
//!
//! Candidate body points are binned into a 2-D histogram over the
//! horizontal (x, z) plane, each bin is smoothed over its 8-neighborhood,
//! and a point survives only if its smoothed occupancy clears a threshold.
//! Single-frame spatial density is a cheap stand-in for temporal
//! consistency: isolated sensor returns land in sparse bins and are
//! dropped, while real surfaces stack hundreds of pixels into the same
//! 3 cm column.
//!
//! The grid is rebuilt from scratch on every invocation; there is no
//! cross-frame state.

use crate::core::types::PointCloud;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Neighbor offsets: the four axis-aligned cells first, then the diagonals.
const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, 0),
    (0, -1),
    (1, 0),
    (0, 1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Configuration for the density grid filter.
///
/// Defaults cover a person-scale target at short range: X in [-1.5, 1.5] m,
/// Z in [0, 1.5] m at 3 cm bins (a 100 x 50 grid), keeping points whose
/// smoothed bin occupancy reaches 500.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Lower X bound of the grid in meters
    pub x_min: f32,
    /// Upper X bound of the grid in meters
    pub x_max: f32,
    /// Lower Z bound of the grid in meters
    pub z_min: f32,
    /// Upper Z bound of the grid in meters
    pub z_max: f32,
    /// Bin edge length in meters
    pub resolution: f32,
    /// Minimum smoothed occupancy for a point to be retained
    pub density_threshold: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            x_min: -1.5,
            x_max: 1.5,
            z_min: 0.0,
            z_max: 1.5,
            resolution: 0.03,
            density_threshold: 500,
        }
    }
}

impl FilterConfig {
    /// Number of grid columns (X axis)
    #[inline]
    pub fn cols(&self) -> usize {
        (((self.x_max - self.x_min) / self.resolution).round()).max(1.0) as usize
    }

    /// Number of grid rows (Z axis)
    #[inline]
    pub fn rows(&self) -> usize {
        (((self.z_max - self.z_min) / self.resolution).round()).max(1.0) as usize
    }

    /// Validate grid geometry.
    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "filter resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.x_max <= self.x_min || self.z_max <= self.z_min {
            return Err(Error::InvalidConfig(format!(
                "filter extents must be non-empty: x [{}, {}], z [{}, {}]",
                self.x_min, self.x_max, self.z_min, self.z_max
            )));
        }
        // Guard against a typo'd resolution allocating gigabytes
        const MAX_CELLS: usize = 4_000_000;
        if self.cols().saturating_mul(self.rows()) > MAX_CELLS {
            return Err(Error::InvalidConfig(format!(
                "filter grid too large: {} x {} cells",
                self.cols(),
                self.rows()
            )));
        }
        Ok(())
    }
}

/// Per-invocation classification counters, logged at debug level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    /// Candidates that survived the density threshold
    pub retained: usize,
    /// Candidates outside the grid rectangle (or with invalid indices)
    pub out_of_range: usize,
    /// Candidates whose smoothed density was zero
    pub zero_density: usize,
    /// Candidates classified but below the threshold
    pub below_threshold: usize,
}

/// Occupancy-grid density filter.
///
/// `filter` maps each candidate point to a bin, counts bin occupancy,
/// smooths counts over occupied neighbors and thresholds the result. It
/// never fails: points that cannot be mapped (outside the grid, invalid
/// cloud index, non-finite coordinates) simply stay unretained.
#[derive(Debug, Clone)]
pub struct DensityGridFilter {
    config: FilterConfig,
    cols: usize,
    rows: usize,
}

impl DensityGridFilter {
    /// Create a filter for the given grid geometry.
    pub fn new(config: FilterConfig) -> Self {
        let cols = config.cols();
        let rows = config.rows();
        Self { config, cols, rows }
    }

    /// The filter's configuration
    #[inline]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Map world (x, z) to grid coordinates, or None when outside the grid
    /// or not finite.
    fn bin(&self, x: f32, z: f32) -> Option<(usize, usize)> {
        if !x.is_finite() || !z.is_finite() {
            return None;
        }
        let mx = ((x - self.config.x_min) / self.config.resolution).floor();
        let mz = ((z - self.config.z_min) / self.config.resolution).floor();
        if mx < 0.0 || mz < 0.0 {
            return None;
        }
        let (mx, mz) = (mx as usize, mz as usize);
        if mx >= self.cols || mz >= self.rows {
            return None;
        }
        Some((mx, mz))
    }

    /// Flat index for grid cell (mx, mz). Row-major over Z.
    #[inline]
    fn index(&self, mx: usize, mz: usize) -> usize {
        mz * self.cols + mx
    }

    /// Unweighted integer mean of a bin and its occupied 8-neighbors.
    ///
    /// An empty bin smooths to zero without looking at neighbors; edge and
    /// corner bins naturally average over fewer cells.
    fn smoothed_density(&self, counts: &[u32], mx: usize, mz: usize) -> u32 {
        let own = counts[self.index(mx, mz)];
        if own == 0 {
            return 0;
        }
        let mut total = own as u64;
        let mut cells = 1u64;
        for (dx, dz) in NEIGHBORS_8 {
            let nx = mx as i64 + dx;
            let nz = mz as i64 + dz;
            if nx < 0 || nz < 0 || nx >= self.cols as i64 || nz >= self.rows as i64 {
                continue;
            }
            let count = counts[self.index(nx as usize, nz as usize)];
            if count == 0 {
                continue;
            }
            total += count as u64;
            cells += 1;
        }
        (total / cells) as u32
    }

    /// Classify each candidate point as retained or discarded.
    ///
    /// Returns one boolean per candidate, in candidate order. The grid is
    /// frame-scoped: allocated zeroed here and dropped on return.
    pub fn filter(&self, cloud: &PointCloud, candidates: &[usize]) -> Vec<bool> {
        let mut counts = vec![0u32; self.cols * self.rows];
        let mut mask = vec![false; candidates.len()];

        // Pass 1: bin occupancy
        for &index in candidates {
            let point = match cloud.get(index) {
                Some(p) => *p,
                None => continue,
            };
            if let Some((mx, mz)) = self.bin(point.x, point.z) {
                counts[self.index(mx, mz)] += 1;
            }
        }

        // Pass 2: smooth and decide
        let mut stats = FilterStats::default();
        for (i, &index) in candidates.iter().enumerate() {
            let point = match cloud.get(index) {
                Some(p) => *p,
                None => {
                    stats.out_of_range += 1;
                    continue;
                }
            };
            let (mx, mz) = match self.bin(point.x, point.z) {
                Some(cell) => cell,
                None => {
                    stats.out_of_range += 1;
                    continue;
                }
            };
            let density = self.smoothed_density(&counts, mx, mz);
            if density == 0 {
                stats.zero_density += 1;
            } else if density >= self.config.density_threshold {
                mask[i] = true;
                stats.retained += 1;
            } else {
                stats.below_threshold += 1;
            }
        }

        log::debug!(
            "density filter: retained={} out_of_range={} zero={} below_threshold={} total={}",
            stats.retained,
            stats.out_of_range,
            stats.zero_density,
            stats.below_threshold,
            candidates.len()
        );

        mask
    }
}
