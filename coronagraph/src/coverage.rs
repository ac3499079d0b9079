//! Coverage maps: per-pixel counts of how many masks observe each position.
//!
//! Planning a coronagraphic program usually means combining several visits
//! (different ORIENTs, occulters or POSTARGs). Each visit contributes one
//! target-centered binary mask; adding them gives the number of visits that see
//! every point around the star.

use ndarray::{Array2, ArrayView2};

use crate::constants::PLATE_SCALE_ARCSEC_PER_PIXEL;
use crate::error::MaskError;

/// Sky extent of a raster centered on the target, in arcseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcsecExtent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ArcsecExtent {
    /// Extent of a `(height, width)` raster at the STIS plate scale.
    pub fn for_shape(shape: (usize, usize)) -> Self {
        let (height, width) = shape;
        let half_w = width as f64 / 2.0 * PLATE_SCALE_ARCSEC_PER_PIXEL;
        let half_h = height as f64 / 2.0 * PLATE_SCALE_ARCSEC_PER_PIXEL;
        Self {
            x_min: -half_w,
            x_max: half_w,
            y_min: -half_h,
            y_max: half_h,
        }
    }

    /// Width of one pixel in arcseconds.
    pub fn pixel_size(&self) -> f64 {
        PLATE_SCALE_ARCSEC_PER_PIXEL
    }
}

/// Accumulated coverage counts.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMap {
    counts: Array2<f64>,
    masks: usize,
}

impl CoverageMap {
    /// Empty map of `height x width` pixels.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            counts: Array2::zeros((height, width)),
            masks: 0,
        }
    }

    /// Map seeded with a single mask.
    pub fn from_mask(mask: ArrayView2<f64>) -> Self {
        Self {
            counts: mask.to_owned(),
            masks: 1,
        }
    }

    /// Add one mask.
    ///
    /// # Errors
    ///
    /// [`MaskError::ShapeMismatch`] if the mask shape differs from the map's.
    pub fn add(&mut self, mask: ArrayView2<f64>) -> Result<(), MaskError> {
        if mask.dim() != self.counts.dim() {
            return Err(MaskError::ShapeMismatch {
                expected: self.counts.dim(),
                actual: mask.dim(),
            });
        }
        self.counts += &mask;
        self.masks += 1;
        Ok(())
    }

    pub fn counts(&self) -> ArrayView2<'_, f64> {
        self.counts.view()
    }

    pub fn into_counts(self) -> Array2<f64> {
        self.counts
    }

    /// Number of masks accumulated so far.
    pub fn mask_count(&self) -> usize {
        self.masks
    }

    pub fn shape(&self) -> (usize, usize) {
        self.counts.dim()
    }

    /// Highest per-pixel count.
    pub fn max_count(&self) -> f64 {
        self.counts.iter().copied().fold(0.0, f64::max)
    }

    /// Fraction of pixels seen by at least one mask.
    pub fn covered_fraction(&self) -> f64 {
        let total = self.counts.len();
        if total == 0 {
            return 0.0;
        }
        let covered = self.counts.iter().filter(|&&v| v > 0.0).count();
        covered as f64 / total as f64
    }

    /// Count-weighted centroid `(x, y)` in pixels, `None` for an empty map.
    pub fn center_of_coverage(&self) -> Option<(f64, f64)> {
        let (mut sum, mut sum_x, mut sum_y) = (0.0, 0.0, 0.0);
        for ((y, x), &v) in self.counts.indexed_iter() {
            sum += v;
            sum_x += v * x as f64;
            sum_y += v * y as f64;
        }
        (sum > 0.0).then(|| (sum_x / sum, sum_y / sum))
    }

    /// Sky extent of the map, target at the center.
    pub fn arcsec_extent(&self) -> ArcsecExtent {
        ArcsecExtent::for_shape(self.counts.dim())
    }
}
