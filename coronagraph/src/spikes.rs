//! Diffraction-spike masks.
//!
//! The secondary-mirror supports of HST scatter starlight into an X-shaped
//! pattern of spikes through the target. Pixels on the spikes cannot be used for
//! faint-structure imaging, so they are removed from the coverage masks. A spike
//! mask is all ones except for two diagonal bands crossing at the star:
//!
//! ```text
//! | |x - cx| - |y - cy| | <= half_width   ->  0 (on a spike)
//! otherwise                               ->  1
//! ```
//!
//! Each band is `2 * half_width + 1` pixels wide along either axis.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Geometry of a diffraction-spike mask.
///
/// Built with [`DiffractionSpikes::square`] or [`DiffractionSpikes::with_size`],
/// optionally refined with [`half_width`](Self::half_width) and
/// [`centered_at`](Self::centered_at), then rendered with [`build`](Self::build).
///
/// # Examples
///
/// ```rust
/// use coronagraph::spikes::DiffractionSpikes;
///
/// let spikes = DiffractionSpikes::with_size(64, 32)
///     .half_width(2)
///     .centered_at(40.5, 10.25)
///     .build();
/// assert_eq!(spikes.dim(), (32, 64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffractionSpikes {
    /// Width of the mask (x extent) in pixels
    pub width: usize,
    /// Height of the mask (y extent) in pixels
    pub height: usize,
    /// Half width of each spike band in pixels; 0 disables the spikes
    pub half_width: u32,
    /// Spike crossing point along x; defaults to `(width - 1) / 2`
    pub center_x: Option<f64>,
    /// Spike crossing point along y; defaults to `(height - 1) / 2`
    pub center_y: Option<f64>,
}

impl DiffractionSpikes {
    /// Square `width x width` mask with no spikes.
    pub fn square(width: usize) -> Self {
        Self::with_size(width, width)
    }

    /// `width x height` mask with no spikes.
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            half_width: 0,
            center_x: None,
            center_y: None,
        }
    }

    /// Set the half width of the spike bands.
    pub fn half_width(mut self, half_width: u32) -> Self {
        self.half_width = half_width;
        self
    }

    /// Cross the spikes at `(x, y)` instead of the geometric center.
    pub fn centered_at(mut self, x: f64, y: f64) -> Self {
        self.center_x = Some(x);
        self.center_y = Some(y);
        self
    }

    /// Resolved crossing point `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (
            self.center_x
                .unwrap_or_else(|| (self.width as f64 - 1.0) / 2.0),
            self.center_y
                .unwrap_or_else(|| (self.height as f64 - 1.0) / 2.0),
        )
    }

    /// Whether pixel `(x, y)` lies on one of the spike bands.
    pub fn blocks(&self, x: usize, y: usize) -> bool {
        if self.half_width == 0 {
            return false;
        }
        let (cx, cy) = self.center();
        let dx = (x as f64 - cx).abs();
        let dy = (y as f64 - cy).abs();
        (dx - dy).abs() <= self.half_width as f64
    }

    /// Render the mask as a `(height, width)` array of 0s and 1s.
    pub fn build(&self) -> Array2<f64> {
        let shape = (self.height, self.width);
        if self.half_width == 0 {
            return Array2::ones(shape);
        }
        Array2::from_shape_fn(shape, |(y, x)| if self.blocks(x, y) { 0.0 } else { 1.0 })
    }
}

/// Square `width x width` spike mask centered on the array.
pub fn make_diffraction_spikes(width: usize, half_width: u32) -> Array2<f64> {
    DiffractionSpikes::square(width).half_width(half_width).build()
}
