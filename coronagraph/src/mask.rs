//! Binary mask representation and the shared binarization step.

use ndarray::{Array2, ArrayView2};

use crate::constants::BINARIZE_THRESHOLD;

/// A coverage mask indexed as `[y, x]`.
///
/// After any pipeline stage completes every element is exactly `0.0` (blocked)
/// or `1.0` (observable). Intermediate resampled rasters share the type but may
/// hold continuous values.
pub type Mask = Array2<f64>;

/// Map one resampled value onto `{0, 1}`.
///
/// NaN maps to 0.
#[inline]
pub fn binarize_value(value: f64) -> f64 {
    if value >= BINARIZE_THRESHOLD {
        1.0
    } else {
        0.0
    }
}

/// Threshold a resampled raster into a binary mask.
pub fn binarize(values: ArrayView2<f64>) -> Mask {
    values.mapv(binarize_value)
}

/// Threshold a resampled raster in place.
pub fn binarize_in_place(values: &mut Array2<f64>) {
    values.mapv_inplace(binarize_value);
}

/// Replace NaN pixels with 0.
pub fn zero_nans(image: &mut Array2<f64>) {
    image.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
}

/// Check the binary-mask invariant: every element is exactly 0 or 1.
pub fn is_binary(mask: ArrayView2<f64>) -> bool {
    mask.iter().all(|&v| v == 0.0 || v == 1.0)
}

/// Number of observable (non-zero) pixels in a mask.
pub fn observable_pixels(mask: ArrayView2<f64>) -> usize {
    mask.iter().filter(|&&v| v != 0.0).count()
}
