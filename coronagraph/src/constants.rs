//! Calibration constants for the STIS coronagraphic imaging mode.
//!
//! These values encode the instrument calibration the mask pipeline depends on.
//! They are fixed for the 50CORON aperture and are deliberately not exposed as
//! per-call options.

/// Plate scale of the STIS CCD in arcseconds per pixel.
///
/// Used to convert POSTARG1/POSTARG2 offsets into pixel shifts and to express
/// coverage maps in arcseconds.
pub const PLATE_SCALE_ARCSEC_PER_PIXEL: f64 = 0.05072;

/// Threshold applied after every resampling step.
///
/// Interpolated values strictly below this become 0, everything else becomes 1.
/// Empirical value chosen so that partially occulted edge pixels count as blocked.
pub const BINARIZE_THRESHOLD: f64 = 0.9;

/// Extent of the detector field of view in pixels along either axis.
///
/// An occulter center (after pointing offsets) outside `[0, FIELD_OF_VIEW_PIXELS]`
/// puts the target beyond the field of view.
pub const FIELD_OF_VIEW_PIXELS: f64 = 1024.0;

/// Default half size of an extracted mask, giving a `2049 x 2049` output.
pub const DEFAULT_HALF_SIZE: usize = 1024;

/// Default half width (pixels) of the masked diffraction-spike bands.
pub const DEFAULT_SPIKE_HALF_WIDTH: u32 = 5;

/// Convert an angular offset in arcseconds to detector pixels.
pub fn arcsec_to_pixels(arcsec: f64) -> f64 {
    arcsec / PLATE_SCALE_ARCSEC_PER_PIXEL
}
