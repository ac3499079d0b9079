//! Occulter-centered mask extraction.
//!
//! Turns a full-frame STIS occulter mask (1 = open detector, 0 = occulted) into
//! a coverage mask centered on the target star:
//!
//! 1. resolve the occulter center from the calibration table
//! 2. shift it by the POSTARG pointing offsets
//! 3. report pointing diagnostics (outside the field, not occulted)
//! 4. zero NaNs and mask the diffraction spikes through the target
//! 5. resample a `(2 * half_size_y + 1, 2 * half_size_x + 1)` window around the
//!    target with a cubic interpolant, zero outside the frame
//! 6. binarize
//!
//! The output pixel `[half_size_y, half_size_x]` is the target position.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::constants::{
    arcsec_to_pixels, DEFAULT_HALF_SIZE, DEFAULT_SPIKE_HALF_WIDTH, FIELD_OF_VIEW_PIXELS,
};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::MaskError;
use crate::interp::{CubicSplineInterpolator, GridInterpolator};
use crate::mask::{binarize_in_place, zero_nans, Mask};
use crate::occulter::occulter_location;
use crate::spikes::DiffractionSpikes;

/// Parameters of one extraction.
///
/// # Examples
///
/// ```rust
/// use coronagraph::extract::ExtractionRequest;
///
/// let request = ExtractionRequest::new("WEDGEA1.0")
///     .half_size(256)
///     .postarg2(0.5)
///     .spike_half_width(Some(3));
/// assert_eq!(request.resolved_half_sizes(), (256, 256));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Occulter name, matched case-insensitively
    pub occulter: String,
    /// Half size on both axes; defaults to [`DEFAULT_HALF_SIZE`]
    pub half_size: Option<usize>,
    /// Half width of the output, overriding `half_size` along x
    pub half_size_x: Option<usize>,
    /// Half height of the output, overriding `half_size` along y
    pub half_size_y: Option<usize>,
    /// POSTARG1 offset along x in arcseconds
    pub postarg1: Option<f64>,
    /// POSTARG2 offset along y in arcseconds
    pub postarg2: Option<f64>,
    /// Half width of the masked spike bands; `None` keeps the spikes
    pub spike_half_width: Option<u32>,
}

impl ExtractionRequest {
    /// Request for `occulter` with default size and spike masking.
    pub fn new(occulter: impl Into<String>) -> Self {
        Self {
            occulter: occulter.into(),
            half_size: None,
            half_size_x: None,
            half_size_y: None,
            postarg1: None,
            postarg2: None,
            spike_half_width: Some(DEFAULT_SPIKE_HALF_WIDTH),
        }
    }

    pub fn half_size(mut self, half_size: usize) -> Self {
        self.half_size = Some(half_size);
        self
    }

    pub fn half_size_x(mut self, half_size_x: usize) -> Self {
        self.half_size_x = Some(half_size_x);
        self
    }

    pub fn half_size_y(mut self, half_size_y: usize) -> Self {
        self.half_size_y = Some(half_size_y);
        self
    }

    pub fn postarg1(mut self, arcsec: f64) -> Self {
        self.postarg1 = Some(arcsec);
        self
    }

    pub fn postarg2(mut self, arcsec: f64) -> Self {
        self.postarg2 = Some(arcsec);
        self
    }

    pub fn spike_half_width(mut self, half_width: Option<u32>) -> Self {
        self.spike_half_width = half_width;
        self
    }

    /// Half sizes `(x, y)` after applying the defaults.
    pub fn resolved_half_sizes(&self) -> (usize, usize) {
        let half_size = self.half_size.unwrap_or(DEFAULT_HALF_SIZE);
        (
            self.half_size_x.unwrap_or(half_size),
            self.half_size_y.unwrap_or(half_size),
        )
    }

    /// Output shape `(rows, cols)`.
    pub fn output_shape(&self) -> (usize, usize) {
        let (half_x, half_y) = self.resolved_half_sizes();
        (2 * half_y + 1, 2 * half_x + 1)
    }

    /// Target position `(x, y)` in detector pixels: occulter center plus offsets.
    pub fn target_center(&self) -> Result<(f64, f64), MaskError> {
        let (mut x_center, mut y_center) = occulter_location(&self.occulter)?;
        if let Some(postarg1) = self.postarg1 {
            x_center += arcsec_to_pixels(postarg1);
        }
        if let Some(postarg2) = self.postarg2 {
            y_center += arcsec_to_pixels(postarg2);
        }
        Ok((x_center, y_center))
    }
}

/// Round to two decimals, ties to even.
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Unit-step sample coordinates `center - half ..= center + half`.
pub(crate) fn sample_axis(center: f64, half: usize) -> Vec<f64> {
    let start = center - half as f64;
    (0..2 * half + 1)
        .map(|i| round_hundredths(start + i as f64))
        .collect()
}

fn in_field_of_view(x: f64, y: f64) -> bool {
    (0.0..=FIELD_OF_VIEW_PIXELS).contains(&x) && (0.0..=FIELD_OF_VIEW_PIXELS).contains(&y)
}

/// Extracts target-centered coverage masks from a full-frame occulter mask.
#[derive(Debug, Clone, Default)]
pub struct MaskExtractor<I = CubicSplineInterpolator> {
    interpolator: I,
}

impl MaskExtractor {
    /// Extractor using cubic spline interpolation.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: GridInterpolator> MaskExtractor<I> {
    /// Extractor using a caller-supplied interpolator.
    pub fn with_interpolator(interpolator: I) -> Self {
        Self { interpolator }
    }

    /// Extract the coverage mask described by `request` from `image`.
    ///
    /// `image` is the full-frame occulter mask indexed `[y, x]`. Pointing
    /// problems are reported to `sink` and never abort the extraction.
    ///
    /// # Errors
    ///
    /// [`MaskError::UnknownOcculter`] if the occulter is not in the calibration table.
    pub fn extract(
        &self,
        image: ArrayView2<f64>,
        request: &ExtractionRequest,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Mask, MaskError> {
        let (x_center, y_center) = request.target_center()?;
        let (half_x, half_y) = request.resolved_half_sizes();
        log::debug!(
            "Extracting {} mask at ({x_center:.2}, {y_center:.2}), half size {half_x}x{half_y}",
            request.occulter
        );

        self.check_pointing(image, request, x_center, y_center, sink);

        let mut frame = image.to_owned();
        zero_nans(&mut frame);

        if let Some(half_width) = request.spike_half_width {
            let (height, width) = frame.dim();
            let spikes = DiffractionSpikes::with_size(width, height)
                .half_width(half_width)
                .centered_at(x_center, y_center)
                .build();
            frame *= &spikes;
        }

        let xs = sample_axis(x_center, half_x);
        let ys = sample_axis(y_center, half_y);
        let mut mask = self.interpolator.sample_grid(frame.view(), &xs, &ys, 0.0);
        binarize_in_place(&mut mask);
        Ok(mask)
    }

    fn check_pointing(
        &self,
        image: ArrayView2<f64>,
        request: &ExtractionRequest,
        x_center: f64,
        y_center: f64,
        sink: &mut dyn DiagnosticSink,
    ) {
        if !in_field_of_view(x_center, y_center) {
            sink.report(Diagnostic::OutsideFieldOfView {
                occulter: request.occulter.clone(),
                postarg1: request.postarg1,
                postarg2: request.postarg2,
                x_center,
                y_center,
            });
            return;
        }

        let row = y_center.round_ties_even() as usize;
        let col = x_center.round_ties_even() as usize;
        // The field of view bound is inclusive, so the rounded pixel may sit just off the frame
        if image.get((row, col)) == Some(&1.0) {
            sink.report(Diagnostic::NotOcculted {
                occulter: request.occulter.clone(),
                postarg1: request.postarg1,
                postarg2: request.postarg2,
                x_center,
                y_center,
            });
        }
    }
}

/// Extract a coverage mask with the default interpolator, logging diagnostics.
pub fn occulted_mask(
    image: ArrayView2<f64>,
    request: &ExtractionRequest,
) -> Result<Mask, MaskError> {
    MaskExtractor::new().extract(image, request, &mut LogSink)
}
