//! Mask rotation for a new spacecraft ORIENT.
//!
//! A coverage mask is rotated about its center pixel. Because rotating a
//! rectangle clips its corners, the mask is usually first embedded in a
//! zero-filled canvas large enough to hold it at any angle (its diagonal). The
//! mask center stays on the canvas center: for every axis the paste starts at
//! `canvas_center - mask_center`, with centers taken as `(len - 1) / 2` rounded
//! down.
//!
//! The resampling itself sits behind [`RasterRotator`]; [`SplineRotator`] is the
//! default cubic-spline implementation. Rotated output is binarized again.

use std::ops::Range;

use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::MaskError;
use crate::mask::{binarize_in_place, Mask};
use crate::spline::BSplineSurface;

/// Affine rotation of a raster about its center with a fixed output shape.
pub trait RasterRotator {
    /// Rotate `raster` by `angle_deg` degrees about `((h - 1) / 2, (w - 1) / 2)`.
    ///
    /// Output pixel `(r, c)` samples the input at
    ///
    /// ```text
    /// r_src = cy + cos(a) * (r - cy) + sin(a) * (c - cx)
    /// c_src = cx - sin(a) * (r - cy) + cos(a) * (c - cx)
    /// ```
    ///
    /// Samples falling outside the input are 0. The output has the input's shape.
    fn rotate(&self, raster: ArrayView2<f64>, angle_deg: f64) -> Array2<f64>;
}

/// Cubic B-spline resampling rotator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplineRotator;

impl RasterRotator for SplineRotator {
    fn rotate(&self, raster: ArrayView2<f64>, angle_deg: f64) -> Array2<f64> {
        let (height, width) = raster.dim();
        let surface = BSplineSurface::new(raster);
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let cy = (height as f64 - 1.0) / 2.0;
        let cx = (width as f64 - 1.0) / 2.0;

        Array2::from_shape_fn((height, width), |(r, c)| {
            let dy = r as f64 - cy;
            let dx = c as f64 - cx;
            let r_src = cy + cos * dy + sin * dx;
            let c_src = cx - sin * dy + cos * dx;
            surface.evaluate(r_src, c_src).unwrap_or(0.0)
        })
    }
}

/// Parameters of one rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationRequest {
    /// Rotation angle in degrees; `None` only reshapes
    pub angle: Option<f64>,
    /// Embed the mask in a larger canvas before rotating
    pub reshape: bool,
    /// Canvas width; defaults to the mask diagonal
    pub new_width: Option<usize>,
    /// Canvas height; defaults to the mask diagonal
    pub new_height: Option<usize>,
}

impl Default for RotationRequest {
    fn default() -> Self {
        Self {
            angle: None,
            reshape: true,
            new_width: None,
            new_height: None,
        }
    }
}

impl RotationRequest {
    /// Rotate by `angle_deg` onto a diagonal-sized canvas.
    pub fn by(angle_deg: f64) -> Self {
        Self {
            angle: Some(angle_deg),
            ..Self::default()
        }
    }

    /// Keep the mask's own shape.
    pub fn without_reshape(mut self) -> Self {
        self.reshape = false;
        self
    }

    /// Embed into an explicit `width x height` canvas.
    pub fn canvas(mut self, width: usize, height: usize) -> Self {
        self.reshape = true;
        self.new_width = Some(width);
        self.new_height = Some(height);
        self
    }
}

/// Center index of an axis of `len` pixels.
fn center_index(len: usize) -> usize {
    len.saturating_sub(1) / 2
}

/// Side of a square canvas that holds a `height x width` mask at any angle.
fn diagonal_side(height: usize, width: usize) -> usize {
    let squared = (height * height + width * width) as f64;
    squared.sqrt().floor() as usize
}

/// Bump `size` by one when its parity differs from `original`.
fn match_parity(size: usize, original: usize) -> usize {
    if size % 2 != original % 2 {
        size + 1
    } else {
        size
    }
}

/// Canvas `(width, height)` for `mask_shape = (height, width)`.
///
/// Without explicit dimensions the canvas is the mask diagonal, adjusted per
/// axis to the parity of the mask so the centers line up on whole pixels. A
/// single explicit dimension keeps the diagonal default on the other axis.
///
/// # Errors
///
/// [`MaskError::CanvasTooSmall`] when an explicit canvas is smaller than the
/// mask along either axis.
pub fn canvas_size(
    mask_shape: (usize, usize),
    new_width: Option<usize>,
    new_height: Option<usize>,
) -> Result<(usize, usize), MaskError> {
    let (height, width) = mask_shape;
    let side = diagonal_side(height, width);
    let default_width = match_parity(side, width);
    let default_height = match_parity(side, height);

    if new_width.is_none() && new_height.is_none() {
        return Ok((default_width, default_height));
    }

    let requested_width = new_width.unwrap_or(default_width);
    let requested_height = new_height.unwrap_or(default_height);
    // Columns are checked against the mask width, never its height
    if requested_width < width || requested_height < height {
        return Err(MaskError::CanvasTooSmall {
            requested_width,
            requested_height,
            mask_width: width,
            mask_height: height,
        });
    }
    Ok((requested_width, requested_height))
}

/// Index range on a canvas axis that receives a mask axis of `mask_len` pixels.
///
/// An even canvas takes `[c_new - c_mask, c_new + c_mask + 2)`, an odd one
/// `[c_new - c_mask, c_new + c_mask + 1)`. Both equal `mask_len` when the parities
/// of canvas and mask agree; otherwise the start is kept and the range spans
/// exactly `mask_len`.
fn paste_range(canvas_len: usize, mask_len: usize) -> Range<usize> {
    let canvas_center = center_index(canvas_len);
    let mask_center = center_index(mask_len);
    let start = canvas_center - mask_center;
    let end = if canvas_len % 2 == 0 {
        canvas_center + mask_center + 2
    } else {
        canvas_center + mask_center + 1
    };
    if end - start == mask_len {
        start..end
    } else {
        start..start + mask_len
    }
}

/// Embed `mask` into a zero canvas of `(width, height)` with centers aligned.
///
/// The caller guarantees the canvas is at least as large as the mask.
pub fn embed_in_canvas(mask: ArrayView2<f64>, canvas: (usize, usize)) -> Mask {
    let (width, height) = canvas;
    let (mask_height, mask_width) = mask.dim();
    let mut out = Array2::zeros((height, width));

    // Rows and columns are each centered on their own mask dimension; the
    // column center comes from the mask width, not its height
    let rows = paste_range(height, mask_height);
    let cols = paste_range(width, mask_width);
    out.slice_mut(s![rows, cols]).assign(&mask);
    out
}

/// Reshapes and rotates binary masks.
#[derive(Debug, Clone, Default)]
pub struct MaskRotator<R = SplineRotator> {
    rotator: R,
}

impl MaskRotator {
    /// Rotator using cubic spline resampling.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: RasterRotator> MaskRotator<R> {
    /// Rotator using a caller-supplied resampler.
    pub fn with_rotator(rotator: R) -> Self {
        Self { rotator }
    }

    /// Apply `request` to `mask`.
    ///
    /// With `angle == None` the (possibly reshaped) mask is returned as is.
    /// Otherwise the rotated canvas is binarized.
    ///
    /// # Errors
    ///
    /// [`MaskError::CanvasTooSmall`] if an explicit canvas cannot hold the mask.
    pub fn rotate(
        &self,
        mask: ArrayView2<f64>,
        request: &RotationRequest,
    ) -> Result<Mask, MaskError> {
        let canvas = if request.reshape {
            let size = canvas_size(mask.dim(), request.new_width, request.new_height)?;
            log::debug!(
                "Embedding {}x{} mask in {}x{} canvas",
                mask.ncols(),
                mask.nrows(),
                size.0,
                size.1
            );
            embed_in_canvas(mask, size)
        } else {
            mask.to_owned()
        };

        let Some(angle) = request.angle else {
            return Ok(canvas);
        };

        let mut rotated = self.rotator.rotate(canvas.view(), angle);
        binarize_in_place(&mut rotated);
        Ok(rotated)
    }
}

/// Rotate a mask with the default spline rotator.
pub fn rotate_mask(mask: ArrayView2<f64>, request: &RotationRequest) -> Result<Mask, MaskError> {
    MaskRotator::new().rotate(mask, request)
}
