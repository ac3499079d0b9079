//! Grid interpolation used by the mask extractor.
//!
//! The extractor only needs one thing from an interpolator: sample a raster on a
//! rectilinear grid of (possibly fractional) pixel coordinates, with a fill
//! value outside the raster. [`GridInterpolator`] captures that contract so a
//! different resampler can be injected; [`CubicSplineInterpolator`] is the
//! default.

use ndarray::{Array2, ArrayView2};

use crate::spline::{BSplineSurface, Taps};

/// Sample a raster on the grid spanned by `xs` (columns) and `ys` (rows).
pub trait GridInterpolator {
    /// Returns an array of shape `(ys.len(), xs.len())` whose element `[j, i]`
    /// is the interpolant at `(x = xs[i], y = ys[j])`.
    ///
    /// `image` is indexed `[y, x]` with sample `(x, y)` at integer coordinates.
    /// Query points outside `[0, width - 1] x [0, height - 1]` take `fill`.
    fn sample_grid(&self, image: ArrayView2<f64>, xs: &[f64], ys: &[f64], fill: f64)
        -> Array2<f64>;
}

/// Cubic B-spline interpolation through every input sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CubicSplineInterpolator;

impl GridInterpolator for CubicSplineInterpolator {
    fn sample_grid(
        &self,
        image: ArrayView2<f64>,
        xs: &[f64],
        ys: &[f64],
        fill: f64,
    ) -> Array2<f64> {
        let surface = BSplineSurface::new(image);

        // The grid is separable, so taps are computed once per row and column
        let col_taps: Vec<Option<Taps>> = xs
            .iter()
            .map(|&x| Taps::at(x, surface.width()))
            .collect();
        let row_taps: Vec<Option<Taps>> = ys
            .iter()
            .map(|&y| Taps::at(y, surface.height()))
            .collect();

        Array2::from_shape_fn((ys.len(), xs.len()), |(j, i)| {
            match (&row_taps[j], &col_taps[i]) {
                (Some(rows), Some(cols)) => surface.evaluate_taps(rows, cols),
                _ => fill,
            }
        })
    }
}
