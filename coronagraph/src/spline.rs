//! Interpolating cubic B-spline surfaces on a regular pixel grid.
//!
//! Samples are converted to B-spline coefficients with the recursive
//! prefilter of Unser et al. (single pole `z = sqrt(3) - 2`) using
//! mirror-symmetric boundaries, separably along rows then columns. The
//! resulting surface passes exactly through every sample and is C² between
//! them, which is what the binarization threshold expects from a "cubic"
//! resampler.

use ndarray::{Array2, ArrayView2, Axis};

/// Pole of the cubic B-spline prefilter.
const POLE: f64 = -0.267_949_192_431_122_7;

/// Slack (pixels) allowed when deciding whether a coordinate lies on the grid.
///
/// Absorbs rounding in rotated coordinates such as `cos(90°) ≈ 6e-17`.
pub(crate) const EDGE_TOLERANCE: f64 = 1e-9;

/// The four coefficient indices and weights contributing at one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Taps {
    pub index: [usize; 4],
    pub weight: [f64; 4],
}

impl Taps {
    /// Taps for coordinate `t` on an axis of `len` samples.
    ///
    /// Returns `None` when `t` lies outside `[0, len - 1]` (within
    /// [`EDGE_TOLERANCE`]) or is not finite.
    pub fn at(t: f64, len: usize) -> Option<Taps> {
        if len == 0 || !t.is_finite() {
            return None;
        }
        let max = (len - 1) as f64;
        if t < -EDGE_TOLERANCE || t > max + EDGE_TOLERANCE {
            return None;
        }
        let t = t.clamp(0.0, max);
        let base = t.floor();
        let f = t - base;
        let base = base as i64;

        let one_minus = 1.0 - f;
        let f2 = f * f;
        let f3 = f2 * f;
        let weight = [
            one_minus * one_minus * one_minus / 6.0,
            (4.0 - 6.0 * f2 + 3.0 * f3) / 6.0,
            (1.0 + 3.0 * f + 3.0 * f2 - 3.0 * f3) / 6.0,
            f3 / 6.0,
        ];
        let index = [
            mirror_index(base - 1, len),
            mirror_index(base, len),
            mirror_index(base + 1, len),
            mirror_index(base + 2, len),
        ];
        Some(Taps { index, weight })
    }
}

/// Reflect an index about the first and last samples (no edge duplication).
fn mirror_index(i: i64, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as i64 - 1;
    let period = 2 * last;
    let mut i = i.rem_euclid(period);
    if i > last {
        i = period - i;
    }
    i as usize
}

/// Convert one line of samples into cubic B-spline coefficients in place.
fn prefilter_line(line: &mut [f64]) {
    let n = line.len();
    if n < 2 {
        return;
    }

    let gain = (1.0 - POLE) * (1.0 - 1.0 / POLE);
    line.iter_mut().for_each(|v| *v *= gain);

    // Causal initialization for a mirror-symmetric extension
    let z_n_1 = POLE.powi(n as i32 - 1);
    let mut z_i = POLE;
    let mut c0 = line[0] + z_n_1 * line[n - 1];
    for i in 1..n - 1 {
        if z_i.abs() < f64::EPSILON * 1e-3 {
            break;
        }
        c0 += z_i * (line[i] + z_n_1 * line[n - 1 - i]);
        z_i *= POLE;
    }
    line[0] = c0 / (1.0 - z_n_1 * z_n_1);

    for i in 1..n {
        line[i] += POLE * line[i - 1];
    }

    line[n - 1] = (POLE * line[n - 2] + line[n - 1]) * POLE / (POLE * POLE - 1.0);

    for i in (0..n - 1).rev() {
        line[i] = POLE * (line[i + 1] - line[i]);
    }
}

/// Cubic B-spline coefficients of a 2D raster indexed `[y, x]`.
#[derive(Debug, Clone)]
pub(crate) struct BSplineSurface {
    coefficients: Array2<f64>,
}

impl BSplineSurface {
    /// Prefilter `samples` into spline coefficients.
    pub fn new(samples: ArrayView2<f64>) -> Self {
        let mut coefficients = samples.to_owned();
        let mut buffer = Vec::new();
        for axis in [Axis(1), Axis(0)] {
            for mut lane in coefficients.lanes_mut(axis) {
                buffer.clear();
                buffer.extend(lane.iter().copied());
                prefilter_line(&mut buffer);
                lane.iter_mut()
                    .zip(buffer.iter())
                    .for_each(|(dst, &src)| *dst = src);
            }
        }
        Self { coefficients }
    }

    pub fn height(&self) -> usize {
        self.coefficients.nrows()
    }

    pub fn width(&self) -> usize {
        self.coefficients.ncols()
    }

    /// Combine precomputed row and column taps.
    pub fn evaluate_taps(&self, rows: &Taps, cols: &Taps) -> f64 {
        let mut total = 0.0;
        for (&r, &wr) in rows.index.iter().zip(rows.weight.iter()) {
            let mut row_sum = 0.0;
            for (&c, &wc) in cols.index.iter().zip(cols.weight.iter()) {
                row_sum += wc * self.coefficients[[r, c]];
            }
            total += wr * row_sum;
        }
        total
    }

    /// Surface value at `(y, x)`, or `None` off the sample grid.
    pub fn evaluate(&self, y: f64, x: f64) -> Option<f64> {
        let rows = Taps::at(y, self.height())?;
        let cols = Taps::at(x, self.width())?;
        Some(self.evaluate_taps(&rows, &cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_raster(height: usize, width: usize) -> Array2<f64> {
        Array2::from_shape_fn((height, width), |(y, x)| {
            ((x * 7 + y * 13) % 11) as f64 / 10.0 + if (x + y) % 3 == 0 { 1.0 } else { 0.0 }
        })
    }

    #[test]
    fn test_mirror_index() {
        assert_eq!(mirror_index(-1, 5), 1);
        assert_eq!(mirror_index(-2, 5), 2);
        assert_eq!(mirror_index(0, 5), 0);
        assert_eq!(mirror_index(4, 5), 4);
        assert_eq!(mirror_index(5, 5), 3);
        assert_eq!(mirror_index(6, 5), 2);
        assert_eq!(mirror_index(3, 1), 0);
        assert_eq!(mirror_index(-1, 2), 1);
        assert_eq!(mirror_index(2, 2), 0);
    }

    #[test]
    fn test_weights_partition_unity() {
        for &t in &[0.0, 0.25, 0.5, 3.75, 9.0] {
            let taps = Taps::at(t, 10).unwrap();
            assert_relative_eq!(taps.weight.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_taps_outside_domain() {
        assert!(Taps::at(-0.01, 10).is_none());
        assert!(Taps::at(9.01, 10).is_none());
        assert!(Taps::at(f64::NAN, 10).is_none());
        assert!(Taps::at(0.0, 0).is_none());
        assert!(Taps::at(-1e-12, 10).is_some());
        assert!(Taps::at(9.0 + 1e-12, 10).is_some());
    }

    #[test]
    fn test_surface_interpolates_samples() {
        let raster = test_raster(9, 12);
        let surface = BSplineSurface::new(raster.view());
        for ((y, x), &v) in raster.indexed_iter() {
            let value = surface.evaluate(y as f64, x as f64).unwrap();
            assert_relative_eq!(value, v, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_constant_surface_stays_constant() {
        let raster = Array2::from_elem((6, 7), 0.75);
        let surface = BSplineSurface::new(raster.view());
        for &(y, x) in &[(0.5, 0.5), (2.3, 4.9), (5.0, 0.1), (4.99, 5.99)] {
            assert_relative_eq!(surface.evaluate(y, x).unwrap(), 0.75, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_row_and_pixel() {
        let row = Array2::from_shape_vec((1, 4), vec![0.0, 1.0, 0.0, 1.0]).unwrap();
        let surface = BSplineSurface::new(row.view());
        assert_relative_eq!(surface.evaluate(0.0, 1.0).unwrap(), 1.0, epsilon = 1e-12);
        assert!(surface.evaluate(0.5, 1.0).is_none());

        let pixel = Array2::from_elem((1, 1), 0.4);
        let surface = BSplineSurface::new(pixel.view());
        assert_relative_eq!(surface.evaluate(0.0, 0.0).unwrap(), 0.4, epsilon = 1e-15);
    }
}
