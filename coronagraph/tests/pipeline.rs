//! End-to-end tests of extraction, rotation and coverage accumulation on
//! synthetic STIS frames.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use coronagraph::constants::PLATE_SCALE_ARCSEC_PER_PIXEL;
use coronagraph::rotate::canvas_size;
use coronagraph::{
    is_binary, occulter_location, rotate_mask, CoverageMap, CubicSplineInterpolator, Diagnostic,
    ExtractionRequest, GridInterpolator, MaskError, MaskExtractor, MaskRotator, RasterRotator,
    RotationRequest,
};
use ndarray::{s, Array2, ArrayView2};

const FRAME: usize = 1024;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Detector open everywhere.
fn open_frame() -> Array2<f64> {
    Array2::ones((FRAME, FRAME))
}

/// Detector with a horizontal occulting band through the BAR5 position.
fn bar5_frame() -> Array2<f64> {
    let (_, y_center) = occulter_location("BAR5").unwrap();
    Array2::from_shape_fn((FRAME, FRAME), |(y, _)| {
        if (y as f64 - y_center).abs() < 12.0 {
            0.0
        } else {
            1.0
        }
    })
}

fn extract(
    frame: &Array2<f64>,
    request: &ExtractionRequest,
) -> (Array2<f64>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mask = MaskExtractor::new()
        .extract(frame.view(), request, &mut diagnostics)
        .expect("extraction succeeds");
    (mask, diagnostics)
}

#[test]
fn test_open_frame_clips_at_detector_edge() {
    init_logging();
    let request = ExtractionRequest::new("bar5")
        .half_size(64)
        .spike_half_width(None);
    let (mask, diagnostics) = extract(&open_frame(), &request);

    assert_eq!(mask.dim(), (129, 129));
    assert!(is_binary(mask.view()));

    // x = 969.73 - 64 + i stays on the detector (x <= 1023) for i <= 117
    for row in mask.rows() {
        assert_eq!(row.iter().filter(|&&v| v == 1.0).count(), 118);
        assert!(row.slice(s![..118]).iter().all(|&v| v == 1.0));
    }

    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0], Diagnostic::NotOcculted { .. }));
}

#[test]
fn test_spikes_are_masked_through_target() {
    init_logging();
    let request = ExtractionRequest::new("BAR5").half_size(64);
    let (mask, _) = extract(&open_frame(), &request);

    assert!(is_binary(mask.view()));
    // Target pixel and both diagonals are blocked
    assert_eq!(mask[[64, 64]], 0.0);
    assert_eq!(mask[[84, 84]], 0.0);
    assert_eq!(mask[[44, 84]], 0.0);
    assert_eq!(mask[[84, 44]], 0.0);
    // Horizontal and vertical directions are open
    assert_eq!(mask[[64, 94]], 1.0);
    assert_eq!(mask[[64, 20]], 1.0);
    assert_eq!(mask[[20, 64]], 1.0);
    assert_eq!(mask[[110, 64]], 1.0);
}

/// Spline interpolator that keeps a copy of the frame it was asked to sample.
#[derive(Default, Clone)]
struct Recording {
    frame: Rc<RefCell<Option<Array2<f64>>>>,
}

impl GridInterpolator for Recording {
    fn sample_grid(
        &self,
        image: ArrayView2<f64>,
        xs: &[f64],
        ys: &[f64],
        fill: f64,
    ) -> Array2<f64> {
        *self.frame.borrow_mut() = Some(image.to_owned());
        CubicSplineInterpolator.sample_grid(image, xs, ys, fill)
    }
}

/// Columns of `row` in the spike-suppressed frame that were zeroed.
fn spiked_columns(half_width: u32, row: usize) -> Vec<usize> {
    let recording = Recording::default();
    let request = ExtractionRequest::new("BAR5")
        .half_size(16)
        .spike_half_width(Some(half_width));
    let mut diagnostics = Vec::new();
    MaskExtractor::with_interpolator(recording.clone())
        .extract(open_frame().view(), &request, &mut diagnostics)
        .unwrap();
    let frame = recording.frame.borrow_mut().take().unwrap();
    frame
        .row(row)
        .iter()
        .enumerate()
        .filter(|(_, &v)| v == 0.0)
        .map(|(x, _)| x)
        .collect()
}

#[test]
fn test_spike_half_width_sets_band_width() {
    init_logging();
    // Row 727 sits 29.19 px below the BAR5 center (969.73, 697.81), so the
    // bands are centered on x = 940.54 and x = 998.92
    assert_eq!(spiked_columns(1, 727), vec![940, 941, 998, 999]);

    let wide = spiked_columns(8, 727);
    let expected: Vec<usize> = (933..=948).chain(991..=1006).collect();
    assert_eq!(wide, expected);

    assert_eq!(spiked_columns(5, 727).len(), 20);
}

#[test]
fn test_spike_half_width_changes_extracted_mask() {
    init_logging();
    let extract_with = |half_width: Option<u32>| {
        let request = ExtractionRequest::new("BAR5")
            .half_size(48)
            .spike_half_width(half_width);
        let (mask, _) = extract(&open_frame(), &request);
        assert!(is_binary(mask.view()));
        mask
    };

    let narrow = extract_with(Some(1));
    let default = extract_with(Some(5));
    let wide = extract_with(Some(8));
    let count = |mask: &Array2<f64>| mask.iter().filter(|&&v| v == 0.0).count();
    assert!(count(&narrow) < count(&default));
    assert!(count(&default) < count(&wide));

    let implicit = extract(&open_frame(), &ExtractionRequest::new("BAR5").half_size(48)).0;
    assert_eq!(implicit, default);
}

/// Rows of `mask` that are blocked across their full width.
fn blocked_rows(mask: &Array2<f64>) -> Vec<usize> {
    mask.rows()
        .into_iter()
        .enumerate()
        .filter(|(_, row)| row.iter().all(|&v| v == 0.0))
        .map(|(y, _)| y)
        .collect()
}

#[test]
fn test_postarg2_shifts_sampled_window() {
    init_logging();
    let extract_shifted = |pixels: f64| {
        let request = ExtractionRequest::new("BAR5")
            .half_size(32)
            .spike_half_width(None)
            .postarg2(pixels * PLATE_SCALE_ARCSEC_PER_PIXEL);
        let (mask, diagnostics) = extract(&bar5_frame(), &request);
        assert!(diagnostics.is_empty());
        mask
    };

    let centered = extract_shifted(0.0);
    let base = blocked_rows(&centered);
    assert!(!base.is_empty());
    assert!(base.contains(&32));

    // Moving the target up by k rows moves the bar down by k rows in the mask
    let up = extract_shifted(3.0);
    assert_eq!(blocked_rows(&up), base.iter().map(|y| y - 3).collect::<Vec<_>>());
    assert_eq!(up.slice(s![..62, ..]), centered.slice(s![3.., ..]));

    let down = extract_shifted(-3.0);
    assert_eq!(blocked_rows(&down), base.iter().map(|y| y + 3).collect::<Vec<_>>());
    assert_eq!(down.slice(s![3.., ..]), centered.slice(s![..62, ..]));
}

#[test]
fn test_occulted_target_has_no_diagnostics() {
    init_logging();
    let request = ExtractionRequest::new("BAR5")
        .half_size(64)
        .spike_half_width(None);
    let (mask, diagnostics) = extract(&bar5_frame(), &request);

    assert!(diagnostics.is_empty());
    assert!(mask.row(64).iter().all(|&v| v == 0.0));
    assert_eq!(mask[[94, 0]], 1.0);
    assert_eq!(mask[[34, 0]], 1.0);
}

#[test]
fn test_target_outside_field_of_view_still_extracts() {
    init_logging();
    // 10" along x moves BAR5 roughly 197 pixels, past the detector edge
    let request = ExtractionRequest::new("BAR5").half_size(16).postarg1(10.0);
    let (mask, diagnostics) = extract(&open_frame(), &request);

    assert_eq!(mask.dim(), (33, 33));
    assert!(is_binary(mask.view()));
    assert!(mask.iter().all(|&v| v == 0.0));

    assert_eq!(diagnostics.len(), 1);
    match &diagnostics[0] {
        Diagnostic::OutsideFieldOfView {
            occulter,
            postarg1,
            x_center,
            ..
        } => {
            assert_eq!(occulter, "BAR5");
            assert_eq!(*postarg1, Some(10.0));
            assert!(*x_center > 1024.0);
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }
}

#[test]
fn test_nan_pixels_do_not_survive() {
    init_logging();
    let mut frame = bar5_frame();
    frame.slice_mut(s![600..620, 950..990]).fill(f64::NAN);
    let request = ExtractionRequest::new("BAR5")
        .half_size_x(40)
        .half_size_y(120);
    let (mask, _) = extract(&frame, &request);

    assert_eq!(mask.dim(), (241, 81));
    assert!(mask.iter().all(|v| !v.is_nan()));
    assert!(is_binary(mask.view()));
}

#[test]
fn test_unknown_occulter_is_an_error() {
    let mut diagnostics = Vec::new();
    let err = MaskExtractor::new()
        .extract(
            open_frame().view(),
            &ExtractionRequest::new("FOO"),
            &mut diagnostics,
        )
        .unwrap_err();
    assert_eq!(
        err,
        MaskError::UnknownOcculter {
            name: "FOO".to_string()
        }
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn test_zero_rotation_without_reshape_is_identity() {
    init_logging();
    let request = ExtractionRequest::new("BAR5").half_size(48);
    let (mask, _) = extract(&bar5_frame(), &request);

    let same = rotate_mask(mask.view(), &RotationRequest::by(0.0).without_reshape()).unwrap();
    assert_eq!(same, mask);

    let untouched = rotate_mask(mask.view(), &RotationRequest::default().without_reshape());
    assert_eq!(untouched.unwrap(), mask);
}

#[test]
fn test_symmetric_square_stays_centered() {
    let square = Array2::ones((21, 21));
    for angle in [17.0, 30.0, 45.0, 120.0] {
        let rotated =
            rotate_mask(square.view(), &RotationRequest::by(angle).without_reshape()).unwrap();
        let (x, y) = CoverageMap::from_mask(rotated.view())
            .center_of_coverage()
            .expect("rotated square is not empty");
        assert_abs_diff_eq!(x, 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 10.0, epsilon = 1e-6);
    }
}

#[test]
fn test_canvas_too_small_reports_sizes() {
    let mask = Array2::ones((31, 41));
    let err = rotate_mask(mask.view(), &RotationRequest::by(10.0).canvas(40, 50)).unwrap_err();
    assert_eq!(
        err,
        MaskError::CanvasTooSmall {
            requested_width: 40,
            requested_height: 50,
            mask_width: 41,
            mask_height: 31,
        }
    );
}

#[test]
fn test_multi_orient_coverage() {
    init_logging();
    let request = ExtractionRequest::new("BAR5").half_size(64);
    let (mask, _) = extract(&bar5_frame(), &request);
    let (width, height) = canvas_size(mask.dim(), None, None).unwrap();
    assert_eq!((width, height), (183, 183));

    let mut coverage = CoverageMap::new(height, width);
    for orient in [0.0, 30.0, 60.0, 90.0] {
        let rotated = rotate_mask(mask.view(), &RotationRequest::by(orient)).unwrap();
        assert!(is_binary(rotated.view()));
        coverage.add(rotated.view()).unwrap();
    }

    assert_eq!(coverage.mask_count(), 4);
    assert!(coverage.max_count() <= 4.0);
    assert!(coverage.max_count() >= 2.0);
    // The star itself sits on the bar and the spikes at every orient
    assert_eq!(coverage.counts()[[91, 91]], 0.0);

    let single = rotate_mask(mask.view(), &RotationRequest::by(0.0)).unwrap();
    let single_fraction = CoverageMap::from_mask(single.view()).covered_fraction();
    assert!(coverage.covered_fraction() > single_fraction);
}

/// Interpolator that reports every point as off the raster.
struct OffGrid;

impl GridInterpolator for OffGrid {
    fn sample_grid(
        &self,
        _image: ArrayView2<f64>,
        xs: &[f64],
        ys: &[f64],
        fill: f64,
    ) -> Array2<f64> {
        Array2::from_elem((ys.len(), xs.len()), fill)
    }
}

/// Rotator that leaves the raster untouched.
struct Identity;

impl RasterRotator for Identity {
    fn rotate(&self, raster: ArrayView2<f64>, _angle_deg: f64) -> Array2<f64> {
        raster.to_owned()
    }
}

#[test]
fn test_injected_collaborators() {
    let mut diagnostics = Vec::new();
    let mask = MaskExtractor::with_interpolator(OffGrid)
        .extract(
            open_frame().view(),
            &ExtractionRequest::new("WEDGEA1.0").half_size(8),
            &mut diagnostics,
        )
        .unwrap();
    assert_eq!(mask.dim(), (17, 17));
    assert!(mask.iter().all(|&v| v == 0.0));

    let raster = Array2::from_shape_fn((5, 5), |(y, x)| (x + y) as f64 / 8.0);
    let rotated = MaskRotator::with_rotator(Identity)
        .rotate(raster.view(), &RotationRequest::by(12.0).without_reshape())
        .unwrap();
    // Only the identity rotator ran, so the output is the binarized input
    assert_eq!(rotated, coronagraph::binarize(raster.view()));
}

#[test]
fn test_request_serde_round_trip() {
    let request = ExtractionRequest::new("WEDGEB2.0")
        .half_size(300)
        .postarg1(0.25)
        .spike_half_width(None);
    let json = serde_json::to_string(&request).unwrap();
    let back: ExtractionRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, request);

    let rotation = RotationRequest::by(42.0).canvas(100, 120);
    let json = serde_json::to_string(&rotation).unwrap();
    assert_eq!(serde_json::from_str::<RotationRequest>(&json).unwrap(), rotation);
}
