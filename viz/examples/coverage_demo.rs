use coronagraph::{
    occulter_location, rotate_mask, CoverageMap, ExtractionRequest, LogSink, MaskExtractor,
    RotationRequest,
};
use ndarray::Array2;
use std::path::Path;
use viz::{render_coverage, CoverageFigure, Feature};

const FRAME: usize = 1024;

/// A detector frame with an occulting bar through BAR5 and a wedge running
/// vertically through the right half of the field.
fn synthetic_frame() -> Result<Array2<f64>, Box<dyn std::error::Error>> {
    let (_, bar_y) = occulter_location("BAR5")?;
    let (wedge_x, _) = occulter_location("WEDGEA1.0")?;
    Ok(Array2::from_shape_fn((FRAME, FRAME), |(y, x)| {
        let in_bar = (y as f64 - bar_y).abs() < 10.0 && x > 300;
        let wedge_half_width = 4.0 + 0.02 * y as f64;
        let in_wedge = (x as f64 - wedge_x).abs() < wedge_half_width;
        if in_bar || in_wedge {
            0.0
        } else {
            1.0
        }
    }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("STIS Coronagraphic Coverage Demonstration");
    println!("=========================================");
    println!();

    let frame = synthetic_frame()?;
    let request = ExtractionRequest::new("BAR5").half_size(256).postarg1(0.5);
    let mask = MaskExtractor::new().extract(frame.view(), &request, &mut LogSink)?;
    println!(
        "Extracted {}x{} mask around {} ({} observable pixels)",
        mask.ncols(),
        mask.nrows(),
        request.occulter,
        mask.iter().filter(|&&v| v == 1.0).count()
    );

    let orients = [0.0, 28.0, 56.0, 84.0];
    let mut coverage: Option<CoverageMap> = None;
    for &orient in &orients {
        let rotated = rotate_mask(mask.view(), &RotationRequest::by(orient))?;
        match coverage.as_mut() {
            Some(map) => map.add(rotated.view())?,
            None => coverage = Some(CoverageMap::from_mask(rotated.view())),
        }
        println!("  ORIENT {:>5.1}°: canvas {:?}", orient, rotated.dim());
    }
    let coverage = coverage.ok_or("no orients requested")?;

    println!();
    println!("Visits combined: {}", coverage.mask_count());
    println!("Maximum coverage: {}", coverage.max_count());
    println!(
        "Covered fraction: {:.1}%",
        coverage.covered_fraction() * 100.0
    );

    let output_dir = Path::new("plots");
    for &orient in &[orients[0], orients[orients.len() - 1]] {
        let figure = CoverageFigure {
            orient_deg: orient,
            feature: Feature::point(30.0, 6.0).to(70.0, 9.0),
            white_for_zero_coverage: true,
            ..CoverageFigure::default()
        };
        let path = output_dir.join(format!("coverage_orient_{:03.0}.png", orient));
        render_coverage(&coverage, &figure, &path)?;
        println!("Saved {}", path.display());
    }

    Ok(())
}
