//! PNG rendering of coverage maps with the sky/instrument overlay.

use std::path::Path;

use coronagraph::{ArcsecExtent, CoverageMap};
use ndarray::ArrayView2;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use serde::{Deserialize, Serialize};

use crate::overlay::{Feature, OverlayGeometry};
use crate::{Result, VizError};

/// Width reserved for the color scale, in pixels.
const COLORBAR_WIDTH_PX: u32 = 160;

/// Number of bands drawn in the color scale.
const COLORBAR_STEPS: usize = 100;

/// Viridis color of `value` within `[vmin, vmax]`, clamped to the range.
fn count_color(value: f64, vmin: f64, vmax: f64) -> RGBColor {
    let vmax = if vmax > vmin { vmax } else { vmin + 1.0 };
    ViridisRGB.get_color_normalized(value.clamp(vmin, vmax), vmin, vmax)
}

const OVERLAY_COLOR: RGBColor = RGBColor(220, 20, 60);
const COMPASS_COLOR: RGBColor = RGBColor(255, 140, 0);

/// Figure settings for [`CoverageFigure::render_png`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageFigure {
    /// Full width of the displayed field in arcseconds.
    pub fov_arcsec: f64,
    /// Telescope ORIENT of the U3 axis, in degrees.
    pub orient_deg: f64,
    pub feature: Feature,
    /// Leave uncovered pixels white instead of the lowest colormap color.
    pub white_for_zero_coverage: bool,
    pub width_px: u32,
    pub height_px: u32,
    /// Draw captions, tick labels and compass letters. Needs system fonts.
    pub annotate: bool,
}

impl Default for CoverageFigure {
    fn default() -> Self {
        Self {
            fov_arcsec: 20.0,
            orient_deg: 80.0,
            feature: Feature::default(),
            white_for_zero_coverage: false,
            width_px: 1200,
            height_px: 1000,
            annotate: true,
        }
    }
}

impl CoverageFigure {
    fn validate(&self, shape: (usize, usize)) -> Result<()> {
        if !(self.fov_arcsec.is_finite() && self.fov_arcsec > 0.0) {
            return Err(VizError::InvalidConfig(format!(
                "field of view must be positive, got {}",
                self.fov_arcsec
            )));
        }
        if self.width_px <= 2 * COLORBAR_WIDTH_PX || self.height_px < COLORBAR_WIDTH_PX {
            return Err(VizError::InvalidConfig(format!(
                "figure of {}x{} pixels is too small",
                self.width_px, self.height_px
            )));
        }
        if shape.0 == 0 || shape.1 == 0 {
            return Err(VizError::InvalidConfig("coverage map is empty".to_string()));
        }
        Ok(())
    }

    /// Range of counts mapped onto the colormap.
    fn color_range(&self, counts: ArrayView2<f64>) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in counts.iter().filter(|v| v.is_finite()) {
            if self.white_for_zero_coverage && v == 0.0 {
                continue;
            }
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if lo.is_finite() {
            (lo, hi)
        } else {
            (0.0, 1.0)
        }
    }

    /// Render a target-centered count raster to `path` as a PNG.
    ///
    /// Row 0 of `counts` is drawn at the bottom. Only the pixels inside the
    /// configured field of view are drawn.
    pub fn render_png(&self, counts: ArrayView2<f64>, path: &Path) -> Result<()> {
        self.validate(counts.dim())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let half = self.fov_arcsec / 2.0;
        let extent = ArcsecExtent::for_shape(counts.dim());
        let pixel = extent.pixel_size();
        let (vmin, vmax) = self.color_range(counts);
        log::debug!(
            "Rendering {:?} coverage to {} (counts {}..{})",
            counts.dim(),
            path.display(),
            vmin,
            vmax
        );

        let root = BitMapBackend::new(path, (self.width_px, self.height_px)).into_drawing_area();
        root.fill(&WHITE)?;
        let (map_area, bar_area) =
            root.split_horizontally((self.width_px - COLORBAR_WIDTH_PX) as i32);

        let mut builder = ChartBuilder::on(&map_area);
        builder.margin(15);
        if self.annotate {
            builder
                .caption(
                    format!("Coverage at ORIENT = {:.1}°", self.orient_deg),
                    ("sans-serif", 28).into_font().color(&BLACK),
                )
                .x_label_area_size(50)
                .y_label_area_size(60);
        }
        let mut chart = builder.build_cartesian_2d(-half..half, -half..half)?;
        if self.annotate {
            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc("arcsec")
                .y_desc("arcsec")
                .axis_desc_style(("sans-serif", 20))
                .label_style(("sans-serif", 16))
                .draw()?;
        }

        let (height, width) = counts.dim();
        let mut cells = Vec::new();
        for row in 0..height {
            let y0 = extent.y_min + row as f64 * pixel;
            let y1 = y0 + pixel;
            if y1 <= -half || y0 >= half {
                continue;
            }
            for col in 0..width {
                let x0 = extent.x_min + col as f64 * pixel;
                let x1 = x0 + pixel;
                if x1 <= -half || x0 >= half {
                    continue;
                }
                let value = counts[[row, col]];
                if !value.is_finite() || (self.white_for_zero_coverage && value == 0.0) {
                    continue;
                }
                cells.push(Rectangle::new(
                    [
                        (x0.max(-half), y0.max(-half)),
                        (x1.min(half), y1.min(half)),
                    ],
                    count_color(value, vmin, vmax).filled(),
                ));
            }
        }
        chart.draw_series(cells)?;

        let overlay = OverlayGeometry::new(self.fov_arcsec, self.orient_deg, &self.feature);
        chart.draw_series(std::iter::once(PathElement::new(
            overlay.u3_axis.to_vec(),
            BLACK.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            overlay.north.to_vec(),
            COMPASS_COLOR.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            overlay.east.to_vec(),
            COMPASS_COLOR.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            overlay.orient_arc.clone(),
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            overlay.pa_arc.clone(),
            OVERLAY_COLOR.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            overlay.feature_path.clone(),
            OVERLAY_COLOR.stroke_width(3),
        )))?;
        chart.draw_series(std::iter::once(Circle::new(
            overlay.feature_midpoint,
            5,
            OVERLAY_COLOR.filled(),
        )))?;
        chart.draw_series(std::iter::once(Circle::new(
            overlay.star,
            7,
            YELLOW.filled(),
        )))?;

        if self.annotate {
            let label_font = ("sans-serif", 22).into_font().color(&COMPASS_COLOR);
            chart.draw_series(std::iter::once(Text::new(
                "N",
                overlay.north_label(),
                label_font.clone(),
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                "E",
                overlay.east_label(),
                label_font,
            )))?;
            chart.draw_series(std::iter::once(Text::new(
                "U3",
                overlay.u3_axis[1],
                ("sans-serif", 22).into_font().color(&BLACK),
            )))?;
        }

        self.draw_colorbar(&bar_area, vmin, vmax)?;
        root.present()?;
        log::info!("Coverage figure saved to {}", path.display());
        Ok(())
    }

    fn draw_colorbar(
        &self,
        area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
        vmin: f64,
        vmax: f64,
    ) -> Result<()> {
        let top = if vmax > vmin { vmax } else { vmin + 1.0 };
        let mut builder = ChartBuilder::on(area);
        builder.margin(15).margin_left(10);
        if self.annotate {
            builder.y_label_area_size(50);
        }
        let mut bar = builder.build_cartesian_2d(0.0..1.0, vmin..top)?;
        if self.annotate {
            bar.configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .y_desc("coverage")
                .label_style(("sans-serif", 16))
                .draw()?;
        }

        let step = (top - vmin) / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|i| {
            let lo = vmin + i as f64 * step;
            Rectangle::new(
                [(0.0, lo), (1.0, lo + step)],
                count_color(lo + step / 2.0, vmin, top).filled(),
            )
        }))?;
        Ok(())
    }
}

/// Render an accumulated coverage map with `figure` settings.
pub fn render_coverage(
    coverage: &CoverageMap,
    figure: &CoverageFigure,
    path: &Path,
) -> Result<()> {
    figure.render_png(coverage.counts(), path)
}
