//! Reference directions and feature markers drawn over a coverage map.
//!
//! Everything here is expressed in the polar frame of the figure: angles in
//! degrees measured from the U3 axis, radii in arcseconds. The polar origin is
//! rotated by [`THETA_OFFSET_DEG`] so the U3 axis points to the upper left, the
//! way STIS coronagraphic planning figures are usually drawn.

use serde::{Deserialize, Serialize};

/// Rotation of polar angle zero, counter-clockwise from +x.
pub const THETA_OFFSET_DEG: f64 = 135.0;

/// Number of vertices used for arcs and the feature path.
const ARC_POINTS: usize = 20;

/// Length of North/East arrows relative to the U3 axis.
const COMPASS_SCALE: f64 = 0.9;

/// Convert a polar position of the figure to cartesian arcseconds.
pub fn polar_to_cartesian(theta_deg: f64, radius: f64) -> (f64, f64) {
    let phi = (theta_deg + THETA_OFFSET_DEG).to_radians();
    (radius * phi.cos(), radius * phi.sin())
}

/// Samples `n` points evenly spaced between two polar positions.
fn polar_path(start: (f64, f64), end: (f64, f64), n: usize) -> Vec<(f64, f64)> {
    let steps = n.max(2) - 1;
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let theta = start.0 + (end.0 - start.0) * t;
            let radius = start.1 + (end.1 - start.1) * t;
            polar_to_cartesian(theta, radius)
        })
        .collect()
}

/// A circumstellar feature given by position angle and separation.
///
/// Position angles are east of north in degrees, separations in arcseconds.
/// A feature without an end point is a single location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub pa_start_deg: f64,
    pub separation_start_arcsec: f64,
    #[serde(default)]
    pub pa_end_deg: Option<f64>,
    #[serde(default)]
    pub separation_end_arcsec: Option<f64>,
}

impl Default for Feature {
    fn default() -> Self {
        Self::point(30.0, 8.0)
    }
}

impl Feature {
    /// A single location.
    pub fn point(pa_deg: f64, separation_arcsec: f64) -> Self {
        Self {
            pa_start_deg: pa_deg,
            separation_start_arcsec: separation_arcsec,
            pa_end_deg: None,
            separation_end_arcsec: None,
        }
    }

    /// Extend the feature to an end point.
    pub fn to(mut self, pa_deg: f64, separation_arcsec: f64) -> Self {
        self.pa_end_deg = Some(pa_deg);
        self.separation_end_arcsec = Some(separation_arcsec);
        self
    }

    pub fn pa_end(&self) -> f64 {
        self.pa_end_deg.unwrap_or(self.pa_start_deg)
    }

    pub fn separation_end(&self) -> f64 {
        self.separation_end_arcsec
            .unwrap_or(self.separation_start_arcsec)
    }

    pub fn mean_pa(&self) -> f64 {
        (self.pa_start_deg + self.pa_end()) / 2.0
    }

    pub fn mean_separation(&self) -> f64 {
        (self.separation_start_arcsec + self.separation_end()) / 2.0
    }
}

/// Cartesian vertices (arcsec) of every overlay element for one ORIENT.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayGeometry {
    /// Segment from the star along the U3 axis.
    pub u3_axis: [(f64, f64); 2],
    pub north: [(f64, f64); 2],
    pub east: [(f64, f64); 2],
    /// Arc from North to the U3 axis showing the ORIENT angle.
    pub orient_arc: Vec<(f64, f64)>,
    pub feature_path: Vec<(f64, f64)>,
    pub feature_midpoint: (f64, f64),
    /// Arc from North to the feature showing its position angle.
    pub pa_arc: Vec<(f64, f64)>,
    pub star: (f64, f64),
}

impl OverlayGeometry {
    /// Lay out the overlay for a field of `fov_arcsec` seen at `orient_deg`.
    pub fn new(fov_arcsec: f64, orient_deg: f64, feature: &Feature) -> Self {
        let axis_len = fov_arcsec / 2.0;
        let compass_len = axis_len * COMPASS_SCALE;
        let origin = (0.0, 0.0);

        let north_theta = -orient_deg;
        let east_theta = -(orient_deg - 90.0);

        let feature_start = (
            feature.pa_start_deg - orient_deg,
            feature.separation_start_arcsec,
        );
        let feature_end = (feature.pa_end() - orient_deg, feature.separation_end());
        let mean_theta = feature.mean_pa() - orient_deg;
        let mean_sep = feature.mean_separation();

        Self {
            u3_axis: [origin, polar_to_cartesian(0.0, axis_len)],
            north: [origin, polar_to_cartesian(north_theta, compass_len)],
            east: [origin, polar_to_cartesian(east_theta, compass_len)],
            orient_arc: polar_path(
                (north_theta, fov_arcsec / 4.0),
                (0.0, fov_arcsec / 4.0),
                ARC_POINTS,
            ),
            feature_path: polar_path(feature_start, feature_end, ARC_POINTS),
            feature_midpoint: polar_to_cartesian(mean_theta, mean_sep),
            pa_arc: polar_path(
                (mean_theta, mean_sep),
                (north_theta, mean_sep),
                ARC_POINTS,
            ),
            star: origin,
        }
    }

    /// Where to anchor the North label.
    pub fn north_label(&self) -> (f64, f64) {
        self.north[1]
    }

    pub fn east_label(&self) -> (f64, f64) {
        self.east[1]
    }
}
