//! Visualization of coronagraphic coverage maps.
//!
//! Renders a [`coronagraph::CoverageMap`] (or any count raster centered on the
//! target) in sky coordinates with the instrument and sky reference directions
//! overlaid: the U3 axis, North and East for the chosen ORIENT, and a feature
//! of interest given by position angle and separation.

use thiserror::Error;

/// Error types for rendering operations.
#[derive(Debug, Error)]
pub enum VizError {
    /// Failure reported by the drawing backend.
    #[error("Drawing error: {0}")]
    Drawing(String),

    /// The output file or its directory could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Figure parameters that cannot be drawn.
    #[error("Invalid figure configuration: {0}")]
    InvalidConfig(String),
}

/// Standard Result type for all visualization operations.
pub type Result<T> = std::result::Result<T, VizError>;

pub mod coverage_plot;
pub mod overlay;

pub use coverage_plot::{render_coverage, CoverageFigure};
pub use overlay::{Feature, OverlayGeometry};

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for VizError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        VizError::Drawing(err.to_string())
    }
}
