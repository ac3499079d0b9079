//! Error types for the mask pipeline.
//!
//! Only conditions the caller must act on are errors. Geometry problems that
//! still allow a best-effort mask (target outside the field of view, target not
//! behind an occulter) are reported as [`crate::diagnostics::Diagnostic`]s.

use thiserror::Error;

/// Errors raised by the occulter registry, the mask rotator and coverage accumulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaskError {
    /// The requested occulter is not one of the calibrated STIS positions.
    #[error("{name} is not a supported location by STIS")]
    UnknownOcculter { name: String },

    /// An explicit reshape target cannot hold the mask without cropping it.
    #[error(
        "New width ({requested_width}) or height ({requested_height}) smaller than that of \
         input mask ({mask_width} or {mask_height}, respectively), try a bigger value"
    )]
    CanvasTooSmall {
        requested_width: usize,
        requested_height: usize,
        mask_width: usize,
        mask_height: usize,
    },

    /// A mask added to a coverage map does not have the map's shape.
    #[error("Mask shape {actual:?} does not match coverage map shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}
