//! Coronagraphic coverage masks for HST/STIS.
//!
//! Given the full-frame occulter mask of the STIS CCD, this crate computes which
//! parts of the sky around a target star are observable for a chosen occulter,
//! pointing offset and spacecraft orientation:
//!
//! - [`occulter`]: calibrated occulter centers
//! - [`spikes`]: diffraction-spike masks
//! - [`extract`]: target-centered, spike-masked, resampled and binarized masks
//! - [`rotate`]: canvas embedding and rotation to a new ORIENT
//! - [`coverage`]: accumulation of masks from several visits
//!
//! Interpolation and rotation are injected through [`GridInterpolator`] and
//! [`RasterRotator`]; the defaults use cubic B-splines. Non-fatal pointing
//! problems are delivered to a [`DiagnosticSink`].
//!
//! ```rust
//! use coronagraph::{occulted_mask, rotate_mask, ExtractionRequest, RotationRequest};
//! use ndarray::Array2;
//!
//! # fn main() -> Result<(), coronagraph::MaskError> {
//! // Open detector everywhere except a band behind the BAR5 occulter
//! let frame = Array2::from_shape_fn((1024, 1024), |(y, _)| {
//!     if (y as f64 - 697.81).abs() < 12.0 { 0.0 } else { 1.0 }
//! });
//!
//! let request = ExtractionRequest::new("BAR5").half_size(32);
//! let mask = occulted_mask(frame.view(), &request)?;
//! assert_eq!(mask.dim(), (65, 65));
//!
//! let rotated = rotate_mask(mask.view(), &RotationRequest::by(45.0))?;
//! assert_eq!(rotated.dim(), (91, 91));
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod coverage;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod interp;
pub mod mask;
pub mod occulter;
pub mod rotate;
pub mod spikes;
mod spline;

pub use coverage::{ArcsecExtent, CoverageMap};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink};
pub use error::MaskError;
pub use extract::{occulted_mask, ExtractionRequest, MaskExtractor};
pub use interp::{CubicSplineInterpolator, GridInterpolator};
pub use mask::{binarize, is_binary, Mask};
pub use occulter::{occulter_location, supported_occulters, OcculterEntry};
pub use rotate::{rotate_mask, MaskRotator, RasterRotator, RotationRequest, SplineRotator};
pub use spikes::{make_diffraction_spikes, DiffractionSpikes};
