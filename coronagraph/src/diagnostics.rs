//! Non-fatal warnings raised while extracting a mask.
//!
//! A poorly chosen occulter/POSTARG combination still produces a usable
//! coverage estimate, so these conditions never abort the pipeline. They are
//! handed to a [`DiagnosticSink`] supplied by the caller: [`LogSink`] forwards
//! them to the `log` facade, and a `Vec<Diagnostic>` collects them (handy in
//! tests and for planners that want to show them next to the result).

use std::fmt;

/// A warning about the requested pointing.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// The occulter center plus pointing offsets lies outside the detector.
    OutsideFieldOfView {
        occulter: String,
        postarg1: Option<f64>,
        postarg2: Option<f64>,
        x_center: f64,
        y_center: f64,
    },
    /// The target pixel is unobstructed in the input mask.
    NotOcculted {
        occulter: String,
        postarg1: Option<f64>,
        postarg2: Option<f64>,
        x_center: f64,
        y_center: f64,
    },
}

impl Diagnostic {
    /// Resolved target position `(x, y)` in detector pixels.
    pub fn center(&self) -> (f64, f64) {
        match self {
            Diagnostic::OutsideFieldOfView {
                x_center, y_center, ..
            }
            | Diagnostic::NotOcculted {
                x_center, y_center, ..
            } => (*x_center, *y_center),
        }
    }
}

fn fmt_postarg(postarg: Option<f64>) -> String {
    match postarg {
        Some(v) => format!("{v}"),
        None => "unset".to_string(),
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OutsideFieldOfView {
                occulter,
                postarg1,
                postarg2,
                x_center,
                y_center,
            } => write!(
                f,
                "The input combination ({occulter} with POSTARG1 = {} and POSTARG2 = {}) puts \
                 your target beyond the STIS field of view (center at x = {x_center:.2}, \
                 y = {y_center:.2}). Coverage is still computed; check the exposure time in \
                 your Phase 2.",
                fmt_postarg(*postarg1),
                fmt_postarg(*postarg2),
            ),
            Diagnostic::NotOcculted {
                occulter,
                postarg1,
                postarg2,
                x_center,
                y_center,
            } => write!(
                f,
                "The input combination ({occulter} with POSTARG1 = {} and POSTARG2 = {}) cannot \
                 put your target behind any STIS occulter (center at x = {x_center:.2}, \
                 y = {y_center:.2}). Coverage is still computed; check the exposure time in \
                 your Phase 2.",
                fmt_postarg(*postarg1),
                fmt_postarg(*postarg2),
            ),
        }
    }
}

/// Receiver for pipeline diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `log::warn!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
