//! Unified error type for lap analysis.
//!
//! Only structural failures are errors. Sparse data (too few laps for a
//! regression, nothing left after pace cleaning) produces empty or neutral
//! results instead.

use thiserror::Error;

/// Errors returned by the analysis functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The two traces share no distance range.
    #[error("traces do not overlap (shared range {lo:.1}..{hi:.1} m)")]
    EmptyOverlap { lo: f64, hi: f64 },

    /// The two series cannot be compared point by point.
    #[error("insufficient samples: {first_len} vs {second_len} points")]
    InsufficientSamples { first_len: usize, second_len: usize },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A driver referenced by the caller has no data.
    #[error("driver '{0}' not found")]
    UnknownDriver(String),

    /// No trace is stored under the requested lap.
    #[error("no trace stored for lap {0}")]
    MissingTrace(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Convert missing ranges into `EmptyOverlap`.
pub trait OptionExt<T> {
    fn ok_or_empty_overlap(self, lo: f64, hi: f64) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_empty_overlap(self, lo: f64, hi: f64) -> Result<T> {
        self.ok_or(AnalysisError::EmptyOverlap { lo, hi })
    }
}
