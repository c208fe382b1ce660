//! Errors for the statistics aggregator.
//!
//! This module defines [`StatsError`] and the alias [`StatsResult<T>`].
//! Statistics over undefined cells are reported as `NaN`; errors are kept
//! for structural problems with the inputs (shapes, empty inputs, invalid
//! weights).
use statrs::distribution::NormalError;

/// Result alias for statistics operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Unified error type for return statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    // ---- Shapes ----
    /// Input sizes disagree (`what` names the mismatched dimension).
    DimensionMismatch { what: &'static str, expected: usize, found: usize },

    /// Return matrices start at different origin ticks.
    OriginMismatch { expected: i64, found: i64 },

    /// No input matrices or no observations.
    EmptyInput { what: &'static str },

    // ---- Values ----
    /// Portfolio weights must be finite.
    NonFiniteWeight { index: usize, value: f64 },

    /// Band multipliers must be finite.
    NonFiniteMultiplier { index: usize, value: f64 },

    /// Wrapper for statrs::distribution::NormalError
    InvalidNormalParam,
}

impl std::error::Error for StatsError {}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shapes ----
            StatsError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch in {what}: expected {expected}, found {found}.")
            }
            StatsError::OriginMismatch { expected, found } => write!(
                f,
                "Return matrices must share their first origin: expected tick {expected}, found {found}."
            ),
            StatsError::EmptyInput { what } => write!(f, "No {what} provided."),

            // ---- Values ----
            StatsError::NonFiniteWeight { index, value } => {
                write!(f, "Weight at index {index} is non-finite: {value}")
            }
            StatsError::NonFiniteMultiplier { index, value } => {
                write!(f, "Band multiplier at index {index} is non-finite: {value}")
            }
            StatsError::InvalidNormalParam => write!(
                f,
                "Normal reference distribution requires a finite mean and a positive standard deviation."
            ),
        }
    }
}

impl From<NormalError> for StatsError {
    fn from(_: NormalError) -> StatsError {
        StatsError::InvalidNormalParam
    }
}
