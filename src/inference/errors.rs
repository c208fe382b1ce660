//! Unified error handling for inference routines.
//!
//! This module defines `InferenceError`, the error type used by the
//! least-squares covariance and diagnostics helpers, together with the
//! alias `InferenceResult<T>`.

/// Unified error type for inference routines.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Degrees of freedom ----
    /// Residual variance needs more observations than parameters.
    InsufficientDegreesOfFreedom {
        observations: usize,
        params: usize,
    },

    // ---- Shapes ----
    /// Matrix shape does not match what the routine expects.
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    // ---- Numerical ----
    /// Input matrix contains a non-finite entry.
    NonFiniteEntry {
        row: usize,
        col: usize,
        value: f64,
    },
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Degrees of freedom ----
            InferenceError::InsufficientDegreesOfFreedom { observations, params } => write!(
                f,
                "Inference Error: {observations} observations leave no residual degrees of freedom for {params} parameters"
            ),

            // ---- Shapes ----
            InferenceError::ShapeMismatch { expected, found } => {
                write!(f, "Inference Error: expected shape {expected:?}, found {found:?}")
            }

            // ---- Numerical ----
            InferenceError::NonFiniteEntry { row, col, value } => {
                write!(f, "Inference Error: non-finite entry {value} at ({row}, {col})")
            }
        }
    }
}
