//! Errors for the backtrace fitter (input overlap, model selection,
//! solver failures and the orthogonality search).
//!
//! This module defines [`BacktraceError`] and the alias
//! [`BacktraceResult<T>`]. Errors from the lower layers (series handling,
//! the least-squares optimizer and covariance inference) are wrapped through
//! `From` conversions so the fitter can use `?` throughout.
//!
//! ## Conventions
//! - Ticks are days since 1952-01-01, as everywhere in the crate.
//! - A solver run that stops without meeting its tolerances is reported as
//!   [`BacktraceError::FitConvergence`] carrying the solver's own status.
use crate::{
    inference::errors::InferenceError, optimization::errors::OptError,
    series::errors::SeriesError,
};

/// Result alias for backtrace operations.
pub type BacktraceResult<T> = Result<T, BacktraceError>;

/// Unified error type for backtrace fitting.
#[derive(Debug, Clone, PartialEq)]
pub enum BacktraceError {
    // ---- Model selection ----
    /// Model name did not match a known family.
    UnsupportedModel { name: String },

    // ---- Input overlap ----
    /// The index must start at least one tick before the security.
    InsufficientOverlap { index_first: i64, security_first: i64 },

    /// The fit window must hold more points than parameters.
    WindowTooShort { points: usize, params: usize },

    /// Normalizing scale (maximum of a series or the time span) must be > 0.
    NonPositiveScale { which: &'static str, value: f64 },

    // ---- Solver ----
    /// The least-squares solver stopped without converging.
    FitConvergence { status: String },

    /// The orthogonality grid search exhausted its iteration or drift budget.
    OrthogonalitySearch { window: [f64; 4], iterations: usize },

    // ---- Options ----
    /// An option value is outside its admissible range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    // ---- Wrapped ----
    Series(SeriesError),
    Optimization(OptError),
    Inference(InferenceError),
}

impl std::error::Error for BacktraceError {}

impl std::fmt::Display for BacktraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Model selection ----
            BacktraceError::UnsupportedModel { name } => {
                write!(f, "Unsupported model '{name}'. Valid options are 'exp' or 'osc'.")
            }

            // ---- Input overlap ----
            BacktraceError::InsufficientOverlap { index_first, security_first } => write!(
                f,
                "Index starts at tick {index_first}, which is not before the security start {security_first}."
            ),
            BacktraceError::WindowTooShort { points, params } => write!(
                f,
                "Fit window holds {points} points but the model has {params} parameters."
            ),
            BacktraceError::NonPositiveScale { which, value } => {
                write!(f, "Scale '{which}' must be strictly positive, got {value}.")
            }

            // ---- Solver ----
            BacktraceError::FitConvergence { status } => {
                write!(f, "Backtrace fit did not converge: {status}")
            }
            BacktraceError::OrthogonalitySearch { window, iterations } => write!(
                f,
                "Orthogonality search failed after {iterations} iterations; last window \
                 ratio [{}, {}], phase [{}, {}].",
                window[0], window[1], window[2], window[3]
            ),

            // ---- Options ----
            BacktraceError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid option {name} = {value}: {reason}")
            }

            // ---- Wrapped ----
            BacktraceError::Series(e) => write!(f, "{e}"),
            BacktraceError::Optimization(e) => write!(f, "{e}"),
            BacktraceError::Inference(e) => write!(f, "{e}"),
        }
    }
}

impl From<SeriesError> for BacktraceError {
    fn from(err: SeriesError) -> Self {
        BacktraceError::Series(err)
    }
}

impl From<OptError> for BacktraceError {
    fn from(err: OptError) -> Self {
        BacktraceError::Optimization(err)
    }
}

impl From<InferenceError> for BacktraceError {
    fn from(err: InferenceError) -> Self {
        BacktraceError::Inference(err)
    }
}
