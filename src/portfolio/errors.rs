//! Errors for securities, portfolios and the batch runner.
//!
//! [`PortfolioError`] covers lookup and pipeline-order problems of the
//! orchestration layer and wraps the engine errors
//! ([`SeriesError`], [`BacktraceError`], [`StatsError`]) so a security's
//! pipeline can use `?` across stages.
use crate::{backtrace::errors::BacktraceError, series::errors::SeriesError, stats::errors::StatsError};

/// Result alias for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Unified error type for the orchestration layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioError {
    // ---- Lookup ----
    /// No security with this name.
    UnknownSecurity { name: String },

    /// A security with this name is already held.
    DuplicateSecurity { name: String },

    /// The benchmark named by a backtrace operation is not held.
    MissingBenchmark { name: String },

    // ---- Pipeline order ----
    /// A stage ran before the stage it depends on.
    MissingStage { name: String, stage: &'static str },

    /// Return matrices share no origin tick.
    NoCommonOrigins { first: i64, last: i64 },

    /// The benchmark holds fewer points than the security it would extend.
    ShortBenchmark { name: String, benchmark_points: usize, security_points: usize },

    // ---- Weights ----
    /// Weights must be finite.
    InvalidWeight { name: String, value: f64 },

    // ---- Wrapped ----
    Series(SeriesError),
    Backtrace(BacktraceError),
    Stats(StatsError),
}

impl std::error::Error for PortfolioError {}

impl std::fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Lookup ----
            PortfolioError::UnknownSecurity { name } => write!(f, "Unknown security '{name}'."),
            PortfolioError::DuplicateSecurity { name } => {
                write!(f, "Security '{name}' is already in the portfolio.")
            }
            PortfolioError::MissingBenchmark { name } => {
                write!(f, "Benchmark '{name}' is not in the portfolio.")
            }

            // ---- Pipeline order ----
            PortfolioError::MissingStage { name, stage } => {
                write!(f, "Security '{name}' has no {stage} yet.")
            }
            PortfolioError::NoCommonOrigins { first, last } => write!(
                f,
                "Return matrices share no origin: latest start {first} is after earliest end {last}."
            ),
            PortfolioError::ShortBenchmark { name, benchmark_points, security_points } => write!(
                f,
                "Cannot backtrace '{name}': benchmark has {benchmark_points} points, \
                 security has {security_points}."
            ),

            // ---- Weights ----
            PortfolioError::InvalidWeight { name, value } => {
                write!(f, "Weight of '{name}' must be finite, got {value}.")
            }

            // ---- Wrapped ----
            PortfolioError::Series(e) => write!(f, "{e}"),
            PortfolioError::Backtrace(e) => write!(f, "{e}"),
            PortfolioError::Stats(e) => write!(f, "{e}"),
        }
    }
}

impl From<SeriesError> for PortfolioError {
    fn from(err: SeriesError) -> Self {
        PortfolioError::Series(err)
    }
}

impl From<BacktraceError> for PortfolioError {
    fn from(err: BacktraceError) -> Self {
        PortfolioError::Backtrace(err)
    }
}

impl From<StatsError> for PortfolioError {
    fn from(err: StatsError) -> Self {
        PortfolioError::Stats(err)
    }
}
