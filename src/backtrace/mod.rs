//! backtrace — extend a short price history using a benchmark index.
//!
//! Purpose
//! -------
//! Fit a security against an index on their overlap window and use the fit
//! to reconstruct the security's history over the index's earlier ticks.
//!
//! Key behaviors
//! -------------
//! - `model`: the `Exp` and `Osc` model families, analytic Jacobians and
//!   the bounded reparameterization used by the optimizer.
//! - `fitter`: the [`backtrace`] pipeline (window, fit, covariance,
//!   extension, join smoothing).
//! - `diagnostics`: [`FitResult`] and its residual statistics.
//! - `orthogonality`: correlation of the `Osc` growth and oscillation
//!   bases, and the grid search for the most orthogonal pair.
//! - `options` / `errors`: configuration and the [`BacktraceError`] surface.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are [`DenseSeries`](crate::series::DenseSeries) on the shared
//!   tick axis.
//! - The real security values are never altered in the extended series.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; the full pipeline from raw samples
//!   is exercised in `tests/integration_backtrace_pipeline.rs`.

pub mod diagnostics;
pub mod errors;
pub mod fitter;
pub mod model;
pub mod options;
pub mod orthogonality;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::diagnostics::FitResult;
pub use self::errors::{BacktraceError, BacktraceResult};
pub use self::fitter::{Backtrace, backtrace};
pub use self::model::ModelKind;
pub use self::options::{BacktraceOptions, FitOptions, OrthoSearchOptions};
pub use self::orthogonality::{
    BasisOrthogonality, OrthoOptimum, basis_correlation, search_orthogonal_basis,
};

pub mod prelude {
    pub use super::errors::{BacktraceError, BacktraceResult};
    pub use super::fitter::{Backtrace, backtrace};
    pub use super::model::ModelKind;
    pub use super::options::BacktraceOptions;
}
