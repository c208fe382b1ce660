//! optimization — least-squares stack, numerical helpers, and error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used by the backtrace fitter: an
//! Argmin-backed nonlinear least-squares optimizer, numerically stable box
//! transforms, and a single error/result surface.
//!
//! Key behaviors
//! -------------
//! - `least_squares`: minimize `Σ r_i(θ)²` with L-BFGS, configurable line
//!   search, tolerances and a finite-difference gradient fallback.
//! - `numerical_stability`: logistic box maps used to keep bounded
//!   parameters admissible while the solver works in `ℝⁿ`.
//! - `errors`: backend solver errors and configuration problems normalized
//!   into [`errors::OptError`] with the alias `OptResult<T>`.
//!
//! Conventions
//! -----------
//! - Parameters, gradients and Jacobians are `ndarray` types (`Theta`,
//!   `Grad`, `Jacobian`).
//! - Callers never see raw Argmin errors.
//! - This layer does not log except through the optional `obs_slog`
//!   observer.

pub mod errors;
pub mod least_squares;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::least_squares::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
