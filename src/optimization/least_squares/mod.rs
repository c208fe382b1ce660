//! least_squares — argmin-powered nonlinear least-squares optimizer.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed layer for **minimizing sums of
//! squared residuals** `c(θ) = Σ r_i(θ)²`. Callers implement a single
//! trait, [`LeastSquares`], and invoke [`minimize`] to run L-BFGS with a
//! configurable line search, tolerances, and a finite-difference fallback.
//!
//! Key behaviors
//! -------------
//! - Convert residual models into Argmin cost functions via
//!   [`adapter::ArgMinAdapter`]; the gradient is `2 Jᵀ r` when an analytic
//!   Jacobian exists.
//! - [`minimize`] validates the initial guess with
//!   [`LeastSquares::check`], builds the solver with [`run::build_lbfgs`],
//!   runs it via [`run::run_lbfgs`] and normalizes the result into an
//!   [`OptimOutcome`].
//! - [`finite_diff`] supplies gradients when the Jacobian is missing.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters live in an unconstrained space; box constraints are
//!   handled by the model through
//!   [`numerical_stability`](crate::optimization::numerical_stability).
//! - Residual models report invalid inputs as [`OptError`] values, never
//!   panics.
//! - A run that hits `max_iter` is not an error here; it is reported with
//!   `converged == false` and the caller decides.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover gradient wiring in [`adapter`], solver
//!   setup in [`run`], derivative fallbacks in [`finite_diff`],
//!   configuration invariants in [`traits`] and toy curve fits in [`api`].
//!
//! [`OptError`]: crate::optimization::errors::OptError

pub mod adapter;
pub mod api;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::traits::{
    LeastSquares, LineSearcher, OptimOutcome, SolverOptions, Tolerances, sum_of_squares,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Jacobian, Residuals, Theta};

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{LeastSquares, LineSearcher, OptimOutcome, SolverOptions, Tolerances};
    pub use super::types::{Jacobian, Residuals, Theta};
}
