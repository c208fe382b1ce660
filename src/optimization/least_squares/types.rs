//! least_squares::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! least-squares optimizer, so the rest of the optimization code stays
//! agnostic to `ndarray` and Argmin generics.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors, gradients, residual
//!   vectors, Jacobians and scalar costs.
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//!
//! Invariants & assumptions
//! ------------------------
//! - `Cost` is the sum of squared residuals; it is never negative.
//! - A `Jacobian` is `n_residuals × n_params`, entry `(i, j) = ∂r_i/∂θ_j`.
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ` in the unconstrained optimizer space.
pub type Theta = Array1<f64>;

/// Gradient of the cost, same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Residual vector `r(θ)`, one entry per observation.
pub type Residuals = Array1<f64>;

/// Residual Jacobian `∂r/∂θ`, `n_residuals × n_params`.
pub type Jacobian = Array2<f64>;

/// Scalar objective value: `c(θ) = Σ r_i(θ)²`.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;
