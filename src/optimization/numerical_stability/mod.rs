//! numerical_stability — box transforms and shared numeric tolerances.
//!
//! Purpose
//! -------
//! Collect numerically stable scalar transforms used to keep bounded model
//! parameters inside their admissible box while the solver works in an
//! unconstrained space, together with the small tolerances shared by the
//! optimizer and covariance code.
//!
//! Key behaviors
//! -------------
//! - Provide a stable logistic map and its clamped inverse.
//! - Provide the affine box map `θ ↦ lo + (hi − lo)·σ(θ)`, its inverse and
//!   its derivative for chain-rule Jacobians.
//! - Centralize `LOGIT_EPS` and `EIGEN_EPS`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All transforms assume finite `f64` inputs and `lo < hi`; bound
//!   validation happens in the model layer.
//! - Boundary values passed to the inverse map are clamped, never rejected.
//!
//! Conventions
//! -----------
//! - Pure functions only; no logging, no allocation.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] check agreement with naive formulas,
//!   tail saturation and derivative consistency against finite differences.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, LOGIT_EPS, bounded_derivative, from_bounded, safe_logistic, safe_logit, to_bounded,
};

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, LOGIT_EPS, bounded_derivative, from_bounded, to_bounded,
    };
}
