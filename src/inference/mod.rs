//! inference — post-fit uncertainty for least-squares models.
//!
//! Purpose
//! -------
//! Provide the covariance machinery used after a backtrace fit: the
//! least-squares parameter covariance `s² (JᵀJ)⁺`, its rescaling into the
//! original value/time units, and the summaries reported alongside it
//! (standard errors, correlations, condition number).
//!
//! Invariants & assumptions
//! ------------------------
//! - Jacobians are `N × p` with `N > p`; covariances are symmetric `p × p`.
//! - All routines are pure and report failures through
//!   [`InferenceResult`].
//!
//! Testing notes
//! -------------
//! - Unit tests in [`covariance`] check the pseudo-inverse against closed
//!   forms and the covariance against ordinary linear regression.

pub mod covariance;
pub mod errors;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::covariance::{
    correlation_matrix, least_squares_covariance, log10_condition_number, pseudo_inverse,
    rescale_covariance, standard_errors,
};
pub use self::errors::{InferenceError, InferenceResult};

pub mod prelude {
    pub use super::covariance::{least_squares_covariance, rescale_covariance, standard_errors};
    pub use super::errors::{InferenceError, InferenceResult};
}
