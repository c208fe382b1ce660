//! least_squares::finite_diff — finite-difference gradient fallback.
//!
//! Purpose
//! -------
//! Approximate the cost gradient when a residual model does not provide an
//! analytic Jacobian, with error capture and post-hoc validation, so the
//! adapter never depends on the `finitediff` API directly.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] tries central differences first and falls back to
//!   forward differences when the central pass fails validation or an
//!   evaluation errored.
//! - [`run_fd_diff`] computes the forward-difference gradient and surfaces
//!   any captured evaluation error.
//!
//! Invariants & assumptions
//! ------------------------
//! - The objective closure cannot return `Result`; it writes the first
//!   error into the shared `closure_err` cell and returns `NaN`.
//! - Gradients returned from this module satisfy [`validate_grad`].
use crate::optimization::{
    errors::OptResult,
    least_squares::{
        types::{Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// fd_gradient — central-difference gradient with forward fallback.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Point at which the gradient is approximated.
/// - `func`: `&G`
///   Cost closure routing evaluation errors into `closure_err`.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared error slot written by `func`.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   A validated gradient of length `theta.len()`.
///
/// Errors
/// ------
/// - Any error captured during the forward pass.
/// - `OptError::InvalidGradient` when the forward gradient is not finite.
pub fn fd_gradient<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let central = theta.central_diff(func);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, func, closure_err)
}

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// Errors
/// ------
/// - `OptError` (via `From<Error>`) when `closure_err` holds an error
///   captured inside `func`.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use argmin::core::ArgminError;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Central-difference accuracy on a smooth quadratic.
    // - Fallback and error propagation when the closure fails.
    // - Validation failures for non-finite gradients.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `fd_gradient` reproduces the analytic gradient of a quadratic.
    //
    // Given
    // -----
    // - `f(θ) = (θ₀ − 1)² + 3 θ₁²` at `θ = (2, −1)`.
    //
    // Expect
    // ------
    // - Gradient ≈ `(2, −6)`.
    fn fd_gradient_matches_quadratic() {
        // Arrange
        let theta: Theta = Array1::from(vec![2.0_f64, -1.0]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| (x[0] - 1.0).powi(2) + 3.0 * x[1] * x[1];

        // Act
        let grad = fd_gradient(&theta, &f, &closure_err).unwrap();

        // Assert
        assert_relative_eq!(grad[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(grad[1], -6.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // An error captured inside the closure surfaces as an `OptError`.
    fn closure_error_is_propagated() {
        // Arrange
        let theta: Theta = Array1::from(vec![1.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let argmin_err = ArgminError::NotImplemented { text: "fd test".to_string() };
            closure_err.replace(Some(argmin_err.into()));
            f64::NAN
        };

        // Act
        let result = fd_gradient(&theta, &f, &closure_err);

        // Assert
        match result {
            Err(OptError::Solver { kind: "not implemented", .. }) => {}
            other => panic!("Unexpected result from closure error: {other:?}"),
        }
    }

    #[test]
    fn non_finite_gradient_yields_invalid_gradient_error() {
        let theta: Theta = Array1::from(vec![0.0_f64, 1.0]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_x: &Theta| f64::NAN;

        let result = run_fd_diff(&theta, &f, &closure_err);

        assert!(matches!(result, Err(OptError::InvalidGradient { .. })));
    }
}
