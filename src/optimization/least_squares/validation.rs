//! Validation helpers for least-squares optimization.
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`] ensure
//!   numeric tolerances are finite and strictly positive when provided.
//! - **Derivative validation**: [`validate_grad`] and [`validate_jacobian`]
//!   enforce shapes and finite entries.
//! - **Residuals**: [`validate_residuals`] checks length and finiteness of
//!   a residual vector.
//! - **Parameter estimates**: [`validate_theta_hat`] ensures a candidate
//!   `theta_hat` exists and contains only finite values.
//! - **Objective values**: [`validate_value`] checks costs for finiteness.
use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::types::{Grad, Jacobian, Residuals, Theta},
};

/// Validate the optional gradient-norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost-change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] for the first non-finite element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate a residual vector: non-empty, expected length, finite.
///
/// # Errors
/// - [`OptError::ResidualLengthMismatch`] for a wrong or zero length.
/// - [`OptError::NonFiniteResidual`] for the first non-finite entry.
pub fn validate_residuals(residuals: &Residuals, expected: usize) -> OptResult<()> {
    if residuals.is_empty() || residuals.len() != expected {
        return Err(OptError::ResidualLengthMismatch { expected, found: residuals.len() });
    }
    if let Some((index, &value)) = residuals.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::NonFiniteResidual { index, value });
    }
    Ok(())
}

/// Validate the shape and entries of a residual Jacobian.
///
/// # Errors
/// - [`OptError::JacobianDimMismatch`] if the shape is not
///   `(n_residuals, n_params)`.
/// - [`OptError::InvalidJacobian`] for the first non-finite entry.
pub fn validate_jacobian(
    jacobian: &Jacobian, n_residuals: usize, n_params: usize,
) -> OptResult<()> {
    if jacobian.nrows() != n_residuals || jacobian.ncols() != n_params {
        return Err(OptError::JacobianDimMismatch {
            expected: (n_residuals, n_params),
            found: (jacobian.nrows(), jacobian.ncols()),
        });
    }
    for ((row, col), &value) in jacobian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidJacobian { row, col, value });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// Validate that a scalar cost is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
