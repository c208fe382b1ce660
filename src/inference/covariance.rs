//! inference::covariance — parameter covariance and conditioning for
//! least-squares fits.
//!
//! Purpose
//! -------
//! Turn the residual Jacobian of a converged least-squares fit into a
//! parameter covariance matrix and the derived summaries reported with a
//! backtrace fit: standard errors, correlation matrix and the log10
//! condition number. Linear algebra runs in `nalgebra`; inputs and outputs
//! stay in `ndarray`.
//!
//! Key behaviors
//! -------------
//! - [`least_squares_covariance`] computes `s² · (JᵀJ)⁺` with
//!   `s² = SSR / (N − p)`.
//! - The pseudo-inverse is formed from a symmetric eigendecomposition;
//!   eigenvalues below `EIGEN_EPS · λ_max` are dropped, so weakly
//!   identified directions do not blow up the matrix.
//! - [`rescale_covariance`] maps a covariance to another parameter scale
//!   through `C' = D C D` with `D = diag(scales)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Jacobians are `N × p` with `N > p` and finite entries; violations
//!   are reported as [`InferenceError`].
//! - Covariances passed to the summary helpers are symmetric `p × p`.
//!
//! Conventions
//! -----------
//! - No explicit matrix inverse is formed.
//! - A zero variance yields `NaN` correlations in its row and column and an
//!   infinite condition number.
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::numerical_stability::transformations::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// least_squares_covariance — `s² (JᵀJ)⁺` at the fitted parameters.
///
/// Parameters
/// ----------
/// - `jacobian`: `&Array2<f64>`
///   `N × p` Jacobian of the model (or residuals; the sign cancels).
/// - `ssr`: `f64`
///   Sum of squared residuals at the fit.
///
/// Returns
/// -------
/// `InferenceResult<Array2<f64>>`
///   Symmetric `p × p` covariance matrix.
///
/// Errors
/// ------
/// - `InferenceError::InsufficientDegreesOfFreedom` when `N ≤ p`.
/// - `InferenceError::NonFiniteEntry` for a non-finite Jacobian entry.
pub fn least_squares_covariance(jacobian: &Array2<f64>, ssr: f64) -> InferenceResult<Array2<f64>> {
    let (n, p) = jacobian.dim();
    if n <= p {
        return Err(InferenceError::InsufficientDegreesOfFreedom { observations: n, params: p });
    }
    check_finite(jacobian)?;
    let s2 = ssr / (n - p) as f64;
    let jtj = jacobian.t().dot(jacobian);
    Ok(pseudo_inverse(&jtj) * s2)
}

/// Moore–Penrose pseudo-inverse of a symmetric positive semi-definite
/// matrix via eigenvalue truncation.
pub fn pseudo_inverse(sym: &Array2<f64>) -> Array2<f64> {
    let p = sym.nrows();
    let mut nalg = DMatrix::<f64>::zeros(p, p);
    fill_dmatrix(sym, &mut nalg);
    let eigen = nalg.symmetric_eigen();
    let q = eigen.eigenvectors;
    let lambdas = eigen.eigenvalues;
    let lambda_max = lambdas.iter().fold(0.0_f64, |acc, l| acc.max(*l));
    let cutoff = EIGEN_EPS * lambda_max;

    let mut out = Array2::<f64>::zeros((p, p));
    for (k, &lambda) in lambdas.iter().enumerate() {
        if lambda <= cutoff || lambda <= 0.0 {
            continue;
        }
        for i in 0..p {
            let qi = q[(i, k)] / lambda;
            for j in 0..p {
                out[[i, j]] += qi * q[(j, k)];
            }
        }
    }
    out
}

/// rescale_covariance — `C' = D C D` with `D = diag(scales)`.
///
/// Errors
/// ------
/// - `InferenceError::ShapeMismatch` if `scales` does not match the
///   covariance dimension.
pub fn rescale_covariance(cov: &Array2<f64>, scales: &[f64]) -> InferenceResult<Array2<f64>> {
    let p = cov.nrows();
    if cov.ncols() != p || scales.len() != p {
        return Err(InferenceError::ShapeMismatch { expected: (p, p), found: (scales.len(), p) });
    }
    let mut out = cov.clone();
    for ((i, j), value) in out.indexed_iter_mut() {
        *value *= scales[i] * scales[j];
    }
    Ok(out)
}

/// Square roots of the diagonal; negative round-off is clamped to zero.
pub fn standard_errors(cov: &Array2<f64>) -> Array1<f64> {
    cov.diag().mapv(|v| v.max(0.0).sqrt())
}

/// correlation_matrix — `C_ij / (σ_i σ_j)`.
pub fn correlation_matrix(cov: &Array2<f64>) -> Array2<f64> {
    let sigma = standard_errors(cov);
    let mut out = cov.clone();
    for ((i, j), value) in out.indexed_iter_mut() {
        let denom = sigma[i] * sigma[j];
        *value = if denom > 0.0 { *value / denom } else { f64::NAN };
    }
    out
}

/// log10_condition_number — `log10(|λ|_max / |λ|_min)` of a symmetric
/// matrix.
///
/// Returns `+∞` when the smallest eigenvalue magnitude is zero and `NaN`
/// for an empty matrix.
pub fn log10_condition_number(sym: &Array2<f64>) -> f64 {
    let p = sym.nrows();
    if p == 0 {
        return f64::NAN;
    }
    let mut nalg = DMatrix::<f64>::zeros(p, p);
    fill_dmatrix(sym, &mut nalg);
    let lambdas = nalg.symmetric_eigenvalues();
    let (min, max) = lambdas
        .iter()
        .map(|l| l.abs())
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), l| (lo.min(l), hi.max(l)));
    if min == 0.0 { f64::INFINITY } else { (max / min).log10() }
}

// ---- Helper methods ----

/// Copy a square `ndarray` matrix into a preallocated `DMatrix`,
/// column by column.
fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    let n = src.ncols();
    for j in 0..n {
        for i in 0..n {
            dst[(i, j)] = src[[i, j]];
        }
    }
}

fn check_finite(mat: &Array2<f64>) -> InferenceResult<()> {
    match mat.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(InferenceError::NonFiniteEntry { row, col, value }),
        None => Ok(()),
    }
}
