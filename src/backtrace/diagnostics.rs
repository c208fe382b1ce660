//! backtrace::diagnostics — goodness-of-fit summaries and the fit report.
//!
//! Holds [`FitResult`], the record returned with every backtrace, and the
//! residual statistics it carries: adjusted R² and the Durbin–Watson
//! statistic. Parameter uncertainty summaries come from
//! [`crate::inference::covariance`].
use crate::backtrace::{
    model::ModelKind,
    orthogonality::{BasisOrthogonality, OrthoOptimum},
};
use ndarray::{Array1, Array2, ArrayView1};

/// Report of one backtrace fit, in original value/time units.
///
/// Fields
/// ------
/// - `params`: fitted parameters, ordered as [`ModelKind::param_names`].
/// - `std_errors`, `covariance`, `correlation`: parameter uncertainty.
/// - `residuals`: `y − f` over the fit window.
/// - `ssr`, `r_squared`, `adj_r_squared`, `durbin_watson`: residual
///   statistics.
/// - `log10_condition`: `log10(|λ|max / |λ|min)` of `covariance`.
/// - `basis`: growth/oscillation correlations (`Osc` only).
/// - `ortho_search`: most orthogonal basis, when requested.
/// - `solver_status`, `iterations`: optimizer termination details.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub model: ModelKind,
    pub params: Array1<f64>,
    pub std_errors: Array1<f64>,
    pub covariance: Array2<f64>,
    pub correlation: Array2<f64>,
    pub residuals: Array1<f64>,
    pub ssr: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub durbin_watson: f64,
    pub log10_condition: f64,
    pub basis: Option<BasisOrthogonality>,
    pub ortho_search: Option<OrthoOptimum>,
    pub solver_status: String,
    pub iterations: usize,
}

impl FitResult {
    /// Fitted parameter by name, if the model has it.
    pub fn param(&self, name: &str) -> Option<f64> {
        self.model.param_names().iter().position(|p| *p == name).map(|i| self.params[i])
    }
}

/// `R² = 1 − SSR / SST`; `NaN` when `y` is constant.
pub fn r_squared(residuals: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    let mean = y.sum() / y.len() as f64;
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let ssr = residuals.dot(&residuals);
    if sst > 0.0 { 1.0 - ssr / sst } else { f64::NAN }
}

/// Adjusted R²: `1 − (1 − R²)(N − 1)/(N − p)`.
pub fn adjusted_r_squared(r_squared: f64, observations: usize, params: usize) -> f64 {
    let n = observations as f64;
    1.0 - (1.0 - r_squared) * (n - 1.0) / (n - params as f64)
}

/// Durbin–Watson statistic `Σ(eₜ − eₜ₋₁)² / Σeₜ²`.
///
/// Returns `NaN` for an all-zero residual vector.
pub fn durbin_watson(residuals: ArrayView1<'_, f64>) -> f64 {
    let denom = residuals.dot(&residuals);
    if denom == 0.0 {
        return f64::NAN;
    }
    let num: f64 = residuals.windows(2).into_iter().map(|w| (w[1] - w[0]).powi(2)).sum();
    num / denom
}
