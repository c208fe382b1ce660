//! backtrace::model — model families, parameter maps and the residual
//! model handed to the least-squares optimizer.
//!
//! Purpose
//! -------
//! Describe the two backtrace model families and everything the optimizer
//! needs to fit them: the model function and its analytic Jacobian, the
//! box constraints on the oscillation parameters, and the reparameterization
//! that lets an unconstrained solver respect those boxes.
//!
//! Key behaviors
//! -------------
//! - [`ModelKind::Exp`]: `f = (a·x + b·x_lag) · exp(r·τ)`, parameters
//!   `[a, b, r]`.
//! - [`ModelKind::Osc`]: `f = (a·x + b·x_lag) · (exp(r·τ) + A·sin(2π(ω·τ + φ)))`,
//!   parameters `[a, b, r, A, φ, ω]`.
//! - [`BacktraceModel`] implements
//!   [`LeastSquares`](crate::optimization::least_squares::LeastSquares) with
//!   residuals `y − f` and the chain-ruled Jacobian `−∂f/∂p · dp/dθ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `a`, `b`, `r` are unbounded; `A ∈ [0, 1]`, `φ ∈ [0, 1]` and
//!   `ω ∈ [1/(1−τ₀), T/2]` hold for every optimizer iterate because the
//!   bounded coordinates pass through the logistic box map.
//! - [`FitData`] arrays share one length and are finite.
//!
//! Conventions
//! -----------
//! - "Model space" means normalized values and `τ = tick / T`; the same
//!   formula evaluated with original-scale parameters and raw ticks gives
//!   the original-scale model, which is how the extension is produced.
//! - Parameter vectors are ordered as listed above.
use crate::{
    backtrace::errors::BacktraceError,
    optimization::{
        errors::{OptError, OptResult},
        least_squares::{
            traits::LeastSquares,
            types::{Jacobian, Residuals, Theta},
        },
        numerical_stability::transformations::{bounded_derivative, from_bounded, to_bounded},
    },
};
use ndarray::{Array1, Array2, ArrayView1};
use std::{f64::consts::PI, str::FromStr};

const TWO_PI: f64 = 2.0 * PI;

/// Initial oscillation amplitude.
const INITIAL_AMPLITUDE: f64 = 0.05;

/// Initial oscillation phase (a quarter cycle).
const INITIAL_PHASE: f64 = 0.25;

/// Backtrace model family.
///
/// Parsing accepts case-insensitive `"exp"` and `"osc"`; unknown names
/// return [`BacktraceError::UnsupportedModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    Exp,
    #[default]
    Osc,
}

impl ModelKind {
    pub fn n_params(&self) -> usize {
        match self {
            ModelKind::Exp => 3,
            ModelKind::Osc => 6,
        }
    }

    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            ModelKind::Exp => &["a", "b", "r"],
            ModelKind::Osc => &["a", "b", "r", "amplitude", "phase", "frequency"],
        }
    }

    /// Per-parameter factors mapping model-space parameters to original
    /// scale: `a, b × ymax/xmax`, `r, ω × 1/T`, `A, φ × 1`.
    pub fn scale_factors(&self, value_ratio: f64, span: f64) -> Vec<f64> {
        let time = 1.0 / span;
        match self {
            ModelKind::Exp => vec![value_ratio, value_ratio, time],
            ModelKind::Osc => vec![value_ratio, value_ratio, time, 1.0, 1.0, time],
        }
    }
}

impl FromStr for ModelKind {
    type Err = BacktraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exp" => Ok(ModelKind::Exp),
            "osc" => Ok(ModelKind::Osc),
            _ => Err(BacktraceError::UnsupportedModel { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Exp => write!(f, "exp"),
            ModelKind::Osc => write!(f, "osc"),
        }
    }
}

/// Normalized window data for one fit.
///
/// Fields
/// ------
/// - `x`, `x_lag`: index values at each window tick and one tick earlier,
///   divided by the index maximum.
/// - `y`: security values divided by their maximum.
/// - `tau`: window ticks divided by `span`.
/// - `span`: last window tick `T`.
/// - `frequency_bounds`: admissible `ω` range `[1/(1−τ₀), T/2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitData {
    pub x: Array1<f64>,
    pub x_lag: Array1<f64>,
    pub y: Array1<f64>,
    pub tau: Array1<f64>,
    pub span: f64,
    pub frequency_bounds: (f64, f64),
}

impl FitData {
    /// Bundle normalized window arrays and derive the frequency bounds.
    ///
    /// # Errors
    /// - [`BacktraceError::WindowTooShort`] for fewer than two points.
    /// - [`BacktraceError::NonPositiveScale`] for a non-positive `span`.
    pub fn new(
        x: Array1<f64>, x_lag: Array1<f64>, y: Array1<f64>, tau: Array1<f64>, span: f64,
    ) -> Result<Self, BacktraceError> {
        if tau.len() < 2 {
            return Err(BacktraceError::WindowTooShort { points: tau.len(), params: 2 });
        }
        if !(span > 0.0) {
            return Err(BacktraceError::NonPositiveScale { which: "span", value: span });
        }
        let tau0 = tau[0];
        let frequency_bounds = (1.0 / (1.0 - tau0), 0.5 * span);
        Ok(Self { x, x_lag, y, tau, span, frequency_bounds })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// First normalized window time `τ₀`.
    pub fn tau0(&self) -> f64 {
        self.tau[0]
    }
}

/// evaluate — one model value.
///
/// The formula is scale-free: with model-space parameters pass normalized
/// `x`, `x_lag` and `τ`; with original-scale parameters pass raw values and
/// ticks.
pub fn evaluate(
    kind: ModelKind, params: ArrayView1<'_, f64>, x: f64, x_lag: f64, t: f64,
) -> f64 {
    let level = params[0] * x + params[1] * x_lag;
    let growth = (params[2] * t).exp();
    match kind {
        ModelKind::Exp => level * growth,
        ModelKind::Osc => {
            let wave = (TWO_PI * (params[5] * t + params[4])).sin();
            level * (growth + params[3] * wave)
        }
    }
}

/// Model values over the whole window.
pub fn model_values(
    kind: ModelKind, params: ArrayView1<'_, f64>, data: &FitData,
) -> Array1<f64> {
    Array1::from_iter(
        (0..data.len()).map(|i| evaluate(kind, params, data.x[i], data.x_lag[i], data.tau[i])),
    )
}

/// model_jacobian — `∂f/∂p` over the window (`N × p`).
pub fn model_jacobian(
    kind: ModelKind, params: ArrayView1<'_, f64>, data: &FitData,
) -> Array2<f64> {
    let n = data.len();
    let mut jac = Array2::<f64>::zeros((n, kind.n_params()));
    for i in 0..n {
        let (x, x_lag, t) = (data.x[i], data.x_lag[i], data.tau[i]);
        let level = params[0] * x + params[1] * x_lag;
        let growth = (params[2] * t).exp();
        match kind {
            ModelKind::Exp => {
                jac[[i, 0]] = x * growth;
                jac[[i, 1]] = x_lag * growth;
                jac[[i, 2]] = level * t * growth;
            }
            ModelKind::Osc => {
                let (amplitude, phase, frequency) = (params[3], params[4], params[5]);
                let arg = TWO_PI * (frequency * t + phase);
                let (wave, slope) = arg.sin_cos();
                let carrier = growth + amplitude * wave;
                jac[[i, 0]] = x * carrier;
                jac[[i, 1]] = x_lag * carrier;
                jac[[i, 2]] = level * t * growth;
                jac[[i, 3]] = level * wave;
                jac[[i, 4]] = level * amplitude * TWO_PI * slope;
                jac[[i, 5]] = level * amplitude * TWO_PI * t * slope;
            }
        }
    }
    jac
}

/// Box bounds of the oscillation parameters `[A, φ, ω]`.
fn osc_bounds(data: &FitData) -> [(f64, f64); 3] {
    [(0.0, 1.0), (0.0, 1.0), data.frequency_bounds]
}

/// Map an unconstrained optimizer vector to model parameters.
pub fn to_model_params(kind: ModelKind, theta: &Theta, data: &FitData) -> Array1<f64> {
    let mut params = theta.clone();
    if kind == ModelKind::Osc {
        for (offset, (lo, hi)) in osc_bounds(data).into_iter().enumerate() {
            params[3 + offset] = to_bounded(theta[3 + offset], lo, hi);
        }
    }
    params
}

/// Inverse of [`to_model_params`]; bounded values are clamped into the box.
pub fn to_theta(kind: ModelKind, params: &Array1<f64>, data: &FitData) -> Theta {
    let mut theta = params.clone();
    if kind == ModelKind::Osc {
        for (offset, (lo, hi)) in osc_bounds(data).into_iter().enumerate() {
            theta[3 + offset] = from_bounded(params[3 + offset], lo, hi);
        }
    }
    theta
}

/// initial_params — starting point in model space.
///
/// `a` is the no-intercept least-squares ratio `Σxy / Σx²`, `b = r = 0`;
/// the oscillation starts small (`A = 0.05`, `φ = 0.25`) at one and a half
/// cycles over the window, kept inside the frequency box.
pub fn initial_params(kind: ModelKind, data: &FitData) -> Array1<f64> {
    let sxx = data.x.dot(&data.x);
    let ratio = if sxx > 0.0 { data.x.dot(&data.y) / sxx } else { 1.0 };
    match kind {
        ModelKind::Exp => Array1::from(vec![ratio, 0.0, 0.0]),
        ModelKind::Osc => {
            let (lo, hi) = data.frequency_bounds;
            let frequency = (1.5 * lo).min(0.5 * (lo + hi));
            Array1::from(vec![ratio, 0.0, 0.0, INITIAL_AMPLITUDE, INITIAL_PHASE, frequency])
        }
    }
}

/// Residual model `r(θ) = y − f(p(θ))` for one model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktraceModel {
    pub kind: ModelKind,
}

impl BacktraceModel {
    pub fn new(kind: ModelKind) -> Self {
        Self { kind }
    }
}

impl LeastSquares for BacktraceModel {
    type Data = FitData;

    fn residuals(&self, theta: &Theta, data: &FitData) -> OptResult<Residuals> {
        let params = to_model_params(self.kind, theta, data);
        Ok(&data.y - &model_values(self.kind, params.view(), data))
    }

    fn check(&self, theta: &Theta, data: &FitData) -> OptResult<()> {
        let expected = self.kind.n_params();
        if theta.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
        }
        let n = data.len();
        for len in [data.x.len(), data.x_lag.len(), data.tau.len()] {
            if len != n {
                return Err(OptError::ResidualLengthMismatch { expected: n, found: len });
            }
        }
        Ok(())
    }

    fn jacobian(&self, theta: &Theta, data: &FitData) -> OptResult<Jacobian> {
        let params = to_model_params(self.kind, theta, data);
        let mut jac = model_jacobian(self.kind, params.view(), data);
        if self.kind == ModelKind::Osc {
            for (offset, (lo, hi)) in osc_bounds(data).into_iter().enumerate() {
                let d = bounded_derivative(theta[3 + offset], lo, hi);
                jac.column_mut(3 + offset).mapv_inplace(|v| v * d);
            }
        }
        jac.mapv_inplace(|v| -v);
        Ok(jac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::aview1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Model selection by name.
    // - The analytic Jacobian against central differences, in model space
    //   and through the bounded reparameterization.
    // - The parameter maps and the initial guess.
    // -------------------------------------------------------------------------

    fn window(n: usize) -> FitData {
        let start = 40.0;
        let span = start + (n - 1) as f64;
        let ticks: Vec<f64> = (0..n).map(|i| start + i as f64).collect();
        let x = Array1::from_iter(ticks.iter().map(|t| 0.5 + 0.01 * t));
        let x_lag = Array1::from_iter(ticks.iter().map(|t| 0.5 + 0.01 * (t - 1.0)));
        let y = Array1::from_iter(ticks.iter().map(|t| 0.4 + 0.012 * t));
        let tau = Array1::from_iter(ticks.iter().map(|t| t / span));
        FitData::new(x, x_lag, y, tau, span).unwrap()
    }

    #[test]
    fn model_kind_parses_case_insensitively() {
        assert_eq!("EXP".parse::<ModelKind>().unwrap(), ModelKind::Exp);
        assert_eq!("osc".parse::<ModelKind>().unwrap(), ModelKind::Osc);
        assert_eq!(
            "spline".parse::<ModelKind>(),
            Err(BacktraceError::UnsupportedModel { name: "spline".to_string() })
        );
        assert_eq!(ModelKind::default(), ModelKind::Osc);
    }

    #[test]
    fn frequency_bounds_span_one_cycle_to_nyquist() {
        let data = window(21);

        let (lo, hi) = data.frequency_bounds;

        // τ₀ = 40/60, so one cycle over the window is ω = 3; Nyquist is T/2 = 30.
        assert_relative_eq!(lo, 3.0, epsilon = 1e-12);
        assert_relative_eq!(hi, 30.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The analytic Jacobian must match central differences of the model.
    //
    // Given
    // -----
    // - A 21-point window and an interior Osc parameter vector.
    //
    // Expect
    // ------
    // - Every column agrees with a central difference to 1e-6.
    fn model_jacobian_matches_central_differences() {
        // Arrange
        let data = window(21);
        let params = [0.9, 0.2, 0.3, 0.1, 0.35, 4.0];
        let h = 1e-6;

        // Act
        let jac = model_jacobian(ModelKind::Osc, aview1(&params), &data);

        // Assert
        for k in 0..6 {
            let mut up = params;
            let mut down = params;
            up[k] += h;
            down[k] -= h;
            let fd = (model_values(ModelKind::Osc, aview1(&up), &data)
                - model_values(ModelKind::Osc, aview1(&down), &data))
                / (2.0 * h);
            for i in 0..data.len() {
                assert_relative_eq!(jac[[i, k]], fd[i], epsilon = 1e-6);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The residual Jacobian in unconstrained coordinates must include the
    // box-map derivative and the residual sign.
    fn residual_jacobian_matches_central_differences() {
        // Arrange
        let data = window(15);
        let model = BacktraceModel::new(ModelKind::Osc);
        let theta = Array1::from(vec![0.8, 0.1, -0.2, -1.0, 0.4, 0.2]);
        let h = 1e-6;

        // Act
        let jac = model.jacobian(&theta, &data).unwrap();

        // Assert
        for k in 0..6 {
            let mut up = theta.clone();
            let mut down = theta.clone();
            up[k] += h;
            down[k] -= h;
            let fd = (model.residuals(&up, &data).unwrap() - model.residuals(&down, &data).unwrap())
                / (2.0 * h);
            for i in 0..data.len() {
                assert_relative_eq!(jac[[i, k]], fd[i], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn parameter_maps_round_trip_inside_the_box() {
        let data = window(21);
        let params = Array1::from(vec![1.1, -0.3, 0.05, 0.2, 0.7, 5.5]);

        let back = to_model_params(ModelKind::Osc, &to_theta(ModelKind::Osc, &params, &data), &data);

        for (p, q) in params.iter().zip(back.iter()) {
            assert_relative_eq!(p, q, epsilon = 1e-9);
        }
    }

    #[test]
    fn initial_guess_is_inside_the_box() {
        let data = window(21);

        let params = initial_params(ModelKind::Osc, &data);

        let (lo, hi) = data.frequency_bounds;
        assert_eq!(params.len(), 6);
        assert!(params[5] > lo && params[5] < hi);
        assert_relative_eq!(params[0], data.x.dot(&data.y) / data.x.dot(&data.x), epsilon = 1e-12);
        assert_eq!(initial_params(ModelKind::Exp, &data).len(), 3);
    }

    #[test]
    fn check_rejects_wrong_parameter_count() {
        let data = window(10);
        let model = BacktraceModel::new(ModelKind::Exp);

        let err = model.check(&Array1::zeros(6), &data).unwrap_err();

        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 3, actual: 6 });
    }
}
