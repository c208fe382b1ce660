//! Public API surface for least-squares minimization.
//!
//! - [`LeastSquares`]: trait users implement for their residual model.
//! - [`SolverOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result returned by [`minimize`](super::minimize).
//!
//! Convention: we minimize the sum of squared residuals `c(θ) = Σ r_i(θ)²`.
//! If an analytic Jacobian is provided, it is `∂r/∂θ` (not the Jacobian of
//! the model); the adapter turns it into `∇c(θ) = 2 Jᵀ r`.
use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::{
        types::{Cost, FnEvalMap, Grad, Jacobian, Residuals, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented residual model.
///
/// - `type Data`: per-model data carried into `residuals`/`jacobian`/`check`.
///
/// Required:
/// - `residuals(&Theta, &Data) -> OptResult<Residuals>`: evaluate `r(θ)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook called once
///   before optimization.
///
/// Optional:
/// - `jacobian(&Theta, &Data) -> OptResult<Jacobian>`: analytic `∂r/∂θ`.
///   If not implemented, finite differences of the cost are used for the
///   gradient.
pub trait LeastSquares {
    type Data: 'static;

    // Required methods
    fn residuals(&self, theta: &Theta, data: &Self::Data) -> OptResult<Residuals>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn jacobian(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Jacobian> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `line_searcher: LineSearcher` — line-search algorithm used by L-BFGS.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
/// - `lbfgs_mem: Option<usize>` — L-BFGS history size; `None` uses
///   [`DEFAULT_LBFGS_MEM`](super::types::DEFAULT_LBFGS_MEM).
///
/// Default:
/// - `tols`: `tol_grad = 1e-8`, `tol_cost = 1e-14`, `max_iter = 5000`
/// - `line_searcher`: `MoreThuente`
/// - `verbose`: `false`
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl SolverOptions {
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] for a zero history size.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::default(),
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { tol_grad: Some(1e-8), tol_cost: Some(1e-14), max_iter: Some(5000) }
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `cost`: best sum of squared residuals.
/// - `converged`: `true` only when the solver met its gradient or cost
///   tolerance (or the initial guess already did).
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub cost: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `cost`.
    pub fn new(
        theta_hat_opt: Option<Theta>, cost: f64, termination: TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(cost)?;
        let converged = matches!(
            termination,
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            )
        );
        let status = match termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            other => format!("{other:?}"),
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, cost, converged, status, iterations, fn_evals, grad_norm })
    }

    /// Outcome for an initial guess that already satisfies `tol_grad`.
    pub fn at_initial_guess(theta0: Theta, cost: Cost, grad_norm: f64) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(Some(theta0))?;
        validate_value(cost)?;
        Ok(Self {
            theta_hat,
            cost,
            converged: true,
            status: "Gradient below tolerance at initial guess".to_string(),
            iterations: 0,
            fn_evals: FnEvalMap::new(),
            grad_norm: Some(grad_norm),
        })
    }
}

/// Sum of squared residuals.
pub fn sum_of_squares(residuals: &Residuals) -> Cost {
    residuals.dot(residuals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("morethuente".parse::<LineSearcher>().unwrap(), LineSearcher::MoreThuente);
        assert_eq!("HAGERZHANG".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert!(matches!(
            "bisection".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    fn tolerances_require_at_least_one_rule() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        assert_eq!(Tolerances::default().max_iter, Some(5000));
    }

    #[test]
    // Purpose
    // -------
    // Only gradient or cost convergence counts as success; hitting the
    // iteration cap does not.
    fn outcome_maps_termination_reasons() {
        let theta = Theta::from(vec![1.0]);

        let ok = OptimOutcome::new(
            Some(theta.clone()),
            0.5,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            10,
            FnEvalMap::new(),
            None,
        )
        .unwrap();
        let capped = OptimOutcome::new(
            Some(theta),
            0.5,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            10,
            FnEvalMap::new(),
            None,
        )
        .unwrap();

        assert!(ok.converged);
        assert!(!capped.converged);
        assert!(capped.status.contains("MaxItersReached"));
    }

    #[test]
    fn zero_lbfgs_memory_is_rejected() {
        assert!(matches!(
            SolverOptions::new(Tolerances::default(), LineSearcher::MoreThuente, false, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
    }
}
