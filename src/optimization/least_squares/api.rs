//! High-level entry point for minimizing a user-provided `LeastSquares` model.
//!
//! Picks the line search named in [`SolverOptions`], wraps the model in an
//! `ArgMinAdapter` and hands both to `run_lbfgs`.
use argmin::solver::linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch};

use crate::optimization::{
    errors::OptResult,
    least_squares::{
        adapter::ArgMinAdapter,
        run::{build_lbfgs, run_lbfgs},
        traits::{LeastSquares, LineSearcher, OptimOutcome, SolverOptions},
        types::Theta,
    },
};

/// Minimize `Σ r_i(θ)²` using L-BFGS with the chosen line search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Builds the solver selected by `opts.line_searcher`.
/// - Calls `run_lbfgs`, which returns an [`OptimOutcome`].
///
/// # Errors
/// - Propagates errors from `f.check`, solver setup and the run itself.
///
/// # Returns
/// An [`OptimOutcome`]; a run that stops without meeting its tolerances is
/// returned with `converged == false` rather than as an error.
pub fn minimize<F: LeastSquares>(
    f: &F, theta0: Theta, data: &F::Data, opts: &SolverOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            run_lbfgs(theta0, opts, problem, build_lbfgs(MoreThuenteLineSearch::new(), opts)?)
        }
        LineSearcher::HagerZhang => {
            run_lbfgs(theta0, opts, problem, build_lbfgs(HagerZhangLineSearch::new(), opts)?)
        }
    }
}
