//! Solver setup and execution for least-squares problems.
//!
//! [`build_lbfgs`] applies the crate's memory size and tolerances to an
//! L-BFGS solver for any line search; [`run_lbfgs`] drives it through
//! Argmin's `Executor` and converts the final state into an
//! [`OptimOutcome`]. Neither function leaks `argmin::core::Error`.
use crate::optimization::{
    errors::OptResult,
    least_squares::{
        adapter::ArgMinAdapter,
        traits::{LeastSquares, OptimOutcome, SolverOptions},
        types::{Cost, DEFAULT_LBFGS_MEM, Grad, Theta},
    },
};
use argmin::{
    core::{CostFunction, Executor, Gradient, State},
    solver::quasinewton::LBFGS,
};
use argmin_math::ArgminL2Norm;

/// L-BFGS over `line_search` with `opts.lbfgs_mem` history (default
/// [`DEFAULT_LBFGS_MEM`]).
///
/// Tolerances left as `None` keep Argmin's defaults. `theta0` and
/// `max_iters` are set by [`run_lbfgs`].
///
/// # Errors
/// `OptError` when Argmin rejects a tolerance.
pub fn build_lbfgs<L>(
    line_search: L, opts: &SolverOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    let mut solver = LBFGS::new(line_search, opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM));
    if let Some(tol) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(tol)?;
    }
    Ok(solver)
}

/// Run an `argmin` optimization for a least-squares problem.
///
/// Wires up the model via [`ArgMinAdapter`], the chosen solver, the initial
/// parameter `theta0`, optional observers (behind the `obs_slog` feature)
/// and `max_iters`, then converts the final state into [`OptimOutcome`].
///
/// When the gradient at `theta0` is already below `tol_grad` the solver is
/// not started: the line search has no descent direction to work with.
///
/// # Errors
/// - Propagates any `argmin` runtime error (solver or line-search failures)
///   via `From<argmin::core::Error>`.
/// - Propagates validation errors from [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &SolverOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LeastSquares,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if let Some(tol_grad) = opts.tols.tol_grad {
        let g0 = problem.gradient(&theta0)?.l2_norm();
        if g0 < tol_grad {
            let c0 = problem.cost(&theta0)?;
            return OptimOutcome::at_initial_guess(theta0, c0, g0);
        }
    }

    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LeastSquares,
{
    let c0 = problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());

    log::info!(
        "init: ssr(theta0) = {:.6}{}",
        c0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
