//! backtrace::fitter — fit a security against a benchmark index and
//! extend its history backwards.
//!
//! Purpose
//! -------
//! Given a security with a short price history and a benchmark index with
//! a longer one, fit a parametric model of the security on the overlap
//! window, evaluate it over the index's earlier history, and graft the real
//! security series onto the modelled one.
//!
//! Key behaviors
//! -------------
//! - [`backtrace`] runs the whole pipeline: overlap window, normalization,
//!   bounded least squares, covariance, extension, join smoothing,
//!   diagnostics and the optional orthogonality search.
//! - If the index is shorter than the security the two roles are swapped
//!   (logged at `warn`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Both inputs are dense, ascending, unit-step series.
//! - The index starts at least one tick before the security, so every
//!   window point has a lagged index value.
//! - The extended series ends with the security series exactly; smoothing
//!   only rewrites modelled points.
//!
//! Conventions
//! -----------
//! - Normalization: `y / max(y)`, `x / max(x)` (maximum over the window and
//!   its lag point), `τ = tick / T` with `T` the last window tick.
//! - Reported parameters, covariance and residuals are in original units
//!   (see [`ModelKind::scale_factors`]).
//!
//! Testing notes
//! -------------
//! - Unit tests fit synthetic data generated from each model family and
//!   check graft exactness, role swapping, smoothing and input errors.
use crate::{
    backtrace::{
        diagnostics::{FitResult, adjusted_r_squared, durbin_watson, r_squared},
        errors::{BacktraceError, BacktraceResult},
        model::{
            BacktraceModel, FitData, ModelKind, evaluate, initial_params, model_jacobian,
            model_values, to_model_params, to_theta,
        },
        options::BacktraceOptions,
        orthogonality::{
            BasisOrthogonality, basis_correlation, empirical_correlation, search_orthogonal_basis,
        },
    },
    inference::covariance::{
        correlation_matrix, least_squares_covariance, log10_condition_number, rescale_covariance,
        standard_errors,
    },
    optimization::least_squares::{api::minimize, traits::LeastSquares},
    series::{dense::DenseSeries, interpolation::MonotoneCubic},
};
use ndarray::{Array1, s};

/// Extended series and fit report of one backtrace.
#[derive(Debug, Clone, PartialEq)]
pub struct Backtrace {
    /// Modelled history followed by the real security series.
    pub extended: DenseSeries,
    pub fit: FitResult,
}

/// Overlap window in model space plus the scales needed to undo it.
#[derive(Debug, Clone, PartialEq)]
struct Window {
    data: FitData,
    security_max: f64,
    index_max: f64,
    y: Array1<f64>,
}

/// backtrace — fit `security` against `index` and extend it backwards.
///
/// Parameters
/// ----------
/// - `security`: `&DenseSeries`
///   Series to extend.
/// - `index`: `&DenseSeries`
///   Benchmark with the longer history.
/// - `opts`: `&BacktraceOptions`
///   Model family, smoothing radius, solver and search options.
///
/// Returns
/// -------
/// `BacktraceResult<Backtrace>`
///   The extended series (index ticks after the first, with the security
///   grafted on its own ticks) and the [`FitResult`].
///
/// Errors
/// ------
/// - `BacktraceError::InsufficientOverlap` if the index does not start
///   before the security.
/// - `BacktraceError::WindowTooShort` if the overlap holds no more points
///   than the model has parameters.
/// - `BacktraceError::NonPositiveScale` for a non-positive series maximum
///   or last window tick.
/// - `BacktraceError::FitConvergence` if the solver does not converge.
/// - `BacktraceError::OrthogonalitySearch` if the requested search fails.
pub fn backtrace(
    security: &DenseSeries, index: &DenseSeries, opts: &BacktraceOptions,
) -> BacktraceResult<Backtrace> {
    let (security, index) = if index.len() < security.len() {
        log::warn!(
            "index ({} points) is shorter than the security ({} points); swapping roles",
            index.len(),
            security.len()
        );
        (index, security)
    } else {
        (security, index)
    };

    let kind = opts.model;
    let window = overlap_window(security, index, kind)?;
    let data = &window.data;

    let model = BacktraceModel::new(kind);
    let theta0 = to_theta(kind, &initial_params(kind, data), data);
    model.check(&theta0, data)?;
    let outcome = minimize(&model, theta0, data, &opts.fit.solver)
        .map_err(|e| BacktraceError::FitConvergence { status: e.to_string() })?;
    if !outcome.converged {
        return Err(BacktraceError::FitConvergence { status: outcome.status });
    }

    // ---- Uncertainty in model space, then original units ----
    let fitted = to_model_params(kind, &outcome.theta_hat, data);
    let model_fit = model_values(kind, fitted.view(), data);
    let normalized_residuals = &data.y - &model_fit;
    let normalized_ssr = normalized_residuals.dot(&normalized_residuals);
    let jacobian = model_jacobian(kind, fitted.view(), data);
    let model_cov = least_squares_covariance(&jacobian, normalized_ssr)?;

    let scales = kind.scale_factors(window.security_max / window.index_max, data.span);
    let covariance = rescale_covariance(&model_cov, &scales)?;
    let params = &fitted * &Array1::from(scales);

    // ---- Diagnostics ----
    let residuals = normalized_residuals * window.security_max;
    let ssr = residuals.dot(&residuals);
    let r2 = r_squared(residuals.view(), window.y.view());
    let basis = match kind {
        ModelKind::Exp => None,
        ModelKind::Osc => {
            let (ratio, phase, frequency) = (fitted[2], fitted[4], fitted[5]);
            Some(BasisOrthogonality {
                empirical_correlation: empirical_correlation(
                    ratio,
                    frequency,
                    phase,
                    data.tau.view(),
                ),
                closed_form_correlation: basis_correlation(ratio, frequency, phase, data.tau0()),
            })
        }
    };
    let ortho_search = if opts.compute_orthogonality {
        Some(search_orthogonal_basis(data.tau0(), &opts.ortho)?)
    } else {
        None
    };

    let fit = FitResult {
        model: kind,
        std_errors: standard_errors(&covariance),
        correlation: correlation_matrix(&covariance),
        log10_condition: log10_condition_number(&covariance),
        params,
        covariance,
        ssr,
        r_squared: r2,
        adj_r_squared: adjusted_r_squared(r2, data.len(), kind.n_params()),
        durbin_watson: durbin_watson(residuals.view()),
        residuals,
        basis,
        ortho_search,
        solver_status: outcome.status,
        iterations: outcome.iterations,
    };
    log::debug!(
        "{kind} backtrace fit: {} points, ssr = {:.6e}, adj R² = {:.6}, {} iterations",
        data.len(),
        fit.ssr,
        fit.adj_r_squared,
        fit.iterations
    );

    let extended = extend(security, index, &fit, opts.smoothing_radius)?;
    Ok(Backtrace { extended, fit })
}

/// Build the normalized overlap window.
fn overlap_window(
    security: &DenseSeries, index: &DenseSeries, kind: ModelKind,
) -> BacktraceResult<Window> {
    let start = security.first_tick();
    if index.first_tick() >= start {
        return Err(BacktraceError::InsufficientOverlap {
            index_first: index.first_tick(),
            security_first: start,
        });
    }
    let end = security.last_tick().min(index.last_tick());
    let points = (end - start + 1).max(0) as usize;
    let params = kind.n_params();
    if points <= params {
        return Err(BacktraceError::WindowTooShort { points, params });
    }

    // One leading index point anchors the lag.
    let index_window = index.window(start - 1, end)?;
    let security_window = security.window(start, end)?;
    let index_values = index_window.values();
    let y = security_window.values().to_owned();

    let security_max = y.fold(f64::NEG_INFINITY, |m, v| m.max(*v));
    let index_max = index_values.fold(f64::NEG_INFINITY, |m, v| m.max(*v));
    if !(security_max > 0.0) {
        return Err(BacktraceError::NonPositiveScale { which: "security max", value: security_max });
    }
    if !(index_max > 0.0) {
        return Err(BacktraceError::NonPositiveScale { which: "index max", value: index_max });
    }

    let span = end as f64;
    let x = index_values.slice(s![1..]).mapv(|v| v / index_max);
    let x_lag = index_values.slice(s![..points]).mapv(|v| v / index_max);
    let tau = security_window.ticks().mapv(|t| t as f64 / span);
    let data = FitData::new(x, x_lag, y.mapv(|v| v / security_max), tau, span)?;
    Ok(Window { data, security_max, index_max, y })
}

/// Evaluate the fitted model over the index history before the security
/// starts, append the security, and smooth the join.
fn extend(
    security: &DenseSeries, index: &DenseSeries, fit: &FitResult, radius: usize,
) -> BacktraceResult<DenseSeries> {
    let params = fit.params.view();
    let index_values = index.values();
    let first = index.first_tick() + 1;
    let modelled = (security.first_tick() - first).max(0) as usize;

    let mut values = Vec::with_capacity(modelled + security.len());
    for offset in 1..=modelled {
        let tick = index.first_tick() + offset as i64;
        values.push(evaluate(
            fit.model,
            params,
            index_values[offset],
            index_values[offset - 1],
            tick as f64,
        ));
    }
    values.extend(security.values().iter());
    smooth_join(first, &mut values, modelled, radius)?;
    Ok(DenseSeries::from_values(first, Array1::from(values))?)
}

/// smooth_join — replace the last `radius` modelled points with a monotone
/// cubic through the preceding modelled points and the first real points.
///
/// `values[..modelled]` are modelled, the rest are real; `values[0]` sits
/// at tick `first`. The radius is clamped so that at least one modelled
/// node precedes the gap and no more real nodes are used than exist.
/// Real points are never rewritten.
pub(crate) fn smooth_join(
    first: i64, values: &mut [f64], modelled: usize, radius: usize,
) -> BacktraceResult<()> {
    let real = values.len() - modelled;
    let k = radius.min(modelled.saturating_sub(1)).min(real);
    if k == 0 {
        return Ok(());
    }
    let gap_start = modelled - k;
    let left_start = modelled.saturating_sub(2 * k);
    let nodes: Vec<usize> = (left_start..gap_start).chain(modelled..modelled + k).collect();
    let xs = nodes.iter().map(|&i| (first + i as i64) as f64).collect();
    let ys = nodes.iter().map(|&i| values[i]).collect();
    let curve = MonotoneCubic::new(xs, ys)?;
    for i in gap_start..modelled {
        values[i] = curve.value((first + i as i64) as f64)?;
    }
    Ok(())
}
