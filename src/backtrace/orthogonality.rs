//! backtrace::orthogonality — correlation between the growth and the
//! oscillation basis of the `Osc` model.
//!
//! Purpose
//! -------
//! Quantify how far the two terms of the oscillating model,
//! `e(τ) = exp(r·τ)` and `s(τ) = sin(2π(ω·τ + φ))`, can be told apart over
//! the fit window `[τ₀, 1]`, and search the (ratio, phase) plane for the
//! most orthogonal pair.
//!
//! Key behaviors
//! -------------
//! - [`basis_correlation`]: closed-form normalized inner product
//!   `ρ = ⟨e, s⟩ / (‖e‖ ‖s‖)` on `[τ₀, 1]`.
//! - [`empirical_correlation`]: Pearson correlation of the sampled bases.
//! - [`search_orthogonal_basis`]: coarse-to-fine grid search maximizing
//!   `1 − |ρ|` with `ω` fixed at one cycle over the window.
//!
//! Invariants & assumptions
//! ------------------------
//! - `τ₀ < 1` and `ω > 0`.
//! - The objective attains its maximum on a whole contour (`ρ = 0` along
//!   `r = 0` and along one phase curve for every `r`). Ties within
//!   `1e-9` are broken towards the current window centre, which makes the
//!   search deterministic.
//!
//! Conventions
//! -----------
//! - Windows are reported as `[ratio_lo, ratio_hi, phase_lo, phase_hi]`.
//! - Drift is the displacement of the window centre from its starting
//!   point, measured in initial window widths (Euclidean over both axes).
use crate::backtrace::{
    errors::{BacktraceError, BacktraceResult},
    options::OrthoSearchOptions,
};
use ndarray::ArrayView1;
use std::f64::consts::PI;

/// Objective values within this distance of the grid maximum are ties.
const TIE_TOL: f64 = 1e-9;

/// Below this `|r·(1 − τ₀)|` the growth norm uses its `r → 0` limit.
const SMALL_GROWTH: f64 = 1e-12;

/// Closed-form and sampled basis correlations of a fitted `Osc` model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisOrthogonality {
    pub empirical_correlation: f64,
    pub closed_form_correlation: f64,
}

/// Result of [`search_orthogonal_basis`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoOptimum {
    pub ratio: f64,
    /// Phase reduced to `[0, 1)`.
    pub phase: f64,
    pub frequency: f64,
    /// `1 − |ρ|` at the optimum.
    pub orthogonality: f64,
    pub iterations: usize,
    /// Final search window.
    pub window: [f64; 4],
}

/// basis_correlation — closed-form `ρ` on `[τ₀, 1]`.
///
/// Parameters
/// ----------
/// - `ratio`: growth rate `r` of `exp(r·τ)`.
/// - `frequency`: `ω` in cycles per unit of normalized time.
/// - `phase`: `φ` in cycles.
/// - `tau0`: window start in normalized time.
///
/// Returns
/// -------
/// `f64`
///   With `k = 2πω`, `θ = 2πφ`:
///   `⟨e,s⟩ = [e^{rτ}(r sin(kτ+θ) − k cos(kτ+θ))/(r²+k²)]_{τ₀}^{1}`,
///   `‖e‖² = (e^{2r} − e^{2rτ₀})/(2r)` (`1 − τ₀` as `r → 0`),
///   `‖s‖² = (1−τ₀)/2 − [sin(2(kτ+θ))]_{τ₀}^{1}/(4k)`.
pub fn basis_correlation(ratio: f64, frequency: f64, phase: f64, tau0: f64) -> f64 {
    let k = 2.0 * PI * frequency;
    let theta = 2.0 * PI * phase;
    let denom = ratio * ratio + k * k;
    let antiderivative = |t: f64| {
        let arg = k * t + theta;
        (ratio * t).exp() * (ratio * arg.sin() - k * arg.cos()) / denom
    };
    let inner = antiderivative(1.0) - antiderivative(tau0);

    let width = 1.0 - tau0;
    let growth_sq = if (ratio * width).abs() < SMALL_GROWTH {
        width
    } else {
        (2.0 * ratio * tau0).exp() * (2.0 * ratio * width).exp_m1() / (2.0 * ratio)
    };
    let wave_sq =
        width / 2.0 - ((2.0 * (k + theta)).sin() - (2.0 * (k * tau0 + theta)).sin()) / (4.0 * k);
    inner / (growth_sq * wave_sq).sqrt()
}

/// Pearson correlation of `exp(r·τᵢ)` and `sin(2π(ω·τᵢ + φ))`.
///
/// Returns `NaN` when either sample is constant (e.g. `r = 0`).
pub fn empirical_correlation(
    ratio: f64, frequency: f64, phase: f64, tau: ArrayView1<'_, f64>,
) -> f64 {
    let growth = tau.mapv(|t| (ratio * t).exp());
    let wave = tau.mapv(|t| (2.0 * PI * (frequency * t + phase)).sin());
    let n = tau.len() as f64;
    let (mg, mw) = (growth.sum() / n, wave.sum() / n);
    let (mut sgw, mut sgg, mut sww) = (0.0, 0.0, 0.0);
    for (g, w) in growth.iter().zip(wave.iter()) {
        let (dg, dw) = (g - mg, w - mw);
        sgw += dg * dw;
        sgg += dg * dg;
        sww += dw * dw;
    }
    let denom = (sgg * sww).sqrt();
    if denom > 0.0 { sgw / denom } else { f64::NAN }
}

/// search_orthogonal_basis — maximize `1 − |ρ|` over (ratio, phase).
///
/// Parameters
/// ----------
/// - `tau0`: window start in normalized time; `ω` is fixed at
///   `1 / (1 − τ₀)`.
/// - `opts`: grid size, initial windows, tolerance and budgets.
///
/// Returns
/// -------
/// `BacktraceResult<OrthoOptimum>`
///
/// Notes
/// -----
/// - Each iteration evaluates a `G × G` grid centred on the current window
///   and picks the best point (ties towards the centre).
/// - A best point on the grid boundary recentres the window without
///   shrinking it; an interior best point recentres and shrinks both
///   half-widths to two grid steps.
/// - The search succeeds once both half-widths are below `opts.tol`.
///
/// Errors
/// ------
/// - `BacktraceError::OrthogonalitySearch` when `opts.max_iter` grids are
///   evaluated without convergence, or the window centre drifts more than
///   `opts.max_drift` initial widths.
pub fn search_orthogonal_basis(
    tau0: f64, opts: &OrthoSearchOptions,
) -> BacktraceResult<OrthoOptimum> {
    let frequency = 1.0 / (1.0 - tau0);
    let g = opts.grid_points;
    let half = (g - 1) / 2;

    let (ratio_lo, ratio_hi) = opts.ratio_window;
    let (phase_lo, phase_hi) = opts.phase_window;
    let initial_width = (ratio_hi - ratio_lo, phase_hi - phase_lo);
    let start = (0.5 * (ratio_lo + ratio_hi), 0.5 * (phase_lo + phase_hi));
    let mut centre = start;
    let mut half_width = (0.5 * initial_width.0, 0.5 * initial_width.1);
    let window_of =
        |c: (f64, f64), h: (f64, f64)| [c.0 - h.0, c.0 + h.0, c.1 - h.1, c.1 + h.1];

    for iteration in 1..=opts.max_iter {
        let step = (half_width.0 / half as f64, half_width.1 / half as f64);
        let grid_value = |i: usize, j: usize| {
            let ratio = centre.0 + (i as f64 - half as f64) * step.0;
            let phase = centre.1 + (j as f64 - half as f64) * step.1;
            (ratio, phase, 1.0 - basis_correlation(ratio, frequency, phase, tau0).abs())
        };

        let mut values = Vec::with_capacity(g * g);
        for i in 0..g {
            for j in 0..g {
                values.push((i, j, grid_value(i, j)));
            }
        }
        let best = values.iter().map(|(_, _, v)| v.2).fold(f64::NEG_INFINITY, f64::max);
        let centre_distance = |i: usize, j: usize| {
            let di = (i as f64 - half as f64) / half as f64;
            let dj = (j as f64 - half as f64) / half as f64;
            di * di + dj * dj
        };
        let chosen = values
            .iter()
            .filter(|(_, _, v)| v.2 >= best - TIE_TOL)
            .min_by(|a, b| centre_distance(a.0, a.1).total_cmp(&centre_distance(b.0, b.1)));
        let Some(&(i, j, (ratio, phase, value))) = chosen else {
            // Only reachable when every grid value is NaN.
            break;
        };

        centre = (ratio, phase);
        let on_boundary = i == 0 || i == g - 1 || j == 0 || j == g - 1;
        if on_boundary {
            let drift = ((centre.0 - start.0) / initial_width.0)
                .hypot((centre.1 - start.1) / initial_width.1);
            if drift > opts.max_drift {
                log::debug!("orthogonality search drifted {drift:.3} window widths");
                return Err(BacktraceError::OrthogonalitySearch {
                    window: window_of(centre, half_width),
                    iterations: iteration,
                });
            }
            continue;
        }

        let shrink = 4.0 / (g - 1) as f64;
        half_width = (half_width.0 * shrink, half_width.1 * shrink);
        if half_width.0 < opts.tol && half_width.1 < opts.tol {
            return Ok(OrthoOptimum {
                ratio,
                phase: phase.rem_euclid(1.0),
                frequency,
                orthogonality: value,
                iterations: iteration,
                window: window_of(centre, half_width),
            });
        }
    }

    Err(BacktraceError::OrthogonalitySearch {
        window: window_of(centre, half_width),
        iterations: opts.max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The closed-form correlation against numerical quadrature and its
    //   r → 0 full-period limit.
    // - The empirical correlation on sampled bases.
    // - Convergence and both failure modes of the grid search.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Over a full period a constant and a sine are orthogonal.
    //
    // Given
    // -----
    // - r → 0, ω = 1/(1 − τ₀), several phases.
    //
    // Expect
    // ------
    // - |ρ| < 1e-6.
    fn zero_ratio_full_period_is_orthogonal() {
        let tau0 = 0.3;
        let frequency = 1.0 / (1.0 - tau0);

        for phase in [0.0, 0.1, 0.37, 0.8] {
            assert!(basis_correlation(0.0, frequency, phase, tau0).abs() < 1e-6);
            assert!(basis_correlation(1e-13, frequency, phase, tau0).abs() < 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // The closed form must equal the normalized inner product computed by
    // the trapezoid rule on a dense grid.
    fn closed_form_matches_quadrature() {
        // Arrange
        let (ratio, frequency, phase, tau0) = (0.8, 2.3, 0.1, 0.3);
        let n = 20_000;
        let h = (1.0 - tau0) / n as f64;
        let trapezoid = |f: &dyn Fn(f64) -> f64| {
            let inner: f64 = (1..n).map(|i| f(tau0 + i as f64 * h)).sum();
            h * (inner + 0.5 * (f(tau0) + f(1.0)))
        };
        let e = |t: f64| (ratio * t).exp();
        let s = |t: f64| (2.0 * PI * (frequency * t + phase)).sin();

        // Act
        let es = trapezoid(&|t: f64| e(t) * s(t));
        let ee = trapezoid(&|t: f64| e(t) * e(t));
        let ss = trapezoid(&|t: f64| s(t) * s(t));
        let closed = basis_correlation(ratio, frequency, phase, tau0);

        // Assert
        assert_relative_eq!(closed, es / (ee * ss).sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn empirical_correlation_detects_aligned_and_flat_bases() {
        let tau = Array1::linspace(0.5, 1.0, 200);

        let flat = empirical_correlation(0.0, 2.0, 0.0, tau.view());
        let rising = empirical_correlation(3.0, 0.5, 0.75, tau.view());

        assert!(flat.is_nan());
        // Over [0.5, 1] with ω = 0.5, φ = 0.75 the sine rises monotonically.
        assert!(rising > 0.8);
    }

    #[test]
    // Purpose
    // -------
    // The default search converges to the centre of the zero contour.
    //
    // Given
    // -----
    // - τ₀ = 0.3, default windows R ∈ [−1, 1], φ ∈ [0, 1].
    //
    // Expect
    // ------
    // - ratio ≈ 0, phase ≈ 0.5, ω = 1/(1 − τ₀), orthogonality ≈ 1.
    fn search_converges_on_default_windows() {
        // Arrange
        let opts = OrthoSearchOptions::default();

        // Act
        let optimum = search_orthogonal_basis(0.3, &opts).unwrap();

        // Assert
        assert_relative_eq!(optimum.ratio, 0.0, epsilon = 1e-6);
        assert_relative_eq!(optimum.phase, 0.5, epsilon = 1e-6);
        assert_relative_eq!(optimum.frequency, 1.0 / 0.7, epsilon = 1e-12);
        assert_relative_eq!(optimum.orthogonality, 1.0, epsilon = 1e-9);
        assert!(optimum.iterations <= opts.max_iter);
        assert!(optimum.window[1] - optimum.window[0] < 2.0 * opts.tol);
    }

    #[test]
    fn search_reports_exhausted_iterations() {
        let opts = OrthoSearchOptions { max_iter: 1, ..OrthoSearchOptions::default() };

        let err = search_orthogonal_basis(0.3, &opts).unwrap_err();

        assert!(matches!(err, BacktraceError::OrthogonalitySearch { iterations: 1, .. }));
    }

    #[test]
    // Purpose
    // -------
    // A window far from the optimum is shifted, and the drift cap stops
    // the search.
    //
    // Given
    // -----
    // - R ∈ [5, 5.5], φ ∈ [0, 0.01] and max_drift = 0.5.
    //
    // Expect
    // ------
    // - OrthogonalitySearch error on the first shift.
    fn search_stops_when_window_drifts() {
        let opts = OrthoSearchOptions {
            ratio_window: (5.0, 5.5),
            phase_window: (0.0, 0.01),
            max_drift: 0.5,
            ..OrthoSearchOptions::default()
        };

        let err = search_orthogonal_basis(0.3, &opts).unwrap_err();

        assert!(matches!(err, BacktraceError::OrthogonalitySearch { iterations: 1, .. }));
    }
}
