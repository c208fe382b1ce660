//! Numerical stability utilities.
//!
//! Provides overflow-safe versions of the logistic map and the affine
//! box transforms built on it. Bounded model parameters are optimized in
//! an unconstrained space and pushed through these maps, so a solver step
//! can never leave the admissible box.
//!
//! # Provided items
//! - [`LOGIT_EPS`]: clamp applied before taking a logit so that boundary
//!   values map to large but finite reals.
//! - [`EIGEN_EPS`]: relative eigenvalue cutoff for pseudo-inverses.
//! - [`safe_logistic(x)`]: `1 / (1 + exp(-x))` without overflow.
//! - [`to_bounded`] / [`from_bounded`] / [`bounded_derivative`]: the box
//!   map `ℝ → [lo, hi]`, its inverse and its derivative.

/// Clamp used before taking logits of boundary values.
pub const LOGIT_EPS: f64 = 1e-10;

/// Eigenvalues below `EIGEN_EPS · λ_max` are treated as zero.
pub const EIGEN_EPS: f64 = 1e-12;

/// Numerically stable logistic function `σ(x) = 1 / (1 + exp(-x))`.
///
/// Branches on the sign of `x` so that `exp` is only ever evaluated at a
/// non-positive argument.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverse logistic `ln(p / (1 − p))` with `p` clamped to
/// `[LOGIT_EPS, 1 − LOGIT_EPS]`.
pub fn safe_logit(p: f64) -> f64 {
    let p = p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    (p / (1.0 - p)).ln()
}

/// Map an unconstrained real into `[lo, hi]`.
pub fn to_bounded(theta: f64, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * safe_logistic(theta)
}

/// Inverse of [`to_bounded`]; values on or outside the box are clamped.
pub fn from_bounded(value: f64, lo: f64, hi: f64) -> f64 {
    safe_logit((value - lo) / (hi - lo))
}

/// Derivative `d to_bounded / dθ = (hi − lo) · σ(θ) · (1 − σ(θ))`.
pub fn bounded_derivative(theta: f64, lo: f64, hi: f64) -> f64 {
    let s = safe_logistic(theta);
    (hi - lo) * s * (1.0 - s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the stable logistic with the naive formula.
    // - Saturation without overflow in the tails.
    // - Round trips through the box map and its derivative.
    // -------------------------------------------------------------------------

    #[test]
    fn logistic_matches_naive_formula_on_safe_grid() {
        for k in -20..=20 {
            let x = k as f64 * 0.5;
            assert_relative_eq!(safe_logistic(x), 1.0 / (1.0 + (-x).exp()), epsilon = 1e-15);
        }
    }

    #[test]
    fn logistic_tails_saturate_without_nan() {
        assert_eq!(safe_logistic(1e4), 1.0);
        assert_eq!(safe_logistic(-1e4), 0.0);
        assert!(safe_logistic(-800.0).is_finite());
    }

    #[test]
    // Purpose
    // -------
    // `from_bounded` inverts `to_bounded` for interior values and maps the
    // box edges to finite reals.
    fn bounded_map_round_trips_inside_box() {
        let (lo, hi) = (2.0, 7.5);
        for value in [2.1, 3.0, 4.75, 7.4] {
            let theta = from_bounded(value, lo, hi);
            assert_relative_eq!(to_bounded(theta, lo, hi), value, epsilon = 1e-9);
        }
        assert!(from_bounded(lo, lo, hi).is_finite());
        assert!(from_bounded(hi + 1.0, lo, hi).is_finite());
    }

    #[test]
    fn bounded_derivative_matches_central_difference() {
        let (lo, hi) = (-1.0, 3.0);
        let h = 1e-6;
        for theta in [-3.0, -0.4, 0.0, 1.2, 4.0] {
            let fd = (to_bounded(theta + h, lo, hi) - to_bounded(theta - h, lo, hi)) / (2.0 * h);
            assert_relative_eq!(bounded_derivative(theta, lo, hi), fd, epsilon = 1e-8);
        }
    }
}
