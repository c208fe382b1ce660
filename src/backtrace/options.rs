//! Backtrace options — configuration for the fitter and the orthogonality
//! search.
//!
//! Purpose
//! -------
//! Collect every knob of a backtrace run in validated structs, so call
//! sites pass explicit options instead of ad-hoc arguments.
//!
//! Key behaviors
//! -------------
//! - [`FitOptions`] wraps the least-squares [`SolverOptions`].
//! - [`OrthoSearchOptions`] bounds the coarse-to-fine grid search over
//!   (ratio, phase): initial windows, grid size, tolerance, iteration and
//!   drift budgets.
//! - [`BacktraceOptions`] bundles the model family, join smoothing radius,
//!   whether to run the orthogonality search, and the two option groups.
//!
//! Invariants & assumptions
//! ------------------------
//! - Constructors reject invalid values with
//!   [`BacktraceError::InvalidOption`]; `Default` values are always valid.
//!
//! Testing notes
//! -------------
//! - Unit tests check defaults and each rejection rule.
use crate::{
    backtrace::{
        errors::{BacktraceError, BacktraceResult},
        model::ModelKind,
    },
    optimization::least_squares::traits::SolverOptions,
};

/// Default number of modelled points replaced at the graft boundary.
pub const DEFAULT_SMOOTHING_RADIUS: usize = 5;

/// Optimizer configuration for one backtrace fit.
///
/// `solver.verbose` attaches the argmin slog observer when the crate is
/// built with the `obs_slog` feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitOptions {
    pub solver: SolverOptions,
}

impl FitOptions {
    pub fn new(solver: SolverOptions) -> Self {
        Self { solver }
    }
}

/// Grid-search configuration for the basis orthogonality optimum.
///
/// Fields
/// ------
/// - `ratio_window`: initial growth-ratio window `(lo, hi)`.
/// - `phase_window`: initial phase window `(lo, hi)`.
/// - `grid_points`: points per axis; odd so the window centre is on the grid.
/// - `tol`: stop once both half-widths fall below this value.
/// - `max_iter`: maximum number of grid evaluations.
/// - `max_drift`: maximum displacement of the window centre, in units of the
///   initial window width.
///
/// Default: ratio `(−1, 1)`, phase `(0, 1)`, 21 points, `tol = 1e-6`,
/// `max_iter = 50`, `max_drift = 10`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoSearchOptions {
    pub ratio_window: (f64, f64),
    pub phase_window: (f64, f64),
    pub grid_points: usize,
    pub tol: f64,
    pub max_iter: usize,
    pub max_drift: f64,
}

impl OrthoSearchOptions {
    /// # Errors
    /// [`BacktraceError::InvalidOption`] when a window is empty or not
    /// finite, `grid_points` is even or below 3, `tol`/`max_drift` are not
    /// positive and finite, or `max_iter == 0`.
    pub fn new(
        ratio_window: (f64, f64), phase_window: (f64, f64), grid_points: usize, tol: f64,
        max_iter: usize, max_drift: f64,
    ) -> BacktraceResult<Self> {
        verify_window("ratio_window", ratio_window)?;
        verify_window("phase_window", phase_window)?;
        if grid_points < 3 || grid_points % 2 == 0 {
            return Err(BacktraceError::InvalidOption {
                name: "grid_points",
                value: grid_points as f64,
                reason: "Grid must have an odd number of points, at least 3.",
            });
        }
        verify_positive("tol", tol)?;
        verify_positive("max_drift", max_drift)?;
        if max_iter == 0 {
            return Err(BacktraceError::InvalidOption {
                name: "max_iter",
                value: 0.0,
                reason: "At least one grid evaluation is required.",
            });
        }
        Ok(Self { ratio_window, phase_window, grid_points, tol, max_iter, max_drift })
    }
}

impl Default for OrthoSearchOptions {
    fn default() -> Self {
        Self {
            ratio_window: (-1.0, 1.0),
            phase_window: (0.0, 1.0),
            grid_points: 21,
            tol: 1e-6,
            max_iter: 50,
            max_drift: 10.0,
        }
    }
}

/// Complete configuration of a backtrace run.
///
/// Default: `Osc` model, smoothing radius 5, no orthogonality search,
/// default solver and search options.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktraceOptions {
    pub model: ModelKind,
    pub smoothing_radius: usize,
    pub compute_orthogonality: bool,
    pub fit: FitOptions,
    pub ortho: OrthoSearchOptions,
}

impl BacktraceOptions {
    pub fn new(
        model: ModelKind, smoothing_radius: usize, compute_orthogonality: bool, fit: FitOptions,
        ortho: OrthoSearchOptions,
    ) -> Self {
        Self { model, smoothing_radius, compute_orthogonality, fit, ortho }
    }

    /// Default options with a different model family.
    pub fn with_model(model: ModelKind) -> Self {
        Self { model, ..Self::default() }
    }
}

impl Default for BacktraceOptions {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            smoothing_radius: DEFAULT_SMOOTHING_RADIUS,
            compute_orthogonality: false,
            fit: FitOptions::default(),
            ortho: OrthoSearchOptions::default(),
        }
    }
}

// ---- Helper methods ----

fn verify_window(name: &'static str, window: (f64, f64)) -> BacktraceResult<()> {
    if !(window.0.is_finite() && window.1.is_finite() && window.1 > window.0) {
        return Err(BacktraceError::InvalidOption {
            name,
            value: window.1 - window.0,
            reason: "Window bounds must be finite with lo < hi.",
        });
    }
    Ok(())
}

fn verify_positive(name: &'static str, value: f64) -> BacktraceResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(BacktraceError::InvalidOption {
            name,
            value,
            reason: "Value must be finite and strictly positive.",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let d = OrthoSearchOptions::default();

        let rebuilt = OrthoSearchOptions::new(
            d.ratio_window,
            d.phase_window,
            d.grid_points,
            d.tol,
            d.max_iter,
            d.max_drift,
        );

        assert_eq!(rebuilt, Ok(d));
        assert_eq!(BacktraceOptions::default().smoothing_radius, 5);
        assert!(!BacktraceOptions::default().compute_orthogonality);
    }

    #[test]
    // Purpose
    // -------
    // Each search option is validated independently.
    fn ortho_options_reject_invalid_values() {
        let bad_window = OrthoSearchOptions::new((1.0, -1.0), (0.0, 1.0), 21, 1e-6, 50, 10.0);
        let even_grid = OrthoSearchOptions::new((-1.0, 1.0), (0.0, 1.0), 20, 1e-6, 50, 10.0);
        let zero_tol = OrthoSearchOptions::new((-1.0, 1.0), (0.0, 1.0), 21, 0.0, 50, 10.0);
        let no_iter = OrthoSearchOptions::new((-1.0, 1.0), (0.0, 1.0), 21, 1e-6, 0, 10.0);

        assert!(matches!(
            bad_window,
            Err(BacktraceError::InvalidOption { name: "ratio_window", .. })
        ));
        assert!(matches!(even_grid, Err(BacktraceError::InvalidOption { name: "grid_points", .. })));
        assert!(matches!(zero_tol, Err(BacktraceError::InvalidOption { name: "tol", .. })));
        assert!(matches!(no_iter, Err(BacktraceError::InvalidOption { name: "max_iter", .. })));
    }

    #[test]
    fn with_model_keeps_other_defaults() {
        let opts = BacktraceOptions::with_model(ModelKind::Exp);

        assert_eq!(opts.model, ModelKind::Exp);
        assert_eq!(opts.ortho, OrthoSearchOptions::default());
    }
}
