//! stats::distribution — standard-deviation bands of a return distribution.
//!
//! Purpose
//! -------
//! Summarize where the observations at one horizon fall relative to the
//! bands `m ± kσ`, and how uncertain those band levels are.
//!
//! Key behaviors
//! -------------
//! - [`band_coverage`]: for each multiplier `k`, the band level
//!   `m + kσ`, the empirical fraction of observations strictly below it and
//!   the fraction a normal distribution `N(m, σ²)` would place below it.
//! - [`band_errors`]: per-horizon band levels `m ± kσ` and their errors
//!   `sqrt(se_mean² + (k·se_std)²)`, on raw and annualized columns.
//!
//! Conventions
//! -----------
//! - `σ` is the sample standard deviation (`n − 1`); `NaN` observations
//!   are dropped.
//! - Negative multipliers describe the lower bands.
use crate::stats::{
    errors::{StatsError, StatsResult},
    summary::{ANN_MEAN, ANN_STD, MEAN, STD, StatsTable},
};
use ndarray::{Array1, ArrayView1};
use statrs::distribution::{ContinuousCDF, Normal};

/// Coverage of one band `m + k·σ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandCoverage {
    pub multiplier: f64,
    pub level: f64,
    /// Fraction of observations strictly below `level`.
    pub empirical_below: f64,
    /// `Φ(k)`, the normal reference fraction.
    pub normal_below: f64,
}

/// Band levels and errors per horizon for one multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct Bands {
    pub multiplier: f64,
    pub upper: Array1<f64>,
    pub lower: Array1<f64>,
    pub error: Array1<f64>,
    pub annualized_upper: Array1<f64>,
    pub annualized_lower: Array1<f64>,
    pub annualized_error: Array1<f64>,
}

/// band_coverage — empirical vs normal coverage of `m + kσ` bands.
///
/// Parameters
/// ----------
/// - `row`: returns at one horizon (`NaN` allowed).
/// - `multipliers`: band multipliers `k`, e.g. `[-3, -2, -1, 0, 1, 2, 3]`.
///
/// Errors
/// ------
/// - `StatsError::EmptyInput` with fewer than two defined observations.
/// - `StatsError::NonFiniteMultiplier` for a non-finite `k`.
/// - `StatsError::InvalidNormalParam` when the observations are constant.
pub fn band_coverage(
    row: ArrayView1<'_, f64>, multipliers: &[f64],
) -> StatsResult<Vec<BandCoverage>> {
    if let Some((index, &value)) = multipliers.iter().enumerate().find(|(_, k)| !k.is_finite()) {
        return Err(StatsError::NonFiniteMultiplier { index, value });
    }
    let mut sample: Vec<f64> = row.iter().copied().filter(|v| !v.is_nan()).collect();
    if sample.len() < 2 {
        return Err(StatsError::EmptyInput { what: "observations" });
    }
    sample.sort_by(f64::total_cmp);

    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let std = (sample.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
    let reference = Normal::new(mean, std)?;

    Ok(multipliers
        .iter()
        .map(|&k| {
            let level = mean + k * std;
            let below = sample.partition_point(|v| *v < level);
            BandCoverage {
                multiplier: k,
                level,
                empirical_below: below as f64 / n,
                normal_below: reference.cdf(level),
            }
        })
        .collect())
}

/// band_errors — band levels `m ± kσ` and their standard errors.
///
/// # Errors
/// - [`StatsError::DimensionMismatch`] when the tables have different
///   horizon counts.
/// - [`StatsError::NonFiniteMultiplier`] for a non-finite `k`.
pub fn band_errors(stats: &StatsTable, errors: &StatsTable, k: f64) -> StatsResult<Bands> {
    if stats.n_horizons() != errors.n_horizons() {
        return Err(StatsError::DimensionMismatch {
            what: "error table horizons",
            expected: stats.n_horizons(),
            found: errors.n_horizons(),
        });
    }
    if !k.is_finite() {
        return Err(StatsError::NonFiniteMultiplier { index: 0, value: k });
    }
    let (s, e) = (stats.view(), errors.view());
    let column = |mean: usize, std: usize| {
        let upper = &s.column(mean) + &(&s.column(std) * k);
        let lower = &s.column(mean) - &(&s.column(std) * k);
        let error = e.column(mean).mapv(|v| v * v) + e.column(std).mapv(|v| (k * v).powi(2));
        (upper, lower, error.mapv(f64::sqrt))
    };
    let (upper, lower, error) = column(MEAN, STD);
    let (annualized_upper, annualized_lower, annualized_error) = column(ANN_MEAN, ANN_STD);
    Ok(Bands {
        multiplier: k,
        upper,
        lower,
        error,
        annualized_upper,
        annualized_lower,
        annualized_error,
    })
}
