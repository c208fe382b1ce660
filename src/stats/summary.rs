//! stats::summary — per-horizon return statistics for one security.
//!
//! Purpose
//! -------
//! Reduce a [`ReturnMatrix`] to a per-horizon table of mean and standard
//! deviation, on raw and on annualized returns, together with the
//! standard errors of those estimates.
//!
//! Key behaviors
//! -------------
//! - [`StatsTable`]: `n_horizons × 4` table with columns
//!   `[mean, std, annualized_mean, annualized_std]`.
//! - [`annualize`]: `(1 + r)^(12 / months) − 1` per row.
//! - [`single_security_stats`]: the statistics table and its error table
//!   (`σ/√n` for the mean, `σ/√(2n − 2)` for the standard deviation).
//!
//! Invariants & assumptions
//! ------------------------
//! - `NaN` cells are ignored; `n` counts the defined cells of each row.
//! - Standard deviations are sample estimates (`n − 1`); they come from the
//!   same pairwise-covariance routine used by the portfolio path, so a
//!   one-security portfolio reproduces these numbers.
//! - Rows with fewer than two defined cells yield `NaN` statistics.
use crate::{
    series::{horizons::HorizonSet, returns::ReturnMatrix},
    stats::errors::{StatsError, StatsResult},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Column of the mean in a [`StatsTable`].
pub const MEAN: usize = 0;
/// Column of the standard deviation.
pub const STD: usize = 1;
/// Column of the annualized mean.
pub const ANN_MEAN: usize = 2;
/// Column of the annualized standard deviation.
pub const ANN_STD: usize = 3;

/// Per-horizon statistics, rows = horizons, columns
/// `[mean, std, annualized_mean, annualized_std]`.
///
/// The same layout is used for the matching error table, where each column
/// holds the standard error of the corresponding estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTable {
    data: Array2<f64>,
}

impl StatsTable {
    /// # Errors
    /// [`StatsError::DimensionMismatch`] when `data` does not have 4 columns.
    pub fn new(data: Array2<f64>) -> StatsResult<Self> {
        if data.ncols() != 4 {
            return Err(StatsError::DimensionMismatch {
                what: "stats table columns",
                expected: 4,
                found: data.ncols(),
            });
        }
        Ok(Self { data })
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn n_horizons(&self) -> usize {
        self.data.nrows()
    }

    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.data.column(MEAN)
    }

    pub fn std(&self) -> ArrayView1<'_, f64> {
        self.data.column(STD)
    }

    pub fn annualized_mean(&self) -> ArrayView1<'_, f64> {
        self.data.column(ANN_MEAN)
    }

    pub fn annualized_std(&self) -> ArrayView1<'_, f64> {
        self.data.column(ANN_STD)
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }
}

/// Moments of K aligned rows at one horizon.
///
/// - `means[k]`: mean of the defined cells of row `k`.
/// - `covariance[[i, j]]`: sample covariance over origins where both rows
///   are defined (`NaN` with fewer than two such origins).
/// - `complete`: number of origins where every row is defined.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMoments {
    pub means: Array1<f64>,
    pub covariance: Array2<f64>,
    pub complete: usize,
}

/// row_moments — NaN-aware means and pairwise sample covariance.
pub fn row_moments(rows: &[ArrayView1<'_, f64>]) -> RowMoments {
    let k = rows.len();
    let means = Array1::from_iter(rows.iter().map(|row| nan_mean(*row)));
    let mut covariance = Array2::<f64>::zeros((k, k));
    for i in 0..k {
        for j in i..k {
            let c = pairwise_covariance(rows[i], rows[j]);
            covariance[[i, j]] = c;
            covariance[[j, i]] = c;
        }
    }
    let n_origins = rows.first().map_or(0, |row| row.len());
    let complete =
        (0..n_origins).filter(|&t| rows.iter().all(|row| !row[t].is_nan())).count();
    RowMoments { means, covariance, complete }
}

/// annualize — `(1 + r)^(12 / months) − 1` for every cell of each row.
///
/// Rows are matched to `months` in order; `NaN` cells stay `NaN`.
///
/// # Errors
/// [`StatsError::DimensionMismatch`] when the row count differs from the
/// number of horizons.
pub fn annualize(returns: ArrayView2<'_, f64>, months: &[u32]) -> StatsResult<Array2<f64>> {
    if returns.nrows() != months.len() {
        return Err(StatsError::DimensionMismatch {
            what: "horizons",
            expected: months.len(),
            found: returns.nrows(),
        });
    }
    let mut out = returns.to_owned();
    for (mut row, &m) in out.rows_mut().into_iter().zip(months.iter()) {
        let exponent = 12.0 / f64::from(m);
        row.mapv_inplace(|r| (1.0 + r).powf(exponent) - 1.0);
    }
    Ok(out)
}

/// single_security_stats — statistics and error tables for one matrix.
///
/// Parameters
/// ----------
/// - `matrix`: `&ReturnMatrix`
///   Returns, one row per horizon.
/// - `horizons`: `&HorizonSet`
///   Horizons in months, in row order (used for annualization).
///
/// Returns
/// -------
/// `StatsResult<(StatsTable, StatsTable)>`
///   `(stats, errors)`; see the module docs for the column layout.
///
/// Errors
/// ------
/// - `StatsError::DimensionMismatch` if the horizon count differs from the
///   number of matrix rows.
pub fn single_security_stats(
    matrix: &ReturnMatrix, horizons: &HorizonSet,
) -> StatsResult<(StatsTable, StatsTable)> {
    let raw = matrix.view();
    let annualized = annualize(raw, horizons.months())?;
    let n_horizons = horizons.len();
    let mut stats = Array2::<f64>::zeros((n_horizons, 4));
    let mut errors = Array2::<f64>::zeros((n_horizons, 4));

    for h in 0..n_horizons {
        for (offset, source) in [raw, annualized.view()].into_iter().enumerate() {
            let moments = row_moments(&[source.row(h)]);
            let mean = moments.means[0];
            let std = moments.covariance[[0, 0]].sqrt();
            let (se_mean, se_std) = standard_errors(std, moments.complete);
            stats[[h, 2 * offset]] = mean;
            stats[[h, 2 * offset + 1]] = std;
            errors[[h, 2 * offset]] = se_mean;
            errors[[h, 2 * offset + 1]] = se_std;
        }
    }
    Ok((StatsTable::new(stats)?, StatsTable::new(errors)?))
}

/// Standard errors `(σ/√n, σ/√(2n − 2))`.
pub fn standard_errors(std: f64, n: usize) -> (f64, f64) {
    let n = n as f64;
    (std / n.sqrt(), std / (2.0 * n - 2.0).sqrt())
}

// ---- Helper methods ----

fn nan_mean(row: ArrayView1<'_, f64>) -> f64 {
    let (sum, count) = row
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

fn pairwise_covariance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(x, y)| (*x, *y))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    let ma = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mb = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    pairs.iter().map(|(x, y)| (x - ma) * (y - mb)).sum::<f64>() / (n - 1) as f64
}
