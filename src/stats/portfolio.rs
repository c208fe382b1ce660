//! stats::portfolio — weighted multi-security return statistics.
//!
//! Purpose
//! -------
//! Combine the return matrices of K securities with scalar weights into
//! portfolio-level statistics, propagating the cross-security covariance
//! at every horizon.
//!
//! Key behaviors
//! -------------
//! - Per horizon: mean vector `μ` and pairwise sample covariance `Σ`
//!   (`n − 1`, NaNs excluded pairwise) across the K securities, then
//!   `μ_p = wᵀμ` and `σ²_p = wᵀΣw`; the same again on annualized returns.
//! - Standard errors use `n` = origins where every security is defined.
//! - The combined return matrix is `Σ w_k R_k`, `NaN` where any input is.
//!
//! Invariants & assumptions
//! ------------------------
//! - All matrices share the horizon rows and the origin columns (same
//!   count and same first origin tick).
//! - A single security with weight 1 reproduces
//!   [`single_security_stats`](super::summary::single_security_stats)
//!   exactly; both paths go through [`row_moments`].
use crate::{
    series::{horizons::HorizonSet, returns::ReturnMatrix},
    stats::{
        errors::{StatsError, StatsResult},
        summary::{StatsTable, annualize, row_moments, standard_errors},
    },
};
use ndarray::{Array1, Array2, ArrayView1};

/// Portfolio statistics at every horizon.
///
/// Fields
/// ------
/// - `stats`, `errors`: tables with columns
///   `[mean, std, annualized_mean, annualized_std]`.
/// - `combined`: weighted return matrix `Σ w_k R_k`.
/// - `covariances`, `annualized_covariances`: the `K × K` covariance per
///   horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioStats {
    pub stats: StatsTable,
    pub errors: StatsTable,
    pub combined: ReturnMatrix,
    pub covariances: Vec<Array2<f64>>,
    pub annualized_covariances: Vec<Array2<f64>>,
}

/// portfolio_stats — weighted statistics over K return matrices.
///
/// Parameters
/// ----------
/// - `horizons`: `&HorizonSet`
///   Horizons in months, in row order.
/// - `holdings`: `&[(&ReturnMatrix, f64)]`
///   One `(matrix, weight)` pair per security.
///
/// Returns
/// -------
/// `StatsResult<PortfolioStats>`
///
/// Errors
/// ------
/// - `StatsError::EmptyInput` when `holdings` is empty.
/// - `StatsError::DimensionMismatch` when a matrix has the wrong number of
///   horizons or origins.
/// - `StatsError::OriginMismatch` when first origin ticks differ.
/// - `StatsError::NonFiniteWeight` for a `NaN`/`±∞` weight.
pub fn portfolio_stats(
    horizons: &HorizonSet, holdings: &[(&ReturnMatrix, f64)],
) -> StatsResult<PortfolioStats> {
    let (first, _) = holdings.first().ok_or(StatsError::EmptyInput { what: "return matrices" })?;
    let (n_horizons, n_origins) = (horizons.len(), first.n_origins());
    for (index, (matrix, weight)) in holdings.iter().enumerate() {
        if matrix.n_horizons() != n_horizons {
            return Err(StatsError::DimensionMismatch {
                what: "horizons",
                expected: n_horizons,
                found: matrix.n_horizons(),
            });
        }
        if matrix.n_origins() != n_origins {
            return Err(StatsError::DimensionMismatch {
                what: "origins",
                expected: n_origins,
                found: matrix.n_origins(),
            });
        }
        if matrix.first_origin() != first.first_origin() {
            return Err(StatsError::OriginMismatch {
                expected: first.first_origin(),
                found: matrix.first_origin(),
            });
        }
        if !weight.is_finite() {
            return Err(StatsError::NonFiniteWeight { index, value: *weight });
        }
    }

    let weights = Array1::from_iter(holdings.iter().map(|(_, w)| *w));
    let annualized = holdings
        .iter()
        .map(|(matrix, _)| annualize(matrix.view(), horizons.months()))
        .collect::<StatsResult<Vec<_>>>()?;

    let mut stats = Array2::<f64>::zeros((n_horizons, 4));
    let mut errors = Array2::<f64>::zeros((n_horizons, 4));
    let mut covariances = Vec::with_capacity(n_horizons);
    let mut annualized_covariances = Vec::with_capacity(n_horizons);
    for h in 0..n_horizons {
        let raw_rows: Vec<ArrayView1<'_, f64>> =
            holdings.iter().map(|(matrix, _)| matrix.row(h)).collect();
        let ann_rows: Vec<ArrayView1<'_, f64>> = annualized.iter().map(|m| m.row(h)).collect();

        for (offset, rows) in [raw_rows, ann_rows].iter().enumerate() {
            let moments = row_moments(rows);
            let mean = weights.dot(&moments.means);
            let std = weights.dot(&moments.covariance.dot(&weights)).sqrt();
            let (se_mean, se_std) = standard_errors(std, moments.complete);
            stats[[h, 2 * offset]] = mean;
            stats[[h, 2 * offset + 1]] = std;
            errors[[h, 2 * offset]] = se_mean;
            errors[[h, 2 * offset + 1]] = se_std;
            if offset == 0 {
                covariances.push(moments.covariance);
            } else {
                annualized_covariances.push(moments.covariance);
            }
        }
    }

    let mut combined = Array2::<f64>::zeros((n_horizons, n_origins));
    for (matrix, weight) in holdings {
        combined.scaled_add(*weight, &matrix.view());
    }
    let combined =
        ReturnMatrix::from_parts(combined, first.horizon_ticks().to_vec(), first.first_origin())
            .map_err(|_| StatsError::DimensionMismatch {
                what: "combined horizons",
                expected: n_horizons,
                found: first.horizon_ticks().len(),
            })?;

    Ok(PortfolioStats {
        stats: StatsTable::new(stats)?,
        errors: StatsTable::new(errors)?,
        combined,
        covariances,
        annualized_covariances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summary::single_security_stats;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Reduction of a one-security portfolio to the single-security path.
    // - Weighted mean/variance propagation across two securities.
    // - Combined matrix NaN propagation and input validation.
    // -------------------------------------------------------------------------

    fn matrix(rows: Array2<f64>) -> ReturnMatrix {
        let horizons = (0..rows.nrows()).map(|i| 30 * (i as i64 + 1)).collect();
        ReturnMatrix::from_parts(rows, horizons, 0).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // K = 1 with weight 1 reproduces the single-security tables.
    //
    // Given
    // -----
    // - A two-horizon matrix with NaN tails.
    //
    // Expect
    // ------
    // - stats and errors tables equal (NaN-free cells compared exactly).
    fn single_holding_matches_single_security_stats() {
        // Arrange
        let m = matrix(array![
            [0.01, 0.03, -0.02, 0.05, 0.00, f64::NAN],
            [0.02, 0.07, -0.01, 0.04, f64::NAN, f64::NAN]
        ]);
        let horizons = HorizonSet::new(vec![1, 2]).unwrap();

        // Act
        let (stats, errors) = single_security_stats(&m, &horizons).unwrap();
        let portfolio = portfolio_stats(&horizons, &[(&m, 1.0)]).unwrap();

        // Assert
        assert_eq!(portfolio.stats, stats);
        assert_eq!(portfolio.errors, errors);
        for (c, v) in portfolio.combined.view().iter().zip(m.view().iter()) {
            assert!(c == v || (c.is_nan() && v.is_nan()));
        }
    }

    #[test]
    // Purpose
    // -------
    // Mean and variance follow wᵀμ and wᵀΣw.
    //
    // Given
    // -----
    // - a = [1, 2, 3], b = [2, 4, 7] at one 12-month horizon, w = (0.5, 0.5).
    //
    // Expect
    // ------
    // - μ_p = 3.1667; Σ = [[1, 2.5], [2.5, 6.3333]];
    //   σ²_p = 0.25·(1 + 5 + 6.3333) = 3.0833.
    fn two_holdings_propagate_covariance() {
        // Arrange
        let a = matrix(array![[1.0, 2.0, 3.0]]);
        let b = matrix(array![[2.0, 4.0, 7.0]]);
        let horizons = HorizonSet::new(vec![12]).unwrap();

        // Act
        let out = portfolio_stats(&horizons, &[(&a, 0.5), (&b, 0.5)]).unwrap();

        // Assert
        assert_relative_eq!(out.stats.mean()[0], 19.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(out.covariances[0][[0, 1]], 2.5, epsilon = 1e-12);
        let expected_var: f64 = 0.25 * (1.0 + 5.0 + 19.0 / 3.0);
        assert_relative_eq!(out.stats.std()[0], expected_var.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(out.stats.annualized_mean()[0], out.stats.mean()[0], epsilon = 1e-12);
        assert_relative_eq!(out.combined.view()[[0, 2]], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn combined_matrix_propagates_nan_and_counts_complete_origins() {
        let a = matrix(array![[0.1, f64::NAN, 0.3, 0.2]]);
        let b = matrix(array![[0.2, 0.1, f64::NAN, 0.4]]);
        let horizons = HorizonSet::new(vec![1]).unwrap();

        let out = portfolio_stats(&horizons, &[(&a, 1.0), (&b, 1.0)]).unwrap();

        let combined = out.combined.view();
        assert!(combined[[0, 1]].is_nan());
        assert!(combined[[0, 2]].is_nan());
        assert_relative_eq!(combined[[0, 3]], 0.6, epsilon = 1e-12);
        // Two complete origins: se_mean = σ / √2.
        let expected = out.stats.std()[0] / 2f64.sqrt();
        assert_relative_eq!(out.errors.mean()[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let horizons = HorizonSet::new(vec![1]).unwrap();
        let a = matrix(array![[0.1, 0.2, 0.3]]);
        let short = matrix(array![[0.1, 0.2]]);
        let shifted = ReturnMatrix::from_parts(array![[0.1, 0.2, 0.3]], vec![30], 5).unwrap();
        let two_rows = matrix(array![[0.1, 0.2, 0.3], [0.1, 0.2, 0.3]]);

        assert_eq!(
            portfolio_stats(&horizons, &[]),
            Err(StatsError::EmptyInput { what: "return matrices" })
        );
        assert!(matches!(
            portfolio_stats(&horizons, &[(&a, 0.5), (&short, 0.5)]),
            Err(StatsError::DimensionMismatch { what: "origins", expected: 3, found: 2 })
        ));
        assert_eq!(
            portfolio_stats(&horizons, &[(&a, 0.5), (&shifted, 0.5)]),
            Err(StatsError::OriginMismatch { expected: 0, found: 5 })
        );
        assert!(matches!(
            portfolio_stats(&horizons, &[(&two_rows, 1.0)]),
            Err(StatsError::DimensionMismatch { what: "horizons", .. })
        ));
        assert!(matches!(
            portfolio_stats(&horizons, &[(&a, f64::NAN)]),
            Err(StatsError::NonFiniteWeight { index: 0, .. })
        ));
    }
}
