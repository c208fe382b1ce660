//! series::returns — relative returns per (horizon, origin).
//!
//! Purpose
//! -------
//! Build the rectangular [`ReturnMatrix`] from which all return statistics
//! are derived: one row per horizon, one column per time origin.
//!
//! Invariants & assumptions
//! ------------------------
//! - Cell `(h, t)` equals `(v[t + h] − v[t]) / v[t + h]`, where the
//!   denominator is the value at the **end** of the horizon, not the
//!   start.
//! - Cells with `t + h ≥ N` are `NaN`; the matrix is never ragged.
//! - The input series is not modified.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

use crate::series::{
    dense::DenseSeries,
    errors::{SeriesError, SeriesResult},
};

/// ReturnMatrix — relative returns, rows = horizons, columns = origins.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    returns: Array2<f64>,
    horizon_ticks: Vec<i64>,
    first_origin: i64,
}

impl ReturnMatrix {
    /// Wrap an existing matrix (e.g. a weighted combination).
    ///
    /// # Errors
    /// [`SeriesError::LengthMismatch`] when the row count differs from the
    /// number of horizons.
    pub fn from_parts(
        returns: Array2<f64>, horizon_ticks: Vec<i64>, first_origin: i64,
    ) -> SeriesResult<Self> {
        if returns.nrows() != horizon_ticks.len() {
            return Err(SeriesError::LengthMismatch {
                ticks: horizon_ticks.len(),
                values: returns.nrows(),
            });
        }
        Ok(Self { returns, horizon_ticks, first_origin })
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.returns.view()
    }

    pub fn row(&self, horizon_index: usize) -> ArrayView1<'_, f64> {
        self.returns.row(horizon_index)
    }

    pub fn n_horizons(&self) -> usize {
        self.returns.nrows()
    }

    pub fn n_origins(&self) -> usize {
        self.returns.ncols()
    }

    pub fn horizon_ticks(&self) -> &[i64] {
        &self.horizon_ticks
    }

    /// Tick of the first origin column.
    pub fn first_origin(&self) -> i64 {
        self.first_origin
    }

    /// Ticks of every origin column.
    pub fn origin_ticks(&self) -> Array1<i64> {
        Array1::from_iter(self.first_origin..self.first_origin + self.n_origins() as i64)
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.returns
    }
}

/// build_return_matrix — relative returns for every horizon and origin.
///
/// Parameters
/// ----------
/// - `series`: `&DenseSeries`
///   Dense value series.
/// - `horizons_in_ticks`: `&[i64]`
///   Strictly positive horizon lengths in ticks (row order).
/// - `start_tick`: `Option<i64>`
///   First origin; the series is sliced to start there. `None` uses the
///   first tick of the series.
///
/// Returns
/// -------
/// `SeriesResult<ReturnMatrix>`
///   `horizons × origins` matrix with `NaN` where the horizon runs past
///   the end of the data.
///
/// Errors
/// ------
/// - `SeriesError::InvalidHorizon` for a non-positive horizon.
/// - `SeriesError::StartTickOutOfRange` when `start_tick` is not covered.
/// - `SeriesError::InsufficientData` when a horizon is at least as long as
///   the (sliced) series, leaving its whole row undefined.
pub fn build_return_matrix(
    series: &DenseSeries, horizons_in_ticks: &[i64], start_tick: Option<i64>,
) -> SeriesResult<ReturnMatrix> {
    if let Some((index, &value)) = horizons_in_ticks.iter().enumerate().find(|(_, h)| **h <= 0) {
        return Err(SeriesError::InvalidHorizon { index, value });
    }
    let start = match start_tick {
        Some(tick) => series.position(tick).ok_or(SeriesError::StartTickOutOfRange {
            start_tick: tick,
            first: series.first_tick(),
            last: series.last_tick(),
        })?,
        None => 0,
    };

    let values = series.values();
    let values = values.slice(s![start..]);
    let n = values.len();
    if let Some(&longest) = horizons_in_ticks.iter().max() {
        if longest as usize >= n {
            return Err(SeriesError::InsufficientData { required: longest as usize + 1, actual: n });
        }
    }

    let mut returns = Array2::<f64>::from_elem((horizons_in_ticks.len(), n), f64::NAN);
    for (mut row, &h) in returns.outer_iter_mut().zip(horizons_in_ticks) {
        let h = h as usize;
        for t in 0..n - h {
            let future = values[t + h];
            row[t] = (future - values[t]) / future;
        }
    }

    ReturnMatrix::from_parts(returns, horizons_in_ticks.to_vec(), series.first_tick() + start as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::horizons::HorizonSet;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The future-value denominator and the NaN boundary rule.
    // - The 1-month scenario on a linear price path.
    // - Slicing by start tick and structural failures.
    // -------------------------------------------------------------------------

    fn linear_series() -> DenseSeries {
        // 100, 101, ..., 150 over consecutive ticks
        DenseSeries::from_values(0, Array1::from_iter((0..51).map(|k| 100.0 + k as f64))).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A cell is NaN exactly when the horizon runs past the data and equals
    // the future-denominator return otherwise.
    fn cells_follow_boundary_rule_and_formula() {
        let series = linear_series();
        let horizons = [1, 7, 30];

        let matrix = build_return_matrix(&series, &horizons, None).unwrap();

        let v = series.values();
        let n = series.len();
        assert_eq!(matrix.n_horizons(), 3);
        assert_eq!(matrix.n_origins(), n);
        for (i, &h) in horizons.iter().enumerate() {
            let h = h as usize;
            for t in 0..n {
                let cell = matrix.view()[[i, t]];
                if t + h >= n {
                    assert!(cell.is_nan(), "expected NaN at ({i}, {t})");
                } else {
                    assert_eq!(cell, (v[t + h] - v[t]) / v[t + h]);
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // One month (30 ticks) on 100..150 from origin 0 gives (130 − 100) / 130.
    fn one_month_return_on_linear_path() {
        let series = linear_series();
        let horizons = HorizonSet::new(vec![1]).unwrap().to_ticks();

        let matrix = build_return_matrix(&series, &horizons, None).unwrap();

        assert_eq!(horizons, vec![30]);
        assert_relative_eq!(matrix.view()[[0, 0]], 30.0 / 130.0, epsilon = 1e-15);
        assert_relative_eq!(matrix.view()[[0, 0]], 0.2308, epsilon = 1e-4);
    }

    #[test]
    fn start_tick_slices_origins() {
        let series = linear_series();

        let matrix = build_return_matrix(&series, &[5], Some(10)).unwrap();

        assert_eq!(matrix.first_origin(), 10);
        assert_eq!(matrix.n_origins(), series.len() - 10);
        assert_eq!(matrix.view()[[0, 0]], (115.0 - 110.0) / 115.0);
    }

    #[test]
    fn structural_failures_are_reported() {
        let series = linear_series();

        assert!(matches!(
            build_return_matrix(&series, &[51], None),
            Err(SeriesError::InsufficientData { .. })
        ));
        assert!(matches!(
            build_return_matrix(&series, &[0], None),
            Err(SeriesError::InvalidHorizon { index: 0, value: 0 })
        ));
        assert!(matches!(
            build_return_matrix(&series, &[1], Some(500)),
            Err(SeriesError::StartTickOutOfRange { .. })
        ));
    }
}
