//! series::dense — unit-step value series on the tick axis.
//!
//! Purpose
//! -------
//! Own the [`DenseSeries`] container and the densification step that turns
//! sparse, irregular (tick, value) samples into one value per tick.
//!
//! Key behaviors
//! -------------
//! - [`clean_samples`] drops placeholder / non-numeric entries coming from
//!   scraped exports before anything numeric happens.
//! - [`orient_chronologically`] reverses newest-first exports.
//! - [`densify`] interpolates the cleaned samples with a monotone cubic
//!   onto every tick in `[first_tick, last_tick)`.
//! - [`DenseSeries::from_dense`] validates a series that is already dense.
//!
//! Invariants & assumptions
//! ------------------------
//! - A constructed [`DenseSeries`] has equal-length `ticks` and `values`,
//!   `ticks[i + 1] == ticks[i] + 1`, at least one sample, and only finite
//!   values.
//! - The series is immutable once built; operations that change the shape
//!   of the history (the backtrace fitter) return a new series.
//!
//! Conventions
//! -----------
//! - The last raw sample acts as an interpolation node but is not emitted,
//!   so densifying a dense series reproduces it on `[t_0, t_last)`.
use ndarray::{Array1, ArrayView1, s};

use crate::series::{
    errors::{SeriesError, SeriesResult},
    interpolation::MonotoneCubic,
};

/// Textual placeholders treated as missing observations.
pub const MISSING_MARKERS: [&str; 6] = ["", "-", "--", "n/a", "na", "nan"];

/// DenseSeries — one finite value per consecutive tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSeries {
    ticks: Array1<i64>,
    values: Array1<f64>,
}

impl DenseSeries {
    /// Validate an already-dense series.
    ///
    /// # Errors
    /// - [`SeriesError::LengthMismatch`] when the arrays differ in length.
    /// - [`SeriesError::InsufficientData`] for an empty series.
    /// - [`SeriesError::NonUnitStep`] when consecutive ticks are not one apart.
    /// - [`SeriesError::NonFiniteValue`] on any `NaN`/`±∞` value.
    pub fn from_dense(ticks: Array1<i64>, values: Array1<f64>) -> SeriesResult<Self> {
        if ticks.len() != values.len() {
            return Err(SeriesError::LengthMismatch { ticks: ticks.len(), values: values.len() });
        }
        if ticks.is_empty() {
            return Err(SeriesError::InsufficientData { required: 1, actual: 0 });
        }
        for index in 1..ticks.len() {
            let step = ticks[index] - ticks[index - 1];
            if step != 1 {
                return Err(SeriesError::NonUnitStep { index, step });
            }
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(SeriesError::NonFiniteValue { index, value });
        }
        Ok(Self { ticks, values })
    }

    /// Build from a start tick and consecutive values.
    pub fn from_values(start_tick: i64, values: Array1<f64>) -> SeriesResult<Self> {
        let ticks = Array1::from_iter(start_tick..start_tick + values.len() as i64);
        Self::from_dense(ticks, values)
    }

    pub fn ticks(&self) -> ArrayView1<'_, i64> {
        self.ticks.view()
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_tick(&self) -> i64 {
        self.ticks[0]
    }

    pub fn last_tick(&self) -> i64 {
        self.ticks[self.ticks.len() - 1]
    }

    /// Position of `tick` in the series, if covered.
    pub fn position(&self, tick: i64) -> Option<usize> {
        let offset = tick - self.first_tick();
        if offset >= 0 && (offset as usize) < self.len() { Some(offset as usize) } else { None }
    }

    /// Value at `tick`, if covered.
    pub fn value_at(&self, tick: i64) -> Option<f64> {
        self.position(tick).map(|i| self.values[i])
    }

    /// Sub-series covering ticks `[from, to]` (inclusive), clipped to the data.
    ///
    /// # Errors
    /// [`SeriesError::InsufficientData`] when the window holds no sample.
    pub fn window(&self, from: i64, to: i64) -> SeriesResult<Self> {
        let start = (from - self.first_tick()).max(0) as usize;
        let end = ((to - self.first_tick() + 1).max(0) as usize).min(self.len());
        if start >= end {
            return Err(SeriesError::InsufficientData { required: 1, actual: 0 });
        }
        Ok(Self {
            ticks: self.ticks.slice(s![start..end]).to_owned(),
            values: self.values.slice(s![start..end]).to_owned(),
        })
    }

    pub fn into_parts(self) -> (Array1<i64>, Array1<f64>) {
        (self.ticks, self.values)
    }
}

/// clean_samples — drop missing / non-numeric raw entries.
///
/// Parameters
/// ----------
/// - `ticks`: `&[i64]`
///   Raw sample ticks, aligned with `raw_values`.
/// - `raw_values`: `&[S]`
///   Raw textual values as exported by the data source. Entries matching
///   [`MISSING_MARKERS`] (case-insensitive, trimmed), unparsable entries,
///   and non-finite numbers are removed together with their tick.
///
/// Returns
/// -------
/// `SeriesResult<(Vec<i64>, Vec<f64>)>`
///   The surviving (tick, value) pairs in input order.
///
/// Errors
/// ------
/// - `SeriesError::LengthMismatch` when the inputs differ in length.
pub fn clean_samples<S: AsRef<str>>(
    ticks: &[i64], raw_values: &[S],
) -> SeriesResult<(Vec<i64>, Vec<f64>)> {
    if ticks.len() != raw_values.len() {
        return Err(SeriesError::LengthMismatch { ticks: ticks.len(), values: raw_values.len() });
    }
    let (kept_ticks, kept_values) = ticks
        .iter()
        .zip(raw_values)
        .filter_map(|(&tick, raw)| {
            let text = raw.as_ref().trim();
            if MISSING_MARKERS.contains(&text.to_lowercase().as_str()) {
                return None;
            }
            let value: f64 = text.replace(',', "").parse().ok()?;
            value.is_finite().then_some((tick, value))
        })
        .unzip();
    Ok((kept_ticks, kept_values))
}

/// Reverse a newest-first sample sequence into chronological order.
///
/// Sequences that are already ascending are returned unchanged.
pub fn orient_chronologically(ticks: Vec<i64>, values: Vec<f64>) -> (Vec<i64>, Vec<f64>) {
    match (ticks.first(), ticks.last()) {
        (Some(first), Some(last)) if first > last => {
            (ticks.into_iter().rev().collect(), values.into_iter().rev().collect())
        }
        _ => (ticks, values),
    }
}

/// densify — interpolate irregular samples onto every tick.
///
/// Purpose
/// -------
/// Remove sampling bias from irregular exports by evaluating a
/// shape-preserving monotone cubic through the samples at each tick in
/// `[min_tick, max_tick)`.
///
/// Parameters
/// ----------
/// - `ticks`: `&[i64]`
///   Sample ticks; strictly increasing after non-finite values are removed.
/// - `values`: `&[f64]`
///   Sample values; `NaN`/`±∞` entries are treated as missing and dropped
///   with their tick.
///
/// Returns
/// -------
/// `SeriesResult<DenseSeries>`
///   A unit-step series of `max_tick - min_tick` samples.
///
/// Errors
/// ------
/// - `SeriesError::LengthMismatch` when the inputs differ in length.
/// - `SeriesError::InsufficientData` when fewer than two usable samples
///   remain.
/// - `SeriesError::NonIncreasingTicks` when the remaining ticks are not
///   strictly increasing.
pub fn densify(ticks: &[i64], values: &[f64]) -> SeriesResult<DenseSeries> {
    if ticks.len() != values.len() {
        return Err(SeriesError::LengthMismatch { ticks: ticks.len(), values: values.len() });
    }
    let (x, y): (Vec<i64>, Vec<f64>) =
        ticks.iter().zip(values).filter(|(_, v)| v.is_finite()).map(|(&t, &v)| (t, v)).unzip();
    if x.len() < 2 {
        return Err(SeriesError::InsufficientData { required: 2, actual: x.len() });
    }
    for index in 1..x.len() {
        if x[index] <= x[index - 1] {
            return Err(SeriesError::NonIncreasingTicks {
                index,
                previous: x[index - 1],
                current: x[index],
            });
        }
    }

    let (first, last) = (x[0], x[x.len() - 1]);
    let interp = MonotoneCubic::new(x.iter().map(|&t| t as f64).collect(), y)?;
    let dense = interp.sample_unit_grid(first, last)?;
    DenseSeries::from_values(first, Array1::from(dense))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation performed by `DenseSeries::from_dense`.
    // - Densification length, node reproduction, and idempotence on dense
    //   input.
    // - Removal of placeholder entries and the two-sample minimum.
    // -------------------------------------------------------------------------

    #[test]
    fn from_dense_rejects_gaps_and_non_finite_values() {
        assert_eq!(
            DenseSeries::from_dense(array![1, 2, 4], array![1.0, 2.0, 3.0]).unwrap_err(),
            SeriesError::NonUnitStep { index: 2, step: 2 }
        );
        assert!(matches!(
            DenseSeries::from_dense(array![1, 2], array![1.0, f64::NAN]),
            Err(SeriesError::NonFiniteValue { index: 1, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Densify covers `[min_tick, max_tick)` and hits every raw sample that
    // falls inside that range.
    fn densify_covers_half_open_range_and_hits_nodes() {
        let ticks = [10, 13, 20, 31];
        let values = [100.0, 103.0, 99.0, 120.0];

        let dense = densify(&ticks, &values).unwrap();

        assert_eq!(dense.len(), 21);
        assert_eq!(dense.first_tick(), 10);
        assert_eq!(dense.last_tick(), 30);
        assert_relative_eq!(dense.value_at(13).unwrap(), 103.0, epsilon = 1e-12);
        assert_relative_eq!(dense.value_at(20).unwrap(), 99.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Densifying an already-dense unit-step series leaves its values
    // unchanged on the shared tick range.
    fn densify_is_idempotent_on_dense_input() {
        let ticks: Vec<i64> = (100..150).collect();
        let values: Vec<f64> = ticks.iter().map(|&t| 50.0 + (t as f64 * 0.3).sin()).collect();

        let dense = densify(&ticks, &values).unwrap();

        assert_eq!(dense.len(), values.len() - 1);
        for (i, v) in dense.values().iter().enumerate() {
            assert_relative_eq!(*v, values[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn densify_drops_non_finite_samples_before_checking_count() {
        let err = densify(&[1, 2, 3], &[f64::NAN, 1.0, f64::INFINITY]).unwrap_err();
        assert_eq!(err, SeriesError::InsufficientData { required: 2, actual: 1 });
    }

    #[test]
    fn densify_rejects_unordered_ticks() {
        assert!(matches!(
            densify(&[5, 3, 8], &[1.0, 2.0, 3.0]),
            Err(SeriesError::NonIncreasingTicks { index: 1, previous: 5, current: 3 })
        ));
    }

    #[test]
    fn clean_samples_removes_placeholders() {
        let (ticks, values) =
            clean_samples(&[1, 2, 3, 4, 5], &["101.5", "--", "N/A", "1,204.25", "abc"]).unwrap();

        assert_eq!(ticks, vec![1, 4]);
        assert_eq!(values, vec![101.5, 1204.25]);
    }

    #[test]
    fn orient_chronologically_reverses_newest_first_exports() {
        let (ticks, values) = orient_chronologically(vec![30, 20, 10], vec![3.0, 2.0, 1.0]);
        assert_eq!(ticks, vec![10, 20, 30]);
        assert_eq!(values, vec![1.0, 2.0, 3.0]);

        let (ticks, _) = orient_chronologically(vec![1, 2], vec![1.0, 2.0]);
        assert_eq!(ticks, vec![1, 2]);
    }

    #[test]
    fn window_clips_to_available_ticks() {
        let series = DenseSeries::from_values(10, array![1.0, 2.0, 3.0, 4.0]).unwrap();

        let w = series.window(5, 11).unwrap();

        assert_eq!(w.ticks().to_vec(), vec![10, 11]);
        assert_eq!(w.values().to_vec(), vec![1.0, 2.0]);
        assert!(series.window(20, 30).is_err());
    }
}
