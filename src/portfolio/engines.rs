//! portfolio::engines — strategy seams between a security and the engines.
//!
//! A [`Security`](super::security::Security) does not implement
//! normalization, fitting or statistics itself; it delegates to three small
//! strategy traits. The zero-sized defaults forward to the free functions of
//! [`crate::series`], [`crate::backtrace`] and [`crate::stats`]; tests and
//! callers can substitute their own implementations.
use crate::{
    backtrace::{
        errors::BacktraceResult,
        fitter::{Backtrace, backtrace},
        options::BacktraceOptions,
    },
    series::{
        dense::{DenseSeries, densify, orient_chronologically},
        errors::SeriesResult,
        horizons::HorizonSet,
        returns::ReturnMatrix,
    },
    stats::{
        errors::StatsResult,
        summary::{StatsTable, single_security_stats},
    },
};

/// Turn raw `(tick, value)` samples into a dense series.
pub trait Normalize {
    fn normalize(&self, ticks: &[i64], values: &[f64]) -> SeriesResult<DenseSeries>;
}

/// Extend a security series backwards against a benchmark.
pub trait Fit {
    fn fit(
        &self, security: &DenseSeries, index: &DenseSeries, opts: &BacktraceOptions,
    ) -> BacktraceResult<Backtrace>;
}

/// Summarize a return matrix into `(stats, standard errors)` tables.
pub trait Summarize {
    fn summarize(
        &self, matrix: &ReturnMatrix, horizons: &HorizonSet,
    ) -> StatsResult<(StatsTable, StatsTable)>;
}

/// Orients newest-first exports chronologically, then [`densify`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer;

impl Normalize for Normalizer {
    fn normalize(&self, ticks: &[i64], values: &[f64]) -> SeriesResult<DenseSeries> {
        let (ticks, values) = orient_chronologically(ticks.to_vec(), values.to_vec());
        densify(&ticks, &values)
    }
}

/// Forwards to [`backtrace`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fitter;

impl Fit for Fitter {
    fn fit(
        &self, security: &DenseSeries, index: &DenseSeries, opts: &BacktraceOptions,
    ) -> BacktraceResult<Backtrace> {
        backtrace(security, index, opts)
    }
}

/// Forwards to [`single_security_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsEngine;

impl Summarize for StatsEngine {
    fn summarize(
        &self, matrix: &ReturnMatrix, horizons: &HorizonSet,
    ) -> StatsResult<(StatsTable, StatsTable)> {
        single_security_stats(matrix, horizons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalizer_reverses_newest_first_samples() {
        let ticks = [20, 10, 0];
        let values = [3.0, 2.0, 1.0];

        let series = Normalizer.normalize(&ticks, &values).unwrap();

        assert_eq!(series.first_tick(), 0);
        assert_eq!(series.len(), 20);
        assert_relative_eq!(series.value_at(10).unwrap(), 2.0, epsilon = 1e-12);
    }
}
