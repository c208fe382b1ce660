//! portfolio::security — one security and the pipeline stages it has run.
//!
//! Purpose
//! -------
//! Hold a security's data through the pipeline
//! `raw samples → dense series → (backtrace) → return matrix → stats`,
//! delegating each stage to a strategy from [`super::engines`].
//!
//! Key behaviors
//! -------------
//! - Every stage stores its output on the security and returns a reference
//!   to it; a stage that depends on an earlier one fails with
//!   [`PortfolioError::MissingStage`] when that stage has not run.
//! - Re-running an upstream stage invalidates downstream outputs: a new
//!   series clears the return matrix and stats.
//! - [`Security::backtrace`] keeps the pre-extension series as
//!   [`Security::security_only`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The stored series is always dense (built by a [`Normalize`] strategy or
//!   validated by [`DenseSeries`] itself).
use crate::{
    backtrace::{diagnostics::FitResult, options::BacktraceOptions},
    portfolio::{
        engines::{Fit, Fitter, Normalize, Normalizer, StatsEngine, Summarize},
        errors::{PortfolioError, PortfolioResult},
    },
    series::{
        dense::DenseSeries,
        horizons::HorizonSet,
        returns::{ReturnMatrix, build_return_matrix},
    },
    stats::summary::StatsTable,
};

/// Raw `(tick, value)` samples as received.
#[derive(Debug, Clone, PartialEq)]
struct RawSamples {
    ticks: Vec<i64>,
    values: Vec<f64>,
}

/// A named security with its pipeline outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Security<N = Normalizer, F = Fitter, S = StatsEngine> {
    name: String,
    raw: Option<RawSamples>,
    series: Option<DenseSeries>,
    security_only: Option<DenseSeries>,
    fit: Option<FitResult>,
    horizons: HorizonSet,
    return_matrix: Option<ReturnMatrix>,
    stats: Option<(StatsTable, StatsTable)>,
    normalizer: N,
    fitter: F,
    engine: S,
}

impl Security {
    /// Security from raw samples; call [`Security::densify`] before the
    /// other stages.
    pub fn from_samples(name: impl Into<String>, ticks: Vec<i64>, values: Vec<f64>) -> Self {
        Self::empty(name.into(), Some(RawSamples { ticks, values }), None)
    }

    /// Security from an already dense series.
    pub fn from_series(name: impl Into<String>, series: DenseSeries) -> Self {
        Self::empty(name.into(), None, Some(series))
    }

    fn empty(name: String, raw: Option<RawSamples>, series: Option<DenseSeries>) -> Self {
        Security {
            name,
            raw,
            series,
            security_only: None,
            fit: None,
            horizons: HorizonSet::default(),
            return_matrix: None,
            stats: None,
            normalizer: Normalizer,
            fitter: Fitter,
            engine: StatsEngine,
        }
    }
}

impl<N, F, S> Security<N, F, S> {
    /// Replace the strategies, keeping all data.
    pub fn with_engines<N2, F2, S2>(
        self, normalizer: N2, fitter: F2, engine: S2,
    ) -> Security<N2, F2, S2> {
        Security {
            name: self.name,
            raw: self.raw,
            series: self.series,
            security_only: self.security_only,
            fit: self.fit,
            horizons: self.horizons,
            return_matrix: self.return_matrix,
            stats: self.stats,
            normalizer,
            fitter,
            engine,
        }
    }

    /// Replace the horizon set; clears the return matrix and stats.
    pub fn with_horizons(mut self, horizons: HorizonSet) -> Self {
        self.set_horizons(horizons);
        self
    }

    pub(crate) fn set_horizons(&mut self, horizons: HorizonSet) {
        if horizons != self.horizons {
            self.horizons = horizons;
            self.clear_downstream();
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn horizons(&self) -> &HorizonSet {
        &self.horizons
    }

    /// Current dense series (extended after a backtrace).
    pub fn series(&self) -> Option<&DenseSeries> {
        self.series.as_ref()
    }

    /// The series as it was before the latest backtrace.
    pub fn security_only(&self) -> Option<&DenseSeries> {
        self.security_only.as_ref()
    }

    pub fn fit_result(&self) -> Option<&FitResult> {
        self.fit.as_ref()
    }

    pub fn return_matrix(&self) -> Option<&ReturnMatrix> {
        self.return_matrix.as_ref()
    }

    /// `(stats, standard errors)` tables.
    pub fn stats(&self) -> Option<&(StatsTable, StatsTable)> {
        self.stats.as_ref()
    }

    fn require_series(&self) -> PortfolioResult<&DenseSeries> {
        self.series.as_ref().ok_or_else(|| self.missing("dense series"))
    }

    pub(crate) fn missing(&self, stage: &'static str) -> PortfolioError {
        PortfolioError::MissingStage { name: self.name.clone(), stage }
    }

    fn clear_downstream(&mut self) {
        self.return_matrix = None;
        self.stats = None;
    }
}

impl<N: Normalize, F: Fit, S: Summarize> Security<N, F, S> {
    /// Densify the raw samples.
    ///
    /// A security built from a dense series has nothing to densify and
    /// returns its series unchanged.
    ///
    /// # Errors
    /// [`PortfolioError::Series`] from the normalizer.
    pub fn densify(&mut self) -> PortfolioResult<&DenseSeries> {
        let Some(raw) = self.raw.as_ref() else {
            return self.require_series();
        };
        let dense = self.normalizer.normalize(&raw.ticks, &raw.values)?;
        self.security_only = None;
        self.fit = None;
        self.clear_downstream();
        Ok(self.series.insert(dense))
    }

    /// Extend the series backwards against `index`.
    ///
    /// The series before extension is kept as [`Security::security_only`];
    /// a repeated backtrace starts again from that series. The security is
    /// left untouched when any check or the fit fails.
    ///
    /// # Errors
    /// - [`PortfolioError::MissingStage`] without a dense series.
    /// - [`PortfolioError::ShortBenchmark`] when `index` holds fewer points
    ///   than the security; the free [`backtrace`](crate::backtrace::backtrace)
    ///   would swap roles and return the benchmark's extension.
    /// - [`PortfolioError::Backtrace`] from the fitter.
    pub fn backtrace(
        &mut self, index: &DenseSeries, opts: &BacktraceOptions,
    ) -> PortfolioResult<&FitResult> {
        let base = match &self.security_only {
            Some(original) => original,
            None => self.require_series()?,
        };
        if index.len() < base.len() {
            return Err(PortfolioError::ShortBenchmark {
                name: self.name.clone(),
                benchmark_points: index.len(),
                security_points: base.len(),
            });
        }
        let out = self.fitter.fit(base, index, opts)?;
        if self.security_only.is_none() {
            self.security_only = self.series.take();
        }
        self.series = Some(out.extended);
        self.clear_downstream();
        Ok(self.fit.insert(out.fit))
    }

    /// Build the return matrix over the security's horizons.
    ///
    /// # Errors
    /// - [`PortfolioError::MissingStage`] without a dense series.
    /// - [`PortfolioError::Series`] from
    ///   [`build_return_matrix`].
    pub fn compute_return_matrix(
        &mut self, start_tick: Option<i64>,
    ) -> PortfolioResult<&ReturnMatrix> {
        let ticks = self.horizons.to_ticks();
        let matrix = build_return_matrix(self.require_series()?, &ticks, start_tick)?;
        self.stats = None;
        Ok(self.return_matrix.insert(matrix))
    }

    /// Summarize the return matrix.
    ///
    /// # Errors
    /// - [`PortfolioError::MissingStage`] without a return matrix.
    /// - [`PortfolioError::Stats`] from the engine.
    pub fn compute_stats(&mut self) -> PortfolioResult<&(StatsTable, StatsTable)> {
        let matrix = self.return_matrix.as_ref().ok_or_else(|| self.missing("return matrix"))?;
        let tables = self.engine.summarize(matrix, &self.horizons)?;
        Ok(self.stats.insert(tables))
    }
}
