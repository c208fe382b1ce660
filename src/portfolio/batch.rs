//! portfolio::batch — weighted security collections and the batch runner.
//!
//! Purpose
//! -------
//! Own a set of named [`Security`] values with their weights, run one
//! pipeline [`Operation`] over all of them in parallel, and derive
//! portfolio statistics from their return matrices.
//!
//! Key behaviors
//! -------------
//! - [`Portfolio::run_batch`] processes securities on the rayon pool. Each
//!   security's outcome is recorded in its own entry of the
//!   [`BatchReport`]; one failure never aborts the others.
//! - A backtrace batch resolves the benchmark first (an error here aborts
//!   the batch) and skips the benchmark itself.
//! - [`Portfolio::stats`] aligns every return matrix to the origin ticks
//!   they all share, then calls
//!   [`portfolio_stats`](crate::stats::portfolio::portfolio_stats). It
//!   never mutates a security.
//!
//! Invariants & assumptions
//! ------------------------
//! - Security names are unique; every security uses the portfolio's
//!   horizon set.
//! - Weights are finite; they are not required to sum to one.
//!
//! Testing notes
//! -------------
//! - Tests substitute a trivial fitter to exercise failure isolation and
//!   benchmark handling without running the optimizer.
use crate::{
    backtrace::options::BacktraceOptions,
    portfolio::{
        engines::{Fit, Fitter, Normalize, Normalizer, StatsEngine, Summarize},
        errors::{PortfolioError, PortfolioResult},
        progress::ProgressSink,
        security::Security,
    },
    series::{dense::DenseSeries, errors::SeriesResult, horizons::HorizonSet, returns::ReturnMatrix},
    stats::{
        errors::StatsError,
        portfolio::{PortfolioStats, portfolio_stats},
    },
};
use ndarray::s;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One pipeline stage applied to every security of a portfolio.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Densify raw samples.
    Densify,
    /// Extend every security backwards against the named benchmark.
    Backtrace { benchmark: String, options: BacktraceOptions },
    /// Build return matrices from `start_tick` (or each series' start).
    ReturnMatrix { start_tick: Option<i64> },
    /// Summarize each return matrix.
    Stats,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Densify => "densify",
            Operation::Backtrace { .. } => "backtrace",
            Operation::ReturnMatrix { .. } => "return matrix",
            Operation::Stats => "stats",
        }
    }
}

/// Per-security outcomes of one batch, in portfolio order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub operation: &'static str,
    pub outcomes: Vec<(String, PortfolioResult<()>)>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PortfolioError)> {
        self.outcomes.iter().filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, r)| r.is_ok())
    }
}

/// Named, weighted securities sharing one horizon set.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio<N = Normalizer, F = Fitter, S = StatsEngine> {
    securities: Vec<Security<N, F, S>>,
    weights: Vec<f64>,
    horizons: HorizonSet,
}

impl<N, F, S> Portfolio<N, F, S> {
    pub fn new(horizons: HorizonSet) -> Self {
        Portfolio { securities: Vec::new(), weights: Vec::new(), horizons }
    }

    /// Add a security; its horizons are replaced by the portfolio's.
    ///
    /// # Errors
    /// - [`PortfolioError::DuplicateSecurity`] if the name is taken.
    /// - [`PortfolioError::InvalidWeight`] for a non-finite weight.
    pub fn add(&mut self, mut security: Security<N, F, S>, weight: f64) -> PortfolioResult<()> {
        if self.position(security.name()).is_some() {
            return Err(PortfolioError::DuplicateSecurity { name: security.name().to_owned() });
        }
        if !weight.is_finite() {
            return Err(PortfolioError::InvalidWeight {
                name: security.name().to_owned(),
                value: weight,
            });
        }
        security.set_horizons(self.horizons.clone());
        self.securities.push(security);
        self.weights.push(weight);
        Ok(())
    }

    /// # Errors
    /// - [`PortfolioError::UnknownSecurity`] if no security has this name.
    /// - [`PortfolioError::InvalidWeight`] for a non-finite weight.
    pub fn set_weight(&mut self, name: &str, weight: f64) -> PortfolioResult<()> {
        let position = self.require(name)?;
        if !weight.is_finite() {
            return Err(PortfolioError::InvalidWeight { name: name.to_owned(), value: weight });
        }
        self.weights[position] = weight;
        Ok(())
    }

    /// Replace the horizon set of the portfolio and all its securities.
    pub fn set_horizons(&mut self, horizons: HorizonSet) {
        for security in &mut self.securities {
            security.set_horizons(horizons.clone());
        }
        self.horizons = horizons;
    }

    pub fn horizons(&self) -> &HorizonSet {
        &self.horizons
    }

    pub fn get(&self, name: &str) -> Option<&Security<N, F, S>> {
        self.position(name).map(|i| &self.securities[i])
    }

    pub fn weight(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.weights[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.securities.iter().map(|s| s.name())
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    /// Portfolio statistics over the common origin range.
    ///
    /// Errors
    /// ------
    /// - `PortfolioError::MissingStage` if a security has no return matrix.
    /// - `PortfolioError::NoCommonOrigins` if the matrices do not overlap.
    /// - `PortfolioError::Stats` for an empty portfolio or from
    ///   `portfolio_stats`.
    pub fn stats(&self) -> PortfolioResult<PortfolioStats> {
        let matrices = self
            .securities
            .iter()
            .map(|s| s.return_matrix().ok_or_else(|| s.missing("return matrix")))
            .collect::<PortfolioResult<Vec<_>>>()?;
        let first = matrices.iter().map(|m| m.first_origin()).max();
        let last = matrices.iter().map(|m| m.first_origin() + m.n_origins() as i64 - 1).min();
        let (Some(first), Some(last)) = (first, last) else {
            return Err(StatsError::EmptyInput { what: "return matrices" }.into());
        };
        if first > last {
            return Err(PortfolioError::NoCommonOrigins { first, last });
        }

        let width = (last - first + 1) as usize;
        let aligned = matrices
            .iter()
            .map(|m| {
                let offset = (first - m.first_origin()) as usize;
                let view = m.view();
                let cols = view.slice(s![.., offset..offset + width]);
                ReturnMatrix::from_parts(cols.to_owned(), m.horizon_ticks().to_vec(), first)
            })
            .collect::<SeriesResult<Vec<_>>>()?;
        let holdings: Vec<(&ReturnMatrix, f64)> =
            aligned.iter().zip(&self.weights).map(|(m, &w)| (m, w)).collect();
        Ok(portfolio_stats(&self.horizons, &holdings)?)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.securities.iter().position(|s| s.name() == name)
    }

    fn require(&self, name: &str) -> PortfolioResult<usize> {
        self.position(name).ok_or_else(|| PortfolioError::UnknownSecurity { name: name.to_owned() })
    }
}

impl<N, F, S> Portfolio<N, F, S>
where
    N: Normalize + Send,
    F: Fit + Send,
    S: Summarize + Send,
{
    /// run_batch — apply `op` to every security in parallel.
    ///
    /// Parameters
    /// ----------
    /// - `op`: `&Operation`
    ///   Stage to run.
    /// - `progress`: `&dyn ProgressSink`
    ///   Receives one `advanced` event per processed security.
    ///
    /// Returns
    /// -------
    /// `PortfolioResult<BatchReport>`
    ///   One outcome per processed security. Failures are logged at `warn`.
    ///
    /// Errors
    /// ------
    /// - `PortfolioError::MissingBenchmark` if a backtrace names a benchmark
    ///   the portfolio does not hold.
    /// - `PortfolioError::MissingStage` if that benchmark has no dense
    ///   series.
    pub fn run_batch(
        &mut self, op: &Operation, progress: &dyn ProgressSink,
    ) -> PortfolioResult<BatchReport> {
        let (skip, index) = match op {
            Operation::Backtrace { benchmark, .. } => {
                let position = self
                    .position(benchmark)
                    .ok_or_else(|| PortfolioError::MissingBenchmark { name: benchmark.clone() })?;
                let holder = &self.securities[position];
                let series = holder.series().ok_or_else(|| holder.missing("dense series"))?;
                (Some(position), Some(series.clone()))
            }
            _ => (None, None),
        };

        let operation = op.name();
        let total = self.securities.len() - usize::from(skip.is_some());
        let completed = AtomicUsize::new(0);
        progress.started(operation, total);

        let outcomes: Vec<(String, PortfolioResult<()>)> = self
            .securities
            .par_iter_mut()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(_, security)| {
                let outcome = apply(security, op, index.as_ref());
                if let Err(e) = &outcome {
                    log::warn!("{operation} failed for '{}': {e}", security.name());
                }
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                progress.advanced(security.name(), done, total);
                (security.name().to_owned(), outcome)
            })
            .collect();

        progress.finished(operation);
        let report = BatchReport { operation, outcomes };
        log::debug!("{operation}: {}/{} securities succeeded", report.succeeded(), total);
        Ok(report)
    }
}

fn apply<N: Normalize, F: Fit, S: Summarize>(
    security: &mut Security<N, F, S>, op: &Operation, index: Option<&DenseSeries>,
) -> PortfolioResult<()> {
    match op {
        Operation::Densify => security.densify().map(|_| ()),
        Operation::Backtrace { benchmark, options } => {
            let index =
                index.ok_or_else(|| PortfolioError::MissingBenchmark { name: benchmark.clone() })?;
            security.backtrace(index, options).map(|_| ())
        }
        Operation::ReturnMatrix { start_tick } => {
            security.compute_return_matrix(*start_tick).map(|_| ())
        }
        Operation::Stats => security.compute_stats().map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backtrace::errors::BacktraceError,
        portfolio::{
            progress::{FnProgress, NoProgress},
            testing::{PrependOne, ramp},
        },
    };
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Failure isolation and benchmark handling in `run_batch`.
    // - Progress events.
    // - Origin alignment and validation in `Portfolio::stats`.
    // -------------------------------------------------------------------------

    type Stubbed = Portfolio<Normalizer, PrependOne, StatsEngine>;

    fn stubbed(name: &str, series: DenseSeries) -> Security<Normalizer, PrependOne, StatsEngine> {
        Security::from_series(name, series).with_engines(Normalizer, PrependOne, StatsEngine)
    }

    fn one_month() -> HorizonSet {
        HorizonSet::new(vec![1]).unwrap()
    }

    fn backtrace_op(benchmark: &str) -> Operation {
        Operation::Backtrace {
            benchmark: benchmark.to_owned(),
            options: BacktraceOptions::default(),
        }
    }

    #[test]
    // Purpose
    // -------
    // One security failing its backtrace does not affect the others, and
    // the benchmark is skipped.
    //
    // Given
    // -----
    // - INDEX on ticks 0..100, A starting at 20, B starting at −10.
    //
    // Expect
    // ------
    // - Two outcomes in portfolio order: A ok, B InsufficientOverlap.
    // - A extended to tick 19; B and INDEX unchanged.
    fn backtrace_batch_isolates_failures() {
        // Arrange
        let mut portfolio = Stubbed::new(one_month());
        portfolio.add(stubbed("INDEX", ramp(0, 100)), 0.0).unwrap();
        portfolio.add(stubbed("A", ramp(20, 60)), 0.5).unwrap();
        portfolio.add(stubbed("B", ramp(-10, 40)), 0.5).unwrap();

        // Act
        let report = portfolio.run_batch(&backtrace_op("INDEX"), &NoProgress).unwrap();

        // Assert
        assert_eq!(report.operation, "backtrace");
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0], ("A".to_owned(), Ok(())));
        assert_eq!(report.succeeded(), 1);
        assert!(!report.is_success());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "B");
        assert!(matches!(
            failures[0].1,
            PortfolioError::Backtrace(BacktraceError::InsufficientOverlap { .. })
        ));
        assert_eq!(portfolio.get("A").unwrap().series().unwrap().first_tick(), 19);
        assert_eq!(portfolio.get("B").unwrap().series(), Some(&ramp(-10, 40)));
        assert!(portfolio.get("INDEX").unwrap().fit_result().is_none());
    }

    #[test]
    fn unknown_benchmark_aborts_the_batch() {
        let mut portfolio = Stubbed::new(one_month());
        portfolio.add(stubbed("A", ramp(20, 60)), 1.0).unwrap();

        let err = portfolio.run_batch(&backtrace_op("SPX"), &NoProgress).unwrap_err();

        assert_eq!(err, PortfolioError::MissingBenchmark { name: "SPX".into() });
    }

    #[test]
    fn progress_counts_every_security_once() {
        let mut portfolio = Portfolio::new(one_month());
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            portfolio.add(Security::from_series(*name, ramp(10 * i as i64, 60)), 1.0).unwrap();
        }
        let events = Mutex::new(Vec::new());
        let sink = FnProgress(|name: &str, done: usize, total: usize| {
            events.lock().unwrap().push((name.to_owned(), done, total));
        });

        let report = portfolio.run_batch(&Operation::ReturnMatrix { start_tick: None }, &sink);

        assert!(report.unwrap().is_success());
        let mut events = events.lock().unwrap().clone();
        events.sort_by_key(|(_, done, _)| *done);
        let counts: Vec<usize> = events.iter().map(|(_, done, _)| *done).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        assert!(events.iter().all(|(_, _, total)| *total == 3));
    }

    #[test]
    // Purpose
    // -------
    // Portfolio statistics use only the origins every matrix covers.
    //
    // Given
    // -----
    // - A on ticks 0..120 and B on ticks 30..150, one-month horizon.
    //
    // Expect
    // ------
    // - Combined matrix over origins 30..=119 (90 columns).
    fn stats_align_to_common_origins() {
        // Arrange
        let mut portfolio = Portfolio::new(one_month());
        portfolio.add(Security::from_series("A", ramp(0, 120)), 0.5).unwrap();
        portfolio.add(Security::from_series("B", ramp(30, 120)), 0.5).unwrap();
        portfolio.run_batch(&Operation::ReturnMatrix { start_tick: None }, &NoProgress).unwrap();

        // Act
        let stats = portfolio.stats().unwrap();

        // Assert
        assert_eq!(stats.combined.first_origin(), 30);
        assert_eq!(stats.combined.n_origins(), 90);
        assert_eq!(stats.covariances[0].dim(), (2, 2));
    }

    #[test]
    fn single_holding_matches_security_stats() {
        let mut portfolio = Portfolio::new(one_month());
        portfolio.add(Security::from_series("A", ramp(0, 120)), 1.0).unwrap();
        portfolio.run_batch(&Operation::ReturnMatrix { start_tick: None }, &NoProgress).unwrap();
        portfolio.run_batch(&Operation::Stats, &NoProgress).unwrap();

        let stats = portfolio.stats().unwrap();

        let (single, errors) = portfolio.get("A").unwrap().stats().unwrap();
        assert_eq!(&stats.stats, single);
        assert_eq!(&stats.errors, errors);
    }

    #[test]
    fn stats_validation() {
        let mut portfolio = Portfolio::new(one_month());
        assert_eq!(
            portfolio.stats().unwrap_err(),
            PortfolioError::Stats(StatsError::EmptyInput { what: "return matrices" })
        );

        portfolio.add(Security::from_series("A", ramp(0, 40)), 0.5).unwrap();
        portfolio.add(Security::from_series("B", ramp(100, 40)), 0.5).unwrap();
        assert_eq!(
            portfolio.stats().unwrap_err(),
            PortfolioError::MissingStage { name: "A".into(), stage: "return matrix" }
        );

        portfolio.run_batch(&Operation::ReturnMatrix { start_tick: None }, &NoProgress).unwrap();
        assert_eq!(
            portfolio.stats().unwrap_err(),
            PortfolioError::NoCommonOrigins { first: 100, last: 39 }
        );
    }

    #[test]
    fn membership_and_weights() {
        let mut portfolio = Portfolio::new(one_month());
        portfolio.add(Security::from_series("A", ramp(0, 40)), 0.5).unwrap();

        assert_eq!(
            portfolio.add(Security::from_series("A", ramp(0, 40)), 0.5),
            Err(PortfolioError::DuplicateSecurity { name: "A".into() })
        );
        assert_eq!(
            portfolio.set_weight("Z", 1.0),
            Err(PortfolioError::UnknownSecurity { name: "Z".into() })
        );
        assert!(matches!(
            portfolio.set_weight("A", f64::NAN),
            Err(PortfolioError::InvalidWeight { .. })
        ));
        portfolio.set_weight("A", 2.0).unwrap();
        assert_eq!(portfolio.weight("A"), Some(2.0));
        assert_eq!(portfolio.names().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(portfolio.get("A").unwrap().horizons(), &one_month());
    }
}
