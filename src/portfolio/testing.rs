//! Test doubles shared by the portfolio tests.
use crate::{
    backtrace::{
        diagnostics::FitResult,
        errors::{BacktraceError, BacktraceResult},
        fitter::Backtrace,
        model::ModelKind,
        options::BacktraceOptions,
    },
    portfolio::engines::Fit,
    series::dense::DenseSeries,
};
use ndarray::{Array1, Array2};

/// `100, 101, …` over `len` ticks from `start`.
pub(crate) fn ramp(start: i64, len: usize) -> DenseSeries {
    DenseSeries::from_values(start, Array1::from_iter((0..len).map(|i| 100.0 + i as f64)))
        .unwrap()
}

/// Fitter that repeats the first value one tick earlier, or fails the way
/// the real fitter does when the index starts too late.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PrependOne;

impl Fit for PrependOne {
    fn fit(
        &self, security: &DenseSeries, index: &DenseSeries, _: &BacktraceOptions,
    ) -> BacktraceResult<Backtrace> {
        if index.first_tick() >= security.first_tick() {
            return Err(BacktraceError::InsufficientOverlap {
                index_first: index.first_tick(),
                security_first: security.first_tick(),
            });
        }
        let mut values = vec![security.values()[0]];
        values.extend(security.values().iter());
        let extended = DenseSeries::from_values(security.first_tick() - 1, Array1::from(values))?;
        Ok(Backtrace { extended, fit: placeholder_fit() })
    }
}

fn placeholder_fit() -> FitResult {
    FitResult {
        model: ModelKind::Exp,
        params: Array1::zeros(3),
        std_errors: Array1::zeros(3),
        covariance: Array2::zeros((3, 3)),
        correlation: Array2::zeros((3, 3)),
        residuals: Array1::zeros(0),
        ssr: 0.0,
        r_squared: 1.0,
        adj_r_squared: 1.0,
        durbin_watson: 2.0,
        log10_condition: 0.0,
        basis: None,
        ortho_search: None,
        solver_status: "placeholder".into(),
        iterations: 0,
    }
}
