//! portfolio — securities, weighted portfolios and the batch runner.
//!
//! Purpose
//! -------
//! Tie the engines together: a [`Security`] carries one price history
//! through normalization, backtrace, return matrix and statistics; a
//! [`Portfolio`] holds weighted securities, runs an [`Operation`] over all
//! of them in parallel and aggregates their return matrices.
//!
//! Key behaviors
//! -------------
//! - `engines`: the [`Normalize`], [`Fit`] and [`Summarize`] strategy
//!   traits with zero-sized defaults forwarding to the engine modules.
//! - `security`: per-security stage bookkeeping and invalidation.
//! - `batch`: [`Portfolio`], [`Operation`] and per-security failure
//!   isolation through [`BatchReport`].
//! - `progress`: [`ProgressSink`], scoped to a single `run_batch` call.
//!
//! Conventions
//! -----------
//! - Security names are unique within a portfolio.
//! - Batch failures are logged with `log::warn!` and returned in the report;
//!   only a missing benchmark aborts a batch.

pub mod batch;
pub mod engines;
pub mod errors;
pub mod progress;
pub mod security;

#[cfg(test)]
pub(crate) mod testing;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::batch::{BatchReport, Operation, Portfolio};
pub use self::engines::{Fit, Fitter, Normalize, Normalizer, StatsEngine, Summarize};
pub use self::errors::{PortfolioError, PortfolioResult};
pub use self::progress::{FnProgress, NoProgress, ProgressSink};
pub use self::security::Security;

pub mod prelude {
    pub use super::batch::{Operation, Portfolio};
    pub use super::errors::{PortfolioError, PortfolioResult};
    pub use super::progress::{NoProgress, ProgressSink};
    pub use super::security::Security;
}
