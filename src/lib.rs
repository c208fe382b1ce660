//! backtrace_stats — backtrace extrapolation and multi-horizon return
//! statistics for securities and portfolios.
//!
//! Purpose
//! -------
//! Extend a security's short price history backwards by fitting it against
//! a benchmark index with a longer history, then summarize returns over a
//! grid of horizons for single securities and weighted portfolios.
//!
//! Key behaviors
//! -------------
//! - `series`: day-tick time axis, densification of irregular samples,
//!   horizon sets and forward return matrices.
//! - `backtrace`: the `Exp` and `Osc` extrapolation models, their
//!   least-squares fit, diagnostics and the orthogonality search for the
//!   oscillation basis.
//! - `stats`: per-horizon mean/std tables (raw and annualized), standard
//!   errors, portfolio aggregation and band coverage.
//! - `portfolio`: securities, weighted portfolios and a parallel batch
//!   runner over the pipeline stages.
//! - `optimization`, `inference`: the L-BFGS least-squares driver and
//!   parameter covariance utilities the fitter is built on.
//!
//! Invariants & assumptions
//! ------------------------
//! - A tick is one calendar day; tick 0 is 1952-01-01.
//! - Dense series have unit-step ticks and finite values; return matrices
//!   mark undefined cells with `NaN`.
//!
//! Conventions
//! -----------
//! - Each module owns its error enum and `Result` alias; higher layers wrap
//!   lower-layer errors through `From`.
//! - Diagnostics go through the `log` facade; the crate installs no logger.
//!
//! Downstream usage
//! ----------------
//! - Typical pipeline: [`series::densify`] → [`backtrace::backtrace`] →
//!   [`series::build_return_matrix`] → [`stats::single_security_stats`], or
//!   the same stages through [`portfolio::Portfolio::run_batch`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds an end-to-end
//!   pipeline test on synthetic data.

pub mod backtrace;
pub mod inference;
pub mod optimization;
pub mod portfolio;
pub mod series;
pub mod stats;
