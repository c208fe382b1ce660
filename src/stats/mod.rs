//! stats — multi-horizon return statistics for securities and portfolios.
//!
//! Purpose
//! -------
//! Turn return matrices into the per-horizon tables used for forecasting:
//! mean and standard deviation of raw and annualized returns, their
//! standard errors, weighted portfolio combinations and band summaries of
//! the return distribution.
//!
//! Key behaviors
//! -------------
//! - `summary`: [`StatsTable`], annualization and
//!   [`single_security_stats`].
//! - `portfolio`: [`portfolio_stats`] with covariance propagation across
//!   securities.
//! - `distribution`: [`band_coverage`] and [`band_errors`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are [`ReturnMatrix`](crate::series::ReturnMatrix) values with
//!   `NaN` marking undefined cells; statistics ignore those cells.
//! - All functions are pure and report structural problems as
//!   [`StatsError`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover the closed forms, the one-security portfolio
//!   reduction and the 12-month annualization identity.

pub mod distribution;
pub mod errors;
pub mod portfolio;
pub mod summary;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::distribution::{BandCoverage, Bands, band_coverage, band_errors};
pub use self::errors::{StatsError, StatsResult};
pub use self::portfolio::{PortfolioStats, portfolio_stats};
pub use self::summary::{StatsTable, annualize, single_security_stats};

pub mod prelude {
    pub use super::errors::{StatsError, StatsResult};
    pub use super::portfolio::{PortfolioStats, portfolio_stats};
    pub use super::summary::{StatsTable, single_security_stats};
}
