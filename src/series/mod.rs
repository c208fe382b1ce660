//! series — tick axis, dense series, and return matrices.
//!
//! Purpose
//! -------
//! Normalize heterogeneous price histories onto one daily tick axis and
//! derive the horizon × origin return matrices consumed by the fitter and
//! the statistics engine.
//!
//! Key behaviors
//! -------------
//! - `ticks`: raw dates (`DD-Mon-YYYY`, Unix seconds) → ticks since
//!   1952-01-01.
//! - `dense`: cleaning of scraped samples and monotone-cubic densification
//!   into [`DenseSeries`].
//! - `interpolation`: the PCHIP interpolant shared with the backtrace join
//!   smoothing.
//! - `horizons` / `returns`: month horizons and [`ReturnMatrix`]
//!   construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every public entry point validates its inputs and reports structural
//!   problems as [`SeriesError`]; undefined return cells are `NaN`, not
//!   errors.
//! - Nothing in this module performs I/O; parsed strings and arrays are
//!   handed in by the caller.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; the end-to-end path from raw
//!   samples to statistics is covered in `tests/`.

pub mod dense;
pub mod errors;
pub mod horizons;
pub mod interpolation;
pub mod returns;
pub mod ticks;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::dense::{DenseSeries, clean_samples, densify, orient_chronologically};
pub use self::errors::{SeriesError, SeriesResult};
pub use self::horizons::{HorizonSet, months_to_ticks};
pub use self::interpolation::MonotoneCubic;
pub use self::returns::{ReturnMatrix, build_return_matrix};
pub use self::ticks::{DateFormat, date_to_tick, tick_to_date, to_ticks};

pub mod prelude {
    pub use super::dense::{DenseSeries, densify};
    pub use super::errors::{SeriesError, SeriesResult};
    pub use super::horizons::HorizonSet;
    pub use super::returns::{ReturnMatrix, build_return_matrix};
    pub use super::ticks::{DateFormat, to_ticks};
}
