//! series::ticks — conversion of heterogeneous date encodings onto the
//! crate-wide integer tick axis.
//!
//! Purpose
//! -------
//! Map raw dates from different data sources onto one absolute day count
//! so that series from different providers can be compared sample by
//! sample.
//!
//! Key behaviors
//! -------------
//! - [`to_ticks`] parses a batch of raw dates in a given [`DateFormat`].
//! - [`date_to_tick`] / [`tick_to_date`] convert single calendar dates.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tick 0 is 1 January 1952 ([`EPOCH_YEAR`] is a leap year, so every
//!   4-year block starting at the epoch spans exactly 1461 days until the
//!   2100 century rule applies).
//! - Unix timestamps are truncated towards negative infinity to whole
//!   days, so any instant within a UTC day maps to that day's tick.
//!
//! Conventions
//! -----------
//! - Output order follows input order; callers that receive newest-first
//!   exports should reorient with [`crate::series::dense::orient_chronologically`].
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use ndarray::Array1;

use crate::series::errors::{SeriesError, SeriesResult};

/// Leap year used as the origin of the tick axis.
pub const EPOCH_YEAR: i32 = 1952;

/// Days in one full leap-year cycle.
pub const DAYS_PER_LEAP_CYCLE: i64 = 1461;

/// Ticks between the epoch and 1970-01-01.
pub const UNIX_EPOCH_TICK: i64 = 6575;

const SECONDS_PER_DAY: i64 = 86_400;

/// Supported raw date encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `DD-Mon-YYYY` with English month abbreviations (`Sept` accepted).
    DayMonthYear,
    /// Whole seconds since 1970-01-01 UTC.
    UnixSeconds,
}

impl FromStr for DateFormat {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day-month-year" | "dmy" => Ok(DateFormat::DayMonthYear),
            "unix-seconds" | "unix" => Ok(DateFormat::UnixSeconds),
            _ => Err(SeriesError::UnsupportedDateFormat { name: s.to_string() }),
        }
    }
}

/// to_ticks — parse a batch of raw dates onto the tick axis.
///
/// Parameters
/// ----------
/// - `raw_dates`: `&[S]`
///   Raw date strings. For [`DateFormat::UnixSeconds`] each entry must be
///   an integer number of seconds (surrounding whitespace is ignored).
/// - `format`: [`DateFormat`]
///   Encoding shared by every entry.
///
/// Returns
/// -------
/// `SeriesResult<Array1<i64>>`
///   One tick per input entry, in input order.
///
/// Errors
/// ------
/// - `SeriesError::MalformedDate`
///   Returned for the first entry that fails to parse.
pub fn to_ticks<S: AsRef<str>>(raw_dates: &[S], format: DateFormat) -> SeriesResult<Array1<i64>> {
    let ticks = raw_dates
        .iter()
        .map(|raw| match format {
            DateFormat::DayMonthYear => parse_day_month_year(raw.as_ref()).map(date_to_tick),
            DateFormat::UnixSeconds => parse_unix_seconds(raw.as_ref()),
        })
        .collect::<SeriesResult<Vec<i64>>>()?;
    Ok(Array1::from(ticks))
}

/// Tick of a calendar date (1952-01-01 is tick 0).
pub fn date_to_tick(date: NaiveDate) -> i64 {
    let days_from_ce = i64::from(date.num_days_from_ce());
    days_from_ce - epoch_days_from_ce()
}

/// Calendar date of a tick, `None` if it falls outside chrono's range.
pub fn tick_to_date(tick: i64) -> Option<NaiveDate> {
    let days = i32::try_from(tick + epoch_days_from_ce()).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days)
}

/// Convert whole Unix seconds to a tick.
pub fn unix_seconds_to_tick(seconds: i64) -> i64 {
    seconds.div_euclid(SECONDS_PER_DAY) + UNIX_EPOCH_TICK
}

fn epoch_days_from_ce() -> i64 {
    // 1952-01-01 is always representable.
    NaiveDate::from_ymd_opt(EPOCH_YEAR, 1, 1).map_or(0, |d| i64::from(d.num_days_from_ce()))
}

fn parse_unix_seconds(raw: &str) -> SeriesResult<i64> {
    raw.trim().parse::<i64>().map(unix_seconds_to_tick).map_err(|_| SeriesError::MalformedDate {
        raw: raw.to_string(),
        reason: "expected whole seconds since 1970-01-01",
    })
}

fn parse_day_month_year(raw: &str) -> SeriesResult<NaiveDate> {
    let malformed = |reason: &'static str| SeriesError::MalformedDate { raw: raw.to_string(), reason };

    let parts: Vec<&str> =
        raw.trim().split(|c: char| !c.is_ascii_alphanumeric()).filter(|p| !p.is_empty()).collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(malformed("expected three fields: day, month abbreviation, year"));
    };

    let day: u32 = day.parse().map_err(|_| malformed("day is not a number"))?;
    let month = month_number(month).ok_or_else(|| malformed("unknown month abbreviation"))?;
    let year: i32 = year.parse().map_err(|_| malformed("year is not a number"))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| malformed("day outside month"))
}

fn month_number(token: &str) -> Option<u32> {
    let month = match token.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" | "sept" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
