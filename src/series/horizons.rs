//! series::horizons — forward horizons in months and their tick lengths.
//!
//! A horizon of `m` months spans `floor(m · 365.25 / 12)` ticks, i.e. the
//! average month length over the leap-year cycle.
use crate::series::errors::{SeriesError, SeriesResult};

/// Average number of days per month over the leap cycle.
pub const DAYS_PER_MONTH: f64 = 365.25 / 12.0;

/// HorizonSet — ordered, strictly positive horizons in months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizonSet {
    months: Vec<u32>,
}

impl HorizonSet {
    /// # Errors
    /// - [`SeriesError::InsufficientData`] for an empty set.
    /// - [`SeriesError::InvalidHorizon`] for a zero month count.
    pub fn new(months: Vec<u32>) -> SeriesResult<Self> {
        if months.is_empty() {
            return Err(SeriesError::InsufficientData { required: 1, actual: 0 });
        }
        if let Some(index) = months.iter().position(|&m| m == 0) {
            return Err(SeriesError::InvalidHorizon { index, value: 0 });
        }
        Ok(Self { months })
    }

    /// Monthly horizons up to a year, then half-yearly up to (but not
    /// including) `years` years.
    pub fn monthly_then_half_yearly(years: u32) -> Self {
        let mut months: Vec<u32> = (1..12).collect();
        months.extend((12..years.max(1) * 12).step_by(6));
        Self { months }
    }

    pub fn months(&self) -> &[u32] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Horizon lengths in ticks.
    pub fn to_ticks(&self) -> Vec<i64> {
        self.months.iter().map(|&m| months_to_ticks(m)).collect()
    }
}

impl Default for HorizonSet {
    fn default() -> Self {
        Self::monthly_then_half_yearly(5)
    }
}

/// Whole ticks in `months` average months.
pub fn months_to_ticks(months: u32) -> i64 {
    (f64::from(months) * DAYS_PER_MONTH).floor() as i64
}
