//! series::errors — error surface for tick conversion, densification, and
//! return-matrix construction.
//!
//! Purpose
//! -------
//! Collect every structural failure that can occur while turning raw
//! (date, value) samples into a dense tick-aligned series and then into a
//! return matrix. Per-cell boundary conditions (an origin with no future
//! value at some horizon) are **not** errors; they are encoded as `NaN`.
//!
//! Conventions
//! -----------
//! - Variants carry the offending value or index so callers can log the
//!   failure without holding on to the input arrays.
//! - Messages are phrased in terms of the domain constraint that was
//!   violated.

pub type SeriesResult<T> = Result<T, SeriesError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    // ---- Sample counts ----
    /// Fewer usable samples than the operation needs.
    InsufficientData { required: usize, actual: usize },

    /// Tick and value arrays differ in length.
    LengthMismatch { ticks: usize, values: usize },

    // ---- Tick axis ----
    /// Ticks must be strictly increasing.
    NonIncreasingTicks { index: usize, previous: i64, current: i64 },

    /// A dense series must advance by exactly one tick per sample.
    NonUnitStep { index: usize, step: i64 },

    /// Dense series values must be finite.
    NonFiniteValue { index: usize, value: f64 },

    // ---- Date parsing ----
    /// Unknown date format selector.
    UnsupportedDateFormat { name: String },

    /// A raw date could not be parsed in the requested format.
    MalformedDate { raw: String, reason: &'static str },

    // ---- Return matrix ----
    /// Horizons must be strictly positive.
    InvalidHorizon { index: usize, value: i64 },

    /// Requested start tick is not covered by the series.
    StartTickOutOfRange { start_tick: i64, first: i64, last: i64 },

    // ---- Interpolation ----
    /// Interpolation query outside the node range.
    OutOfRange { tick: f64, first: f64, last: f64 },
}

impl std::error::Error for SeriesError {}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Sample counts ----
            SeriesError::InsufficientData { required, actual } => {
                write!(f, "Insufficient data: need at least {required} usable points, got {actual}")
            }
            SeriesError::LengthMismatch { ticks, values } => {
                write!(f, "Length mismatch: {ticks} ticks but {values} values")
            }

            // ---- Tick axis ----
            SeriesError::NonIncreasingTicks { index, previous, current } => write!(
                f,
                "Ticks must be strictly increasing: tick {current} at index {index} follows {previous}"
            ),
            SeriesError::NonUnitStep { index, step } => {
                write!(f, "Dense series must have unit step: step {step} at index {index}")
            }
            SeriesError::NonFiniteValue { index, value } => {
                write!(f, "Non-finite value {value} at index {index}")
            }

            // ---- Date parsing ----
            SeriesError::UnsupportedDateFormat { name } => {
                write!(
                    f,
                    "Unsupported date format '{name}': valid options are 'day-month-year' or 'unix-seconds'"
                )
            }
            SeriesError::MalformedDate { raw, reason } => {
                write!(f, "Malformed date '{raw}': {reason}")
            }

            // ---- Return matrix ----
            SeriesError::InvalidHorizon { index, value } => {
                write!(f, "Invalid horizon {value} at index {index}: must be positive")
            }
            SeriesError::StartTickOutOfRange { start_tick, first, last } => {
                write!(f, "Start tick {start_tick} outside series range [{first}, {last}]")
            }

            // ---- Interpolation ----
            SeriesError::OutOfRange { tick, first, last } => {
                write!(f, "Interpolation query {tick} outside node range [{first}, {last}]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_embeds_payload() {
        let err = SeriesError::InsufficientData { required: 2, actual: 1 };
        assert!(err.to_string().contains("at least 2"));

        let err = SeriesError::MalformedDate { raw: "31-Foo-2001".to_string(), reason: "bad month" };
        assert!(err.to_string().contains("31-Foo-2001"));
    }
}
