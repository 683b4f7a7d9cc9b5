//! Series errors

use chrono::NaiveDate;
use thiserror::Error;

/// Violations of the series invariants
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    /// A series must contain at least one observation
    #[error("Series is empty")]
    Empty,
    /// Dates must be strictly increasing
    #[error("Dates not strictly increasing at {0}")]
    NotIncreasing(NaiveDate),
    /// Values must be finite
    #[error("Non-finite value on {0}")]
    NonFinite(NaiveDate),
    /// Not enough observations to hold out the requested horizon
    #[error("Series of length {len} too short to hold out {horizon} observations")]
    TooShort { len: usize, horizon: usize },
}
