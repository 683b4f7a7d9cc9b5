//! Acquisition request and error types

use crate::series::SeriesError;
use chrono::NaiveDate;
use thiserror::Error;

/// What to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Instrument identifier (e.g., "^VIX")
    pub ticker: String,
    /// First date, inclusive
    pub start: NaiveDate,
    /// Last date, exclusive
    pub end: NaiveDate,
}

impl FetchRequest {
    pub fn new(ticker: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start,
            end,
        }
    }
}

/// Acquisition failures
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, TLS, timeout, connection reset)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status without a provider error payload
    #[error("Market data API error: {status} - {body}")]
    Status { status: u16, body: String },
    /// Provider rejected the request (unknown identifier, bad range)
    #[error("Market data provider error for {ticker}: {code} - {description}")]
    Provider {
        ticker: String,
        code: String,
        description: String,
    },
    /// Response body did not match the expected schema
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Start date is not before end date
    #[error("Empty date range: {start} .. {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
    /// The range produced no closing prices
    #[error("No data for {ticker} between {start} and {end}")]
    NoData {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Returned rows violate the series invariants
    #[error("Invalid series: {0}")]
    Series(#[from] SeriesError),
    #[error("Invalid URL: {0}")]
    Url(String),
}
