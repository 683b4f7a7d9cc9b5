//! Market data acquisition
//!
//! Daily closing prices for an instrument over a date range

mod types;
mod yahoo;

pub use types::{FetchError, FetchRequest};
pub use yahoo::{YahooClient, YahooConfig, YAHOO_CHART_URL};

use crate::series::PriceSeries;
use async_trait::async_trait;

/// Trait for daily price sources
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch closing prices for `request.ticker` in `[start, end)`
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError>;
}
