//! Yahoo Finance chart API client
//!
//! Downloads daily bars from the v8 chart endpoint and keeps the close.

use super::{FetchError, FetchRequest, PriceSource};
use crate::series::{Observation, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance chart endpoint
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Configuration for the Yahoo client
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Chart endpoint base URL
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_CHART_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// Client for the Yahoo Finance chart API
pub struct YahooClient {
    config: YahooConfig,
    client: Client,
}

impl YahooClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(YahooConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: YahooConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    /// Build the chart URL for a request
    fn build_url(&self, request: &FetchRequest) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(&self.config.base_url).map_err(|e| FetchError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Url(self.config.base_url.clone()))?
            .push(&request.ticker);
        url.query_pairs_mut()
            .append_pair("period1", &epoch_seconds(request.start).to_string())
            .append_pair("period2", &epoch_seconds(request.end).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");
        Ok(url)
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        if request.start >= request.end {
            return Err(FetchError::EmptyRange {
                start: request.start,
                end: request.end,
            });
        }

        let url = self.build_url(request)?;
        tracing::debug!(url = %url, "Fetching daily bars from Yahoo Finance");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Unknown symbols come back as 404 with a provider error payload
            if let Ok(chart) = serde_json::from_str::<ChartResponse>(&body) {
                if let Some(error) = chart.chart.error {
                    return Err(provider_error(&request.ticker, error));
                }
            }
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let series = parse_chart(request, &body)?;

        tracing::info!(
            ticker = %request.ticker,
            rows = series.len(),
            first = %series.first().date,
            last = %series.last().date,
            "Downloaded price series"
        );

        Ok(series)
    }
}

/// Chart API response envelope
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    /// Bar timestamps (seconds since epoch); absent for an empty range
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[allow(dead_code)]
    symbol: Option<String>,
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

fn provider_error(ticker: &str, error: ChartError) -> FetchError {
    FetchError::Provider {
        ticker: ticker.to_string(),
        code: error.code,
        description: error.description,
    }
}

/// Midnight UTC of `date` as epoch seconds
fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Parse a chart response body into a closing price series
///
/// Null closes are skipped; a repeated date keeps the later bar.
fn parse_chart(request: &FetchRequest, body: &str) -> Result<PriceSeries, FetchError> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(provider_error(&request.ticker, error));
    }

    let no_data = || FetchError::NoData {
        ticker: request.ticker.clone(),
        start: request.start,
        end: request.end,
    };

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(no_data)?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut observations: Vec<Observation> = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        if date < request.start || date >= request.end {
            continue;
        }
        match observations.last_mut() {
            Some(last) if last.date == date => last.value = close,
            _ => observations.push(Observation::new(date, close)),
        }
    }

    if observations.is_empty() {
        return Err(no_data());
    }

    Ok(PriceSeries::new(observations)?)
}
