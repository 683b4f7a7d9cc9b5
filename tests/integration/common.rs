//! Shared fixtures

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use vix_analysis::calendar;
use vix_analysis::feed::{FetchError, FetchRequest, PriceSource};
use vix_analysis::series::PriceSeries;

/// Price source replaying a fixed series, clipped to the requested range
pub struct StaticSource {
    series: PriceSeries,
}

impl StaticSource {
    pub fn new(series: PriceSeries) -> Self {
        Self { series }
    }
}

#[async_trait]
impl PriceSource for StaticSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        if request.start >= request.end {
            return Err(FetchError::EmptyRange {
                start: request.start,
                end: request.end,
            });
        }
        let rows: Vec<_> = self
            .series
            .iter()
            .filter(|o| o.date >= request.start && o.date < request.end)
            .copied()
            .collect();
        if rows.is_empty() {
            return Err(FetchError::NoData {
                ticker: request.ticker.clone(),
                start: request.start,
                end: request.end,
            });
        }
        Ok(PriceSeries::new(rows)?)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Deterministic noise in [-0.5, 0.5)
fn noise(i: usize) -> f64 {
    let mut x = (i as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 31;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 29;
    (x % 10_000) as f64 / 10_000.0 - 0.5
}

/// `len` business-day closes on a rising line plus bounded noise
pub fn linear_with_noise(start: NaiveDate, len: usize) -> PriceSeries {
    let first = start - Days::new(1);
    let dates = calendar::next_business_days(first, len);
    PriceSeries::from_pairs(
        dates
            .into_iter()
            .enumerate()
            .map(|(i, d)| (d, 15.0 + 0.02 * i as f64 + 1.5 * noise(i))),
    )
    .unwrap()
}

/// Closes with a mean-reverting level and clustered shocks
pub fn clustered(start: NaiveDate, len: usize) -> PriceSeries {
    let first = start - Days::new(1);
    let dates = calendar::next_business_days(first, len);
    let mut level: f64 = 18.0;
    let mut variance: f64 = 0.0004;
    let mut previous: f64 = 0.0;
    let closes = dates.into_iter().enumerate().map(|(i, d)| {
        variance = 0.00004 + 0.1 * previous * previous + 0.85 * variance;
        previous = variance.sqrt() * 3.4 * noise(i + 7);
        level = (level * (1.0 + previous) + 0.02 * (18.0 - level)).max(5.0);
        (d, level)
    });
    PriceSeries::from_pairs(closes).unwrap()
}
