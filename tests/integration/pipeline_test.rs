//! Stage-level integration tests

use crate::common::{clustered, date, linear_with_noise, StaticSource};
use vix_analysis::config::{Config, DataConfig, VolatilityConfig};
use vix_analysis::feed::FetchError;
use vix_analysis::pipeline::{self, PipelineError};
use vix_analysis::series::SeriesError;

fn data_config(start: chrono::NaiveDate, end: chrono::NaiveDate) -> DataConfig {
    DataConfig {
        start_date: start,
        end_date: Some(end),
        ..DataConfig::default()
    }
}

#[tokio::test]
async fn test_acquire_clips_to_range() {
    let source = StaticSource::new(linear_with_noise(date(2023, 1, 2), 60));
    let prices = pipeline::acquire(&source, &data_config(date(2023, 1, 9), date(2023, 1, 16)))
        .await
        .unwrap();

    assert_eq!(prices.len(), 5);
    assert_eq!(prices.first().date, date(2023, 1, 9));
    assert_eq!(prices.last().date, date(2023, 1, 13));
}

#[tokio::test]
async fn test_acquire_empty_range() {
    let source = StaticSource::new(linear_with_noise(date(2023, 1, 2), 60));
    let err = pipeline::acquire(&source, &data_config(date(2023, 2, 1), date(2023, 2, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::EmptyRange { .. }));

    let err = pipeline::acquire(&source, &data_config(date(2030, 1, 1), date(2030, 2, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NoData { .. }));
}

#[test]
fn test_returns_first_value_exact() {
    let prices = linear_with_noise(date(2023, 1, 2), 30);
    let returns = pipeline::derive_returns(&prices).unwrap();

    assert_eq!(returns.len(), prices.len() - 1);
    let p = prices.values();
    assert_eq!(returns.values()[0], (p[1] - p[0]) / p[0]);
    assert_eq!(returns.dates()[0], prices.dates()[1]);
}

#[test]
fn test_split_preserves_length() {
    let prices = linear_with_noise(date(2023, 1, 2), 120);
    let split = pipeline::split(&prices, 20).unwrap();

    assert_eq!(split.training.len() + split.held_out_raw.len(), prices.len());
    assert!(split.held_out.len() <= split.held_out_raw.len());
    assert_eq!(split.training.last().date, prices.dates()[99]);
}

#[test]
fn test_forecast_starts_after_training() {
    let prices = linear_with_noise(date(2023, 1, 2), 150);
    let split = pipeline::split(&prices, 15).unwrap();
    let model = pipeline::fit_forecaster(&split.training, &Config::default().forecast).unwrap();
    let forecast = pipeline::forecast(&model, 15);

    let future = forecast.future();
    assert_eq!(future.len(), 15);
    assert!(future[0].date > split.training.last().date);
    assert!(future.windows(2).all(|w| w[0].date < w[1].date));
    assert!(future
        .iter()
        .all(|p| p.yhat_lower <= p.yhat && p.yhat <= p.yhat_upper));

    let evaluation = pipeline::evaluate_forecast(&split, &forecast, 15).unwrap();
    assert_eq!(evaluation.matched.len(), split.held_out.len());
}

#[test]
fn test_volatility_on_clustered_returns() {
    let prices = clustered(date(2021, 1, 4), 500);
    let returns = pipeline::derive_returns(&prices).unwrap();
    let volatility = pipeline::fit_volatility(&returns, 30, &VolatilityConfig::default()).unwrap();

    let fit = &volatility.fit;
    assert!(fit.omega > 0.0);
    assert!(fit.alpha >= 0.0);
    assert!(fit.beta >= 0.0);
    assert!(fit.persistence() < 1.0);
    assert_eq!(fit.conditional_volatility().len(), 469);
    assert_eq!(volatility.forecast.len(), 30);
    assert!(volatility.forecast.values().iter().all(|v| *v > 0.0));
}

#[test]
fn test_analyze_horizon_too_long() {
    let mut config = Config::default();
    config.forecast.horizon = 50;
    let err = pipeline::analyze("^VIX", linear_with_noise(date(2023, 1, 2), 50), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Series(SeriesError::TooShort { len: 50, horizon: 50 })
    ));
}
