//! Analysis pipeline
//!
//! Each stage takes explicit inputs and returns a new value; `analyze`
//! composes them in order and `run` prepends the download.

use crate::config::{Config, DataConfig, ForecastConfig, VolatilityConfig};
use crate::evaluate::{self, EvalError, Evaluation};
use crate::feed::{FetchError, FetchRequest, PriceSource};
use crate::model::{
    AdditiveModel, Estimator, FittedAdditive, Forecast, Garch11, GarchFit, ModelError,
    VolatilityForecast,
};
use crate::series::{self, PriceSeries, ReturnSeries, SeriesError, SeriesSplit, Summary};
use crate::telemetry::{record_stage, Stage};
use std::time::Instant;
use thiserror::Error;

/// Pipeline failures, one variant per stage family
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Acquisition failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Series error: {0}")]
    Series(#[from] SeriesError),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

/// Volatility stage output
#[derive(Debug, Clone)]
pub struct VolatilityAnalysis {
    /// Scaled training returns the model was fitted on
    pub training_returns: ReturnSeries,
    pub fit: GarchFit,
    pub forecast: VolatilityForecast,
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct Analysis {
    pub ticker: String,
    pub prices: PriceSeries,
    pub returns: ReturnSeries,
    pub price_summary: Summary,
    pub split: SeriesSplit,
    pub model: FittedAdditive,
    pub forecast: Forecast,
    pub evaluation: Evaluation,
    pub volatility: VolatilityAnalysis,
}

fn timed<T>(stage: Stage, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let out = f();
    record_stage(stage, started.elapsed());
    out
}

/// Download the configured price series
pub async fn acquire(
    source: &dyn PriceSource,
    config: &DataConfig,
) -> Result<PriceSeries, FetchError> {
    let request = FetchRequest::new(
        config.ticker.clone(),
        config.start_date,
        config.resolved_end_date(),
    );
    tracing::info!(
        ticker = %request.ticker,
        start = %request.start,
        end = %request.end,
        "Downloading price series"
    );

    let started = Instant::now();
    let prices = source.fetch(&request).await?;
    record_stage(Stage::Acquire, started.elapsed());
    Ok(prices)
}

/// Percentage returns of `prices`
pub fn derive_returns(prices: &PriceSeries) -> Result<ReturnSeries, SeriesError> {
    timed(Stage::Returns, || prices.returns())
}

/// Hold out the trailing `horizon` prices
pub fn split(prices: &PriceSeries, horizon: usize) -> Result<SeriesSplit, SeriesError> {
    let split = timed(Stage::Split, || series::split_held_out(prices, horizon))?;
    tracing::info!(
        training = split.training.len(),
        held_out_raw = split.held_out_raw.len(),
        held_out = split.held_out.len(),
        "Split price series"
    );
    Ok(split)
}

/// Fit the additive model on the training slice
pub fn fit_forecaster(
    training: &PriceSeries,
    config: &ForecastConfig,
) -> Result<FittedAdditive, ModelError> {
    timed(Stage::FitForecaster, || {
        AdditiveModel::from(config).fit(training)
    })
}

/// In-sample fit plus `horizon` future business days
pub fn forecast(model: &FittedAdditive, horizon: usize) -> Forecast {
    timed(Stage::Forecast, || model.forecast(horizon))
}

/// Score the out-of-sample forecast against the held-out slice
pub fn evaluate_forecast(
    split: &SeriesSplit,
    forecast: &Forecast,
    horizon: usize,
) -> Result<Evaluation, EvalError> {
    let evaluation = timed(Stage::Evaluate, || {
        evaluate::evaluate(&split.held_out, forecast.future(), horizon)
    })?;
    tracing::info!(
        rmse = evaluation.rmse,
        matched = evaluation.matched.len(),
        "Evaluated forecast"
    );
    Ok(evaluation)
}

/// Fit GARCH(1,1) to scaled training returns and forecast `horizon` steps
pub fn fit_volatility(
    returns: &ReturnSeries,
    horizon: usize,
    config: &VolatilityConfig,
) -> Result<VolatilityAnalysis, PipelineError> {
    let training_returns = returns.scaled(config.scale_factor).without_last(horizon)?;
    let fit = timed(Stage::FitVolatility, || {
        Garch11::from(config).fit(&training_returns)
    })?;
    let forecast = fit.forecast(horizon);
    Ok(VolatilityAnalysis {
        training_returns,
        fit,
        forecast,
    })
}

/// Run every stage after acquisition
pub fn analyze(
    ticker: &str,
    prices: PriceSeries,
    config: &Config,
) -> Result<Analysis, PipelineError> {
    let horizon = config.forecast.horizon;

    let returns = derive_returns(&prices)?;
    let price_summary = Summary::of(&prices.values()).ok_or(SeriesError::Empty)?;

    let split = split(&prices, horizon)?;
    let model = fit_forecaster(&split.training, &config.forecast)?;
    let forecast = forecast(&model, horizon);
    let evaluation = evaluate_forecast(&split, &forecast, horizon)?;

    let volatility = fit_volatility(&returns, horizon, &config.volatility)?;

    Ok(Analysis {
        ticker: ticker.to_string(),
        prices,
        returns,
        price_summary,
        split,
        model,
        forecast,
        evaluation,
        volatility,
    })
}

/// Download and analyze
pub async fn run(source: &dyn PriceSource, config: &Config) -> Result<Analysis, PipelineError> {
    let prices = acquire(source, &config.data).await?;
    analyze(&config.data.ticker, prices, config)
}
