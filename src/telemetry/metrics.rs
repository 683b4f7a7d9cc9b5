//! Stage timing

use std::time::Duration;

/// Pipeline stages that report a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Price download
    Acquire,
    /// Percentage-change derivation
    Returns,
    /// Training / held-out split
    Split,
    /// Additive model fit
    FitForecaster,
    /// Forecast frame construction
    Forecast,
    /// Held-out scoring
    Evaluate,
    /// GARCH fit
    FitVolatility,
    /// Console and chart output
    Report,
}

impl Stage {
    pub fn metric_name(self) -> &'static str {
        match self {
            Stage::Acquire => "vix_acquire_duration_ms",
            Stage::Returns => "vix_returns_duration_ms",
            Stage::Split => "vix_split_duration_ms",
            Stage::FitForecaster => "vix_fit_forecaster_duration_ms",
            Stage::Forecast => "vix_forecast_duration_ms",
            Stage::Evaluate => "vix_evaluate_duration_ms",
            Stage::FitVolatility => "vix_fit_volatility_duration_ms",
            Stage::Report => "vix_report_duration_ms",
        }
    }
}

/// Record how long a stage took
pub fn record_stage(stage: Stage, duration: Duration) {
    tracing::debug!(
        metric = stage.metric_name(),
        value_ms = duration.as_millis() as u64,
        "Stage finished"
    );
}
