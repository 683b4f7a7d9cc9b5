//! Configuration types for vix-analysis
//!
//! Every field carries a serde default, so an empty file (or no file at
//! all) reproduces the fixed analysis constants.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub volatility: VolatilityConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Market data acquisition configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Instrument identifier
    #[serde(default = "default_ticker")]
    pub ticker: String,

    /// First date of the requested range (inclusive)
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last date of the requested range (exclusive); today when unset
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ticker() -> String {
    "^VIX".to_string()
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            ticker: default_ticker(),
            start_date: default_start_date(),
            end_date: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DataConfig {
    /// End of the range, falling back to today's date
    pub fn resolved_end_date(&self) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

/// Trend/seasonality forecaster configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastConfig {
    /// Held-out observations and future business days to forecast
    #[serde(default = "default_horizon")]
    pub horizon: usize,

    /// Laplace prior scale on trend rate changes
    #[serde(default = "default_changepoint_prior_scale")]
    pub changepoint_prior_scale: f64,

    /// Number of potential trend changepoints
    #[serde(default = "default_n_changepoints")]
    pub n_changepoints: usize,

    /// Fraction of the history in which changepoints may be placed
    #[serde(default = "default_changepoint_range")]
    pub changepoint_range: f64,

    /// Normal prior scale on seasonal coefficients
    #[serde(default = "default_seasonality_prior_scale")]
    pub seasonality_prior_scale: f64,

    #[serde(default = "default_true")]
    pub yearly_seasonality: bool,

    /// `None` enables weekly seasonality when the history spans two weeks
    #[serde(default)]
    pub weekly_seasonality: Option<bool>,

    #[serde(default)]
    pub daily_seasonality: bool,

    /// Width of the uncertainty interval around `yhat`
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
}

fn default_horizon() -> usize {
    90
}
fn default_changepoint_prior_scale() -> f64 {
    0.05
}
fn default_n_changepoints() -> usize {
    25
}
fn default_changepoint_range() -> f64 {
    0.8
}
fn default_seasonality_prior_scale() -> f64 {
    10.0
}
fn default_true() -> bool {
    true
}
fn default_interval_width() -> f64 {
    0.8
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            changepoint_prior_scale: default_changepoint_prior_scale(),
            n_changepoints: default_n_changepoints(),
            changepoint_range: default_changepoint_range(),
            seasonality_prior_scale: default_seasonality_prior_scale(),
            yearly_seasonality: true,
            weekly_seasonality: None,
            daily_seasonality: false,
            interval_width: default_interval_width(),
        }
    }
}

/// Conditional volatility model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VolatilityConfig {
    /// Multiplier applied to returns before fitting
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Optimizer iteration cap
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_scale_factor() -> f64 {
    100.0
}
fn default_max_iterations() -> usize {
    5000
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            scale_factor: default_scale_factor(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Directory that receives the rendered SVG charts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_chart_width")]
    pub chart_width: u32,

    #[serde(default = "default_chart_height")]
    pub chart_height: u32,

    /// Rows shown in the data preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./charts")
}
fn default_chart_width() -> u32 {
    1200
}
fn default_chart_height() -> u32 {
    600
}
fn default_preview_rows() -> usize {
    5
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
            preview_rows: default_preview_rows(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormatConfig,
}

/// Log output format as written in the config file
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatConfig {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormatConfig::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the built-in constants
    pub fn load_or_default(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
