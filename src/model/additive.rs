//! Additive trend/seasonality model
//!
//! y(t) = g(t) + s_yearly(t) + s_weekly(t) + s_daily(t) + e
//!
//! g(t) is piecewise linear with potential changepoints spread over the
//! early history. Rate changes carry a Laplace prior, seasonal Fourier
//! coefficients a Normal prior. The MAP estimate is found by iteratively
//! reweighted penalized least squares with the noise variance profiled out.

use super::{Estimator, ModelError};
use crate::calendar;
use crate::config::ForecastConfig;
use crate::series::PriceSeries;
use chrono::{Datelike, NaiveDate};
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

/// Prior scale on base growth and offset
const TREND_PRIOR_SCALE: f64 = 5.0;
/// Smoothing term for the Laplace IRLS weights
const IRLS_EPSILON: f64 = 1e-6;
const MAX_IRLS_ITERATIONS: usize = 200;
const IRLS_TOLERANCE: f64 = 1e-9;
/// Lower bound on the scaled noise variance; keeps the penalized system
/// positive definite when weekday-only data aliases the weekly terms.
const SIGMA2_FLOOR: f64 = 1e-6;

/// A Fourier seasonal component
#[derive(Debug, Clone, Copy, PartialEq)]
struct Seasonality {
    kind: SeasonKind,
    /// Period in days
    period: f64,
    order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeasonKind {
    Yearly,
    Weekly,
    Daily,
}

impl Seasonality {
    fn yearly() -> Self {
        Self {
            kind: SeasonKind::Yearly,
            period: 365.25,
            order: 10,
        }
    }

    fn weekly() -> Self {
        Self {
            kind: SeasonKind::Weekly,
            period: 7.0,
            order: 3,
        }
    }

    fn daily() -> Self {
        Self {
            kind: SeasonKind::Daily,
            period: 1.0,
            order: 4,
        }
    }

    fn width(&self) -> usize {
        2 * self.order
    }

    fn push_features(&self, day: f64, row: &mut Vec<f64>) {
        for k in 1..=self.order {
            let x = 2.0 * PI * k as f64 * day / self.period;
            row.push(x.sin());
            row.push(x.cos());
        }
    }
}

/// Additive model specification
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    pub changepoint_prior_scale: f64,
    pub n_changepoints: usize,
    pub changepoint_range: f64,
    pub seasonality_prior_scale: f64,
    pub yearly_seasonality: bool,
    /// `None` enables weekly seasonality for histories of two weeks or more
    pub weekly_seasonality: Option<bool>,
    pub daily_seasonality: bool,
    pub interval_width: f64,
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self::from(&ForecastConfig::default())
    }
}

impl From<&ForecastConfig> for AdditiveModel {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            changepoint_prior_scale: config.changepoint_prior_scale,
            n_changepoints: config.n_changepoints,
            changepoint_range: config.changepoint_range,
            seasonality_prior_scale: config.seasonality_prior_scale,
            yearly_seasonality: config.yearly_seasonality,
            weekly_seasonality: config.weekly_seasonality,
            daily_seasonality: config.daily_seasonality,
            interval_width: config.interval_width,
        }
    }
}

impl AdditiveModel {
    fn validate(&self) -> Result<(), ModelError> {
        if !(self.changepoint_prior_scale > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "changepoint_prior_scale must be positive, got {}",
                self.changepoint_prior_scale
            )));
        }
        if !(self.seasonality_prior_scale > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "seasonality_prior_scale must be positive, got {}",
                self.seasonality_prior_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.changepoint_range) {
            return Err(ModelError::InvalidParameter(format!(
                "changepoint_range must be in [0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ModelError::InvalidParameter(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        Ok(())
    }

    fn seasonalities(&self, history_days: f64) -> Vec<Seasonality> {
        let mut seasonalities = Vec::new();
        if self.yearly_seasonality {
            seasonalities.push(Seasonality::yearly());
        }
        if self.weekly_seasonality.unwrap_or(history_days >= 14.0) {
            seasonalities.push(Seasonality::weekly());
        }
        if self.daily_seasonality {
            seasonalities.push(Seasonality::daily());
        }
        seasonalities
    }
}

/// Changepoint locations (scaled time) over the first `range` of the history
fn changepoint_locations(t: &[f64], requested: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    let count = requested.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }
    (1..=count)
        .map(|i| {
            let idx = (i as f64 * (hist_size - 1) as f64 / count as f64).round() as usize;
            t[idx]
        })
        .collect()
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

impl Estimator for AdditiveModel {
    type Input = PriceSeries;
    type Fitted = FittedAdditive;

    fn fit(&self, data: &PriceSeries) -> Result<FittedAdditive, ModelError> {
        self.validate()?;
        if data.len() < 2 {
            return Err(ModelError::InsufficientData {
                needed: 2,
                got: data.len(),
            });
        }

        let dates = data.dates();
        let values = data.values();
        let start_day = day_number(dates[0]);
        let span_days = day_number(dates[dates.len() - 1]) - start_day;

        let y_scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let t: Vec<f64> = dates
            .iter()
            .map(|d| (day_number(*d) - start_day) / span_days)
            .collect();
        let changepoints = changepoint_locations(&t, self.n_changepoints, self.changepoint_range);
        let seasonalities = self.seasonalities(span_days);

        let layout = Layout {
            start_day,
            span_days,
            changepoints,
            seasonalities,
        };

        let n = dates.len();
        let width = layout.width();
        let mut design = Vec::with_capacity(n * width);
        for date in &dates {
            design.extend(layout.row(*date));
        }
        let x = DMatrix::from_row_slice(n, width, &design);
        let y = DVector::from_iterator(n, values.iter().map(|v| v / y_scale));

        let xtx = x.transpose() * &x;
        let xty = x.transpose() * &y;

        let n_cp = layout.changepoints.len();
        let mut beta = DVector::<f64>::zeros(width);
        let mut sigma2 = {
            let mean = y.mean();
            (y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).max(SIGMA2_FLOOR)
        };

        for iteration in 0..MAX_IRLS_ITERATIONS {
            let mut penalty = vec![0.0; width];
            penalty[0] = sigma2 / TREND_PRIOR_SCALE.powi(2);
            penalty[1] = sigma2 / TREND_PRIOR_SCALE.powi(2);
            for j in 0..n_cp {
                let delta = if iteration == 0 {
                    self.changepoint_prior_scale
                } else {
                    beta[2 + j].abs()
                };
                penalty[2 + j] = sigma2 / (self.changepoint_prior_scale * (delta + IRLS_EPSILON));
            }
            for p in penalty.iter_mut().skip(2 + n_cp) {
                *p = sigma2 / self.seasonality_prior_scale.powi(2);
            }

            let system = &xtx + DMatrix::from_diagonal(&DVector::from_vec(penalty));
            let next = system
                .cholesky()
                .ok_or(ModelError::Singular("additive model"))?
                .solve(&xty);

            let residual = &y - &x * &next;
            sigma2 = (residual.norm_squared() / n as f64).max(SIGMA2_FLOOR);

            let change = (&next - &beta).amax();
            beta = next;
            if change < IRLS_TOLERANCE {
                tracing::debug!(iterations = iteration + 1, "Additive model converged");
                break;
            }
        }

        let deltas: Vec<f64> = beta.iter().skip(2).take(n_cp).copied().collect();
        let mean_abs_delta = if n_cp > 0 {
            deltas.iter().map(|d| d.abs()).sum::<f64>() / n_cp as f64
        } else {
            0.0
        };

        let normal = Normal::new(0.0, 1.0).map_err(|e| ModelError::InvalidParameter(e.to_string()))?;
        let z = normal.inverse_cdf((1.0 + self.interval_width) / 2.0);

        tracing::info!(
            observations = n,
            changepoints = n_cp,
            seasonalities = layout.seasonalities.len(),
            sigma = sigma2.sqrt() * y_scale,
            "Fitted additive model"
        );

        Ok(FittedAdditive {
            layout,
            beta: beta.iter().copied().collect(),
            y_scale,
            sigma: sigma2.sqrt(),
            mean_abs_delta,
            z,
            interval_width: self.interval_width,
            history: dates,
        })
    }
}

/// Column layout of the design matrix
#[derive(Debug, Clone)]
struct Layout {
    start_day: f64,
    span_days: f64,
    /// Scaled-time changepoint locations
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
}

impl Layout {
    fn width(&self) -> usize {
        2 + self.changepoints.len() + self.seasonalities.iter().map(|s| s.width()).sum::<usize>()
    }

    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (day_number(date) - self.start_day) / self.span_days
    }

    /// Design row: intercept, growth, changepoint hinges, Fourier terms
    fn row(&self, date: NaiveDate) -> Vec<f64> {
        let t = self.scaled_time(date);
        let day = day_number(date);
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|s| (t - s).max(0.0)));
        for season in &self.seasonalities {
            season.push_features(day, &mut row);
        }
        row
    }
}

/// One forecast row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub yearly: f64,
    pub weekly: f64,
    pub daily: f64,
}

/// In-sample fit followed by the out-of-sample forecast
#[derive(Debug, Clone)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    /// Number of leading in-sample rows
    pub history_len: usize,
}

impl Forecast {
    /// In-sample rows
    pub fn history(&self) -> &[ForecastPoint] {
        &self.points[..self.history_len]
    }

    /// Out-of-sample rows
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.history_len..]
    }
}

/// A fitted additive model
#[derive(Debug, Clone)]
pub struct FittedAdditive {
    layout: Layout,
    beta: Vec<f64>,
    y_scale: f64,
    /// Residual standard deviation in scaled units
    sigma: f64,
    mean_abs_delta: f64,
    /// Normal quantile for the interval width
    z: f64,
    interval_width: f64,
    history: Vec<NaiveDate>,
}

impl FittedAdditive {
    /// Predict every date in `dates`
    pub fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastPoint> {
        dates.iter().map(|d| self.predict_one(*d)).collect()
    }

    /// Fit the training dates and forecast the next `horizon` business days
    pub fn forecast(&self, horizon: usize) -> Forecast {
        let last = self.history[self.history.len() - 1];
        let mut dates = self.history.clone();
        dates.extend(calendar::next_business_days(last, horizon));

        Forecast {
            points: self.predict(&dates),
            history_len: self.history.len(),
        }
    }

    fn predict_one(&self, date: NaiveDate) -> ForecastPoint {
        let row = self.layout.row(date);
        let n_cp = self.layout.changepoints.len();
        let trend_cols = 2 + n_cp;

        let trend: f64 = row[..trend_cols]
            .iter()
            .zip(&self.beta[..trend_cols])
            .map(|(x, b)| x * b)
            .sum();

        let mut yearly = 0.0;
        let mut weekly = 0.0;
        let mut daily = 0.0;
        let mut offset = trend_cols;
        for season in &self.layout.seasonalities {
            let end = offset + season.width();
            let value: f64 = row[offset..end]
                .iter()
                .zip(&self.beta[offset..end])
                .map(|(x, b)| x * b)
                .sum();
            match season.kind {
                SeasonKind::Yearly => yearly = value,
                SeasonKind::Weekly => weekly = value,
                SeasonKind::Daily => daily = value,
            }
            offset = end;
        }

        let yhat = trend + yearly + weekly + daily;

        // Future rate changes arrive at the historical changepoint rate with
        // Laplace(0, mean |delta|) size; their effect on g grows as h^3.
        let h = (self.layout.scaled_time(date) - 1.0).max(0.0);
        let trend_var = n_cp as f64 * 2.0 * self.mean_abs_delta.powi(2) * h.powi(3) / 3.0;
        let half_width = self.z * (self.sigma.powi(2) + trend_var).sqrt();

        ForecastPoint {
            date,
            yhat: yhat * self.y_scale,
            yhat_lower: (yhat - half_width) * self.y_scale,
            yhat_upper: (yhat + half_width) * self.y_scale,
            trend: trend * self.y_scale,
            yearly: yearly * self.y_scale,
            weekly: weekly * self.y_scale,
            daily: daily * self.y_scale,
        }
    }

    pub fn has_yearly(&self) -> bool {
        self.has(SeasonKind::Yearly)
    }

    pub fn has_weekly(&self) -> bool {
        self.has(SeasonKind::Weekly)
    }

    fn has(&self, kind: SeasonKind) -> bool {
        self.layout.seasonalities.iter().any(|s| s.kind == kind)
    }

    /// Yearly component over one calendar year
    pub fn yearly_profile(&self) -> Vec<(NaiveDate, f64)> {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(2017, 1, 1),
            NaiveDate::from_ymd_opt(2018, 1, 1),
        ) else {
            return Vec::new();
        };
        start
            .iter_days()
            .take_while(|d| *d < end)
            .map(|d| (d, self.predict_one(d).yearly))
            .collect()
    }

    /// Weekly component for Monday through Sunday
    pub fn weekly_profile(&self) -> Vec<(chrono::Weekday, f64)> {
        // 2017-01-02 is a Monday
        let Some(monday) = NaiveDate::from_ymd_opt(2017, 1, 2) else {
            return Vec::new();
        };
        monday
            .iter_days()
            .take(7)
            .map(|d| (d.weekday(), self.predict_one(d).weekly))
            .collect()
    }

    /// Residual standard deviation in price units
    pub fn sigma(&self) -> f64 {
        self.sigma * self.y_scale
    }

    /// Base growth in price units per day
    pub fn base_growth(&self) -> f64 {
        self.beta[1] * self.y_scale / self.layout.span_days
    }

    /// Changepoint dates with their rate change in price units per day
    pub fn changepoints(&self) -> Vec<(NaiveDate, f64)> {
        self.layout
            .changepoints
            .iter()
            .zip(&self.beta[2..])
            .filter_map(|(s, delta)| {
                let day = (self.layout.start_day + s * self.layout.span_days).round() as i32;
                NaiveDate::from_num_days_from_ce_opt(day)
                    .map(|d| (d, delta * self.y_scale / self.layout.span_days))
            })
            .collect()
    }

    /// Human-readable model summary
    pub fn summary(&self) -> String {
        let mut s = String::from("Additive Trend/Seasonality Model Summary\n");
        s.push_str(&"=".repeat(40));
        s.push('\n');

        s.push_str(&format!("Observations: {}\n", self.history.len()));
        s.push_str(&format!(
            "History: {} .. {}\n",
            self.history[0],
            self.history[self.history.len() - 1]
        ));
        s.push_str(&format!("Base growth: {:+.6} per day\n", self.base_growth()));

        let changepoints = self.changepoints();
        s.push_str(&format!("Changepoints: {}\n", changepoints.len()));
        for (date, delta) in changepoints.iter().filter(|(_, d)| d.abs() > 1e-4) {
            s.push_str(&format!("  {}: {:+.6} per day\n", date, delta));
        }

        let names: Vec<&str> = self
            .layout
            .seasonalities
            .iter()
            .map(|season| match season.kind {
                SeasonKind::Yearly => "yearly",
                SeasonKind::Weekly => "weekly",
                SeasonKind::Daily => "daily",
            })
            .collect();
        s.push_str(&format!("Seasonalities: {}\n", names.join(", ")));
        s.push_str(&format!("Residual sigma: {:.4}\n", self.sigma()));
        s.push_str(&format!(
            "Interval width: {:.0}%\n",
            self.interval_width * 100.0
        ));

        s
    }
}
