//! GARCH(1,1) conditional volatility model
//!
//! Zero-mean returns r_t with
//!
//!   σ²_t = ω + α·r²_{t-1} + β·σ²_{t-1},   ω > 0, α ≥ 0, β ≥ 0, α + β < 1
//!
//! The recursion starts from an exponentially weighted backcast of the
//! first squared returns. Parameters maximize the Gaussian log-likelihood;
//! standard errors use the sandwich (robust) covariance.

use super::optimize::NelderMead;
use super::{Estimator, ModelError};
use crate::calendar;
use crate::config::VolatilityConfig;
use crate::series::{Observation, ReturnSeries};
use chrono::NaiveDate;
use nalgebra::DMatrix;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

/// Fewest returns accepted for estimation
const MIN_OBSERVATIONS: usize = 20;
/// Length and decay of the variance backcast window
const BACKCAST_WINDOW: usize = 75;
const BACKCAST_DECAY: f64 = 0.94;
/// Two-sided 95% normal quantile
const Z_95: f64 = 1.959_963_984_540_054;

/// GARCH(1,1) specification
#[derive(Debug, Clone)]
pub struct Garch11 {
    /// Factor the input returns were multiplied by
    pub scale_factor: f64,
    pub optimizer: NelderMead,
}

impl Default for Garch11 {
    fn default() -> Self {
        Self::from(&VolatilityConfig::default())
    }
}

impl From<&VolatilityConfig> for Garch11 {
    fn from(config: &VolatilityConfig) -> Self {
        Self {
            scale_factor: config.scale_factor,
            optimizer: NelderMead {
                max_iterations: config.max_iterations,
                ..NelderMead::default()
            },
        }
    }
}

/// Exponentially weighted mean of the leading squared returns
fn backcast(returns: &[f64]) -> f64 {
    let tau = returns.len().min(BACKCAST_WINDOW);
    let weights: Vec<f64> = (0..tau).map(|i| BACKCAST_DECAY.powi(i as i32)).collect();
    let total: f64 = weights.iter().sum();
    returns[..tau]
        .iter()
        .zip(&weights)
        .map(|(r, w)| r * r * w / total)
        .sum()
}

/// Whether (ω, α, β) satisfies positivity and covariance stationarity
fn is_admissible(params: &[f64]) -> bool {
    let (omega, alpha, beta) = (params[0], params[1], params[2]);
    omega > 0.0 && alpha >= 0.0 && beta >= 0.0 && alpha + beta < 1.0
}

/// Conditional variance path for `returns`
fn variance_path(returns: &[f64], params: &[f64], backcast: f64) -> Vec<f64> {
    let (omega, alpha, beta) = (params[0], params[1], params[2]);
    let mut sigma2 = Vec::with_capacity(returns.len());
    let mut prev_sigma2 = backcast;
    let mut prev_r2 = backcast;
    for r in returns {
        let s2 = omega + alpha * prev_r2 + beta * prev_sigma2;
        sigma2.push(s2);
        prev_sigma2 = s2;
        prev_r2 = r * r;
    }
    sigma2
}

/// Per-observation Gaussian log-likelihood contributions
fn loglik_terms(returns: &[f64], params: &[f64], backcast: f64) -> Vec<f64> {
    if !is_admissible(params) {
        return vec![f64::NEG_INFINITY; returns.len()];
    }
    variance_path(returns, params, backcast)
        .iter()
        .zip(returns)
        .map(|(s2, r)| -0.5 * ((2.0 * PI).ln() + s2.ln() + r * r / s2))
        .collect()
}

fn loglik(returns: &[f64], params: &[f64], backcast: f64) -> f64 {
    loglik_terms(returns, params, backcast).iter().sum()
}

/// Candidate starting points: a grid over α and persistence
fn starting_values(variance: f64) -> Vec<[f64; 3]> {
    let mut starts = Vec::new();
    for alpha in [0.01, 0.05, 0.1, 0.2] {
        for persistence in [0.5, 0.9, 0.98] {
            let beta = persistence - alpha;
            if beta >= 0.0 {
                starts.push([variance * (1.0 - persistence), alpha, beta]);
            }
        }
    }
    starts
}

fn step_sizes(params: &[f64]) -> Vec<f64> {
    params.iter().map(|p| (p.abs() * 1e-4).max(1e-7)).collect()
}

/// Sandwich covariance H⁻¹ J H⁻¹ from numerical derivatives
fn robust_covariance(returns: &[f64], params: &[f64], backcast: f64) -> Option<DMatrix<f64>> {
    let k = params.len();
    let h = step_sizes(params);
    let shifted = |moves: &[(usize, f64)]| {
        let mut p = params.to_vec();
        for (i, delta) in moves {
            p[*i] += delta;
        }
        p
    };

    // Negative Hessian of the total log-likelihood
    let mut neg_hessian = DMatrix::<f64>::zeros(k, k);
    for i in 0..k {
        for j in i..k {
            let f = |si: f64, sj: f64| {
                loglik(returns, &shifted(&[(i, si * h[i]), (j, sj * h[j])]), backcast)
            };
            let d2 = (f(1.0, 1.0) - f(1.0, -1.0) - f(-1.0, 1.0) + f(-1.0, -1.0))
                / (4.0 * h[i] * h[j]);
            neg_hessian[(i, j)] = -d2;
            neg_hessian[(j, i)] = -d2;
        }
    }

    // Outer product of per-observation scores
    let n = returns.len();
    let mut scores = DMatrix::<f64>::zeros(n, k);
    for i in 0..k {
        let up = loglik_terms(returns, &shifted(&[(i, h[i])]), backcast);
        let down = loglik_terms(returns, &shifted(&[(i, -h[i])]), backcast);
        for t in 0..n {
            scores[(t, i)] = (up[t] - down[t]) / (2.0 * h[i]);
        }
    }
    let outer = scores.transpose() * &scores;

    if neg_hessian.iter().chain(outer.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    let inverse = neg_hessian.try_inverse()?;
    Some(&inverse * outer * &inverse)
}

impl Estimator for Garch11 {
    type Input = ReturnSeries;
    type Fitted = GarchFit;

    /// Fit on returns already multiplied by `scale_factor`
    fn fit(&self, data: &ReturnSeries) -> Result<GarchFit, ModelError> {
        if !(self.scale_factor > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "scale_factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if data.len() < MIN_OBSERVATIONS {
            return Err(ModelError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: data.len(),
            });
        }

        let returns = data.values();
        let n = returns.len();
        let variance = returns.iter().map(|r| r * r).sum::<f64>() / n as f64;
        if !(variance > 0.0) {
            return Err(ModelError::NonFiniteLikelihood);
        }
        let backcast = backcast(&returns);

        let start = starting_values(variance)
            .into_iter()
            .map(|p| (loglik(&returns, &p, backcast), p))
            .filter(|(ll, _)| ll.is_finite())
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
            .ok_or(ModelError::NonFiniteLikelihood)?;

        let minimum = self
            .optimizer
            .minimize(|p| -loglik(&returns, p, backcast), &start)?;
        let params = minimum.x;
        let log_likelihood = -minimum.value;

        let covariance = robust_covariance(&returns, &params, backcast);
        if covariance.is_none() {
            tracing::warn!("Robust covariance unavailable; standard errors reported as NaN");
        }
        let normal = Normal::new(0.0, 1.0).map_err(|e| ModelError::InvalidParameter(e.to_string()))?;

        let estimates = ["omega", "alpha[1]", "beta[1]"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let value = params[i];
                let std_err = covariance
                    .as_ref()
                    .map(|c| c[(i, i)])
                    .filter(|v| *v >= 0.0)
                    .map(f64::sqrt)
                    .unwrap_or(f64::NAN);
                let t_stat = value / std_err;
                ParameterEstimate {
                    name,
                    value,
                    std_err,
                    t_stat,
                    p_value: 2.0 * (1.0 - normal.cdf(t_stat.abs())),
                    ci_lower: value - Z_95 * std_err,
                    ci_upper: value + Z_95 * std_err,
                }
            })
            .collect();

        let k = 3.0;
        let sigma2 = variance_path(&returns, &params, backcast);

        tracing::info!(
            observations = n,
            omega = params[0],
            alpha = params[1],
            beta = params[2],
            log_likelihood,
            iterations = minimum.iterations,
            "Fitted GARCH(1,1)"
        );

        Ok(GarchFit {
            omega: params[0],
            alpha: params[1],
            beta: params[2],
            estimates,
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * (n as f64).ln(),
            conditional_variance: sigma2,
            dates: data.dates(),
            last_return: returns[n - 1],
            scale_factor: self.scale_factor,
            iterations: minimum.iterations,
        })
    }
}

/// A coefficient with its robust inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterEstimate {
    pub name: &'static str,
    pub value: f64,
    pub std_err: f64,
    pub t_stat: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Volatility forecast in original return units
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityForecast {
    pub points: Vec<Observation>,
}

impl VolatilityForecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|o| o.value).collect()
    }
}

/// A fitted GARCH(1,1) model (parameters in scaled units)
#[derive(Debug, Clone)]
pub struct GarchFit {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
    pub estimates: Vec<ParameterEstimate>,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    conditional_variance: Vec<f64>,
    dates: Vec<NaiveDate>,
    last_return: f64,
    scale_factor: f64,
    pub iterations: usize,
}

impl GarchFit {
    pub fn observations(&self) -> usize {
        self.dates.len()
    }

    /// α + β
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Periods for a variance shock to decay by half
    pub fn half_life(&self) -> Option<f64> {
        let persistence = self.persistence();
        if persistence <= 0.0 || persistence >= 1.0 {
            None
        } else {
            Some(-(2.0_f64.ln()) / persistence.ln())
        }
    }

    /// ω / (1 − α − β), in scaled units
    pub fn long_run_variance(&self) -> f64 {
        self.omega / (1.0 - self.persistence())
    }

    /// In-sample conditional volatility in original return units
    pub fn conditional_volatility(&self) -> Vec<Observation> {
        self.dates
            .iter()
            .zip(&self.conditional_variance)
            .map(|(d, s2)| Observation::new(*d, s2.sqrt() / self.scale_factor))
            .collect()
    }

    /// Variance forecasts (scaled units) for steps 1..=horizon
    pub fn forecast_variance(&self, horizon: usize) -> Vec<f64> {
        let last_sigma2 = self.conditional_variance[self.conditional_variance.len() - 1];
        let mut out = Vec::with_capacity(horizon);
        let mut sigma2 = self.omega
            + self.alpha * self.last_return * self.last_return
            + self.beta * last_sigma2;
        for _ in 0..horizon {
            out.push(sigma2);
            sigma2 = self.omega + self.persistence() * sigma2;
        }
        out
    }

    /// Volatility for the next `horizon` business days, in original return units
    pub fn forecast(&self, horizon: usize) -> VolatilityForecast {
        let last_date = self.dates[self.dates.len() - 1];
        let dates = calendar::next_business_days(last_date, horizon);
        let points = dates
            .into_iter()
            .zip(self.forecast_variance(horizon))
            .map(|(d, s2)| Observation::new(d, s2.sqrt() / self.scale_factor))
            .collect();
        VolatilityForecast { points }
    }

    /// Coefficient table in the usual econometrics layout
    pub fn summary(&self) -> String {
        let mut s = String::from("Zero Mean - GARCH(1,1) Model Results\n");
        s.push_str(&"=".repeat(78));
        s.push('\n');
        s.push_str(&format!(
            "Distribution: Normal    No. Observations: {:>6}    Log-Likelihood: {:>10.3}\n",
            self.observations(),
            self.log_likelihood
        ));
        s.push_str(&format!(
            "AIC: {:>10.3}    BIC: {:>10.3}    Iterations: {}\n",
            self.aic, self.bic, self.iterations
        ));
        s.push_str(&"-".repeat(78));
        s.push('\n');
        s.push_str(&format!(
            "{:<10}{:>12}{:>12}{:>10}{:>10}   {:>22}\n",
            "", "coef", "std err", "t", "P>|t|", "95.0% Conf. Int."
        ));
        for e in &self.estimates {
            s.push_str(&format!(
                "{:<10}{:>12.4}{:>12.4}{:>10.3}{:>10.3}   [{:>9.4},{:>9.4}]\n",
                e.name, e.value, e.std_err, e.t_stat, e.p_value, e.ci_lower, e.ci_upper
            ));
        }
        s.push_str(&"=".repeat(78));
        s.push('\n');
        s.push_str(&format!("Persistence (α+β): {:.4}\n", self.persistence()));
        if let Some(hl) = self.half_life() {
            s.push_str(&format!("Half-life: {:.2} periods\n", hl));
        }
        s.push_str(&format!(
            "Long-run volatility: {:.4}\n",
            self.long_run_variance().sqrt() / self.scale_factor
        ));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    /// Deterministic GARCH(1,1) sample driven by a bounded pseudo-random shock
    fn simulated_returns(n: usize, omega: f64, alpha: f64, beta: f64) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut sigma2 = omega / (1.0 - alpha - beta);
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut observations = Vec::with_capacity(n);
        for i in 0..n {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let u = (state >> 11) as f64 / (1u64 << 53) as f64;
            let z = (u - 0.5) * 12f64.sqrt();
            let r = sigma2.sqrt() * z;
            observations.push(Observation::new(start + Days::new(i as u64), r));
            sigma2 = omega + alpha * r * r + beta * sigma2;
        }
        ReturnSeries::new(observations).unwrap()
    }

    #[test]
    fn test_backcast_constant_returns() {
        let returns = vec![2.0; 100];
        assert!((backcast(&returns) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_variance_path_recursion() {
        let returns = [1.0, -2.0, 0.5];
        let path = variance_path(&returns, &[0.1, 0.2, 0.7], 1.0);
        assert!((path[0] - (0.1 + 0.2 * 1.0 + 0.7 * 1.0)).abs() < 1e-12);
        assert!((path[1] - (0.1 + 0.2 * 1.0 + 0.7 * path[0])).abs() < 1e-12);
        assert!((path[2] - (0.1 + 0.2 * 4.0 + 0.7 * path[1])).abs() < 1e-12);
    }

    #[test]
    fn test_inadmissible_parameters() {
        assert!(!is_admissible(&[0.0, 0.1, 0.8]));
        assert!(!is_admissible(&[0.1, -0.1, 0.8]));
        assert!(!is_admissible(&[0.1, 0.5, 0.5]));
        assert!(is_admissible(&[0.1, 0.0, 0.0]));
        assert_eq!(loglik(&[1.0, 2.0], &[0.1, 0.6, 0.6], 1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_fit_recovers_persistence() {
        let data = simulated_returns(2000, 0.2, 0.1, 0.85);
        let fit = Garch11::default().fit(&data).unwrap();
        assert!(fit.omega > 0.0);
        assert!(fit.alpha >= 0.0 && fit.beta >= 0.0);
        assert!(fit.persistence() < 1.0);
        assert!(fit.persistence() > 0.7, "persistence {}", fit.persistence());
    }

    #[test]
    fn test_conditional_volatility_length() {
        let data = simulated_returns(300, 0.5, 0.1, 0.8);
        let fit = Garch11::default().fit(&data).unwrap();
        let vol = fit.conditional_volatility();
        assert_eq!(vol.len(), data.len());
        assert_eq!(vol[0].date, data.dates()[0]);
    }

    #[test]
    fn test_forecast_positive_and_rescaled() {
        let data = simulated_returns(300, 0.5, 0.1, 0.8);
        let fit = Garch11::default().fit(&data).unwrap();
        let forecast = fit.forecast(90);
        assert_eq!(forecast.len(), 90);
        assert!(forecast.values().iter().all(|v| *v > 0.0));

        let variance = fit.forecast_variance(90);
        assert!((forecast.values()[0] - variance[0].sqrt() / 100.0).abs() < 1e-15);
    }

    #[test]
    fn test_forecast_converges_to_long_run() {
        let data = simulated_returns(500, 0.5, 0.1, 0.8);
        let fit = Garch11::default().fit(&data).unwrap();
        let variance = fit.forecast_variance(2000);
        let long_run = fit.long_run_variance();
        assert!((variance[1999] - long_run).abs() / long_run < 1e-3);
    }

    #[test]
    fn test_forecast_dates_follow_training() {
        let data = simulated_returns(100, 0.5, 0.1, 0.8);
        let fit = Garch11::default().fit(&data).unwrap();
        let forecast = fit.forecast(5);
        let last = data.last_date().unwrap();
        assert_eq!(
            forecast.points.iter().map(|p| p.date).collect::<Vec<_>>(),
            calendar::next_business_days(last, 5)
        );
    }

    #[test]
    fn test_fit_insufficient_data() {
        let data = simulated_returns(10, 0.5, 0.1, 0.8);
        assert_eq!(
            Garch11::default().fit(&data).unwrap_err(),
            ModelError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: 10
            }
        );
    }

    #[test]
    fn test_fit_zero_returns() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let data = ReturnSeries::new(
            (0..50)
                .map(|i| Observation::new(start + Days::new(i), 0.0))
                .collect(),
        )
        .unwrap();
        assert_eq!(
            Garch11::default().fit(&data).unwrap_err(),
            ModelError::NonFiniteLikelihood
        );
    }

    #[test]
    fn test_summary_table() {
        let data = simulated_returns(400, 0.5, 0.1, 0.8);
        let fit = Garch11::default().fit(&data).unwrap();
        let summary = fit.summary();
        assert!(summary.contains("omega"));
        assert!(summary.contains("alpha[1]"));
        assert!(summary.contains("beta[1]"));
        assert!(summary.contains("Log-Likelihood"));
        assert_eq!(fit.estimates.len(), 3);
    }

    #[test]
    fn test_information_criteria() {
        let data = simulated_returns(400, 0.5, 0.1, 0.8);
        let fit = Garch11::default().fit(&data).unwrap();
        assert!((fit.aic - (-2.0 * fit.log_likelihood + 6.0)).abs() < 1e-9);
        assert!(fit.bic > fit.aic);
    }
}
