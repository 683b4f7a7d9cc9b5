//! Forecast accuracy summary

use super::{inner_join, rmse, EvalError, MatchedPoint};
use crate::model::ForecastPoint;
use crate::series::Observation;

/// Accuracy of a forecast over the held-out window
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Root-mean-squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean absolute percentage error (fraction)
    pub mape: f64,
    /// Nominal forecast horizon
    pub horizon: usize,
    /// Held-out rows offered to the join
    pub held_out: usize,
    /// Matched (actual, predicted) pairs
    pub matched: Vec<MatchedPoint>,
}

/// Join held-out actuals with forecast rows and score the matches
///
/// A join smaller than `horizon` is logged, not rejected; an empty join is
/// an error.
pub fn evaluate(
    held_out: &[Observation],
    forecast: &[ForecastPoint],
    horizon: usize,
) -> Result<Evaluation, EvalError> {
    let matched = inner_join(held_out, forecast);
    if matched.is_empty() {
        return Err(EvalError::EmptyJoin {
            held_out: held_out.len(),
            forecast: forecast.len(),
        });
    }

    if matched.len() < horizon {
        tracing::warn!(
            matched = matched.len(),
            horizon,
            held_out = held_out.len(),
            forecast = forecast.len(),
            "Evaluation window smaller than forecast horizon"
        );
    }

    let n = matched.len() as f64;
    let mae = matched.iter().map(|m| m.error().abs()).sum::<f64>() / n;
    let mape = matched
        .iter()
        .map(|m| (m.error() / m.actual).abs())
        .sum::<f64>()
        / n;

    Ok(Evaluation {
        rmse: rmse(&matched)?,
        mae,
        mape,
        horizon,
        held_out: held_out.len(),
        matched,
    })
}

impl Evaluation {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
        MODEL EVALUATION ({}-day forecast)
══════════════════════════════════════════════════════
RMSE:             {:.2}
MAE:              {:.2}
MAPE:             {:.2}%
Matched rows:     {} of {} held out
══════════════════════════════════════════════════════
"#,
            self.horizon,
            self.rmse,
            self.mae,
            self.mape * 100.0,
            self.matched.len(),
            self.held_out,
        )
    }
}
