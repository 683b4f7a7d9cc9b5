//! Date join and error metrics

use super::EvalError;
use crate::model::ForecastPoint;
use crate::series::Observation;
use chrono::NaiveDate;
use std::collections::HashMap;

/// An actual value paired with the forecast for the same date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

impl MatchedPoint {
    pub fn error(&self) -> f64 {
        self.actual - self.predicted
    }
}

/// Inner join on date equality, sorted by date
///
/// Rows present on only one side are dropped.
pub fn inner_join(actual: &[Observation], forecast: &[ForecastPoint]) -> Vec<MatchedPoint> {
    let predicted: HashMap<NaiveDate, f64> = forecast.iter().map(|p| (p.date, p.yhat)).collect();

    let mut matched: Vec<MatchedPoint> = actual
        .iter()
        .filter_map(|o| {
            predicted.get(&o.date).map(|yhat| MatchedPoint {
                date: o.date,
                actual: o.value,
                predicted: *yhat,
            })
        })
        .collect();
    matched.sort_by_key(|m| m.date);
    matched
}

/// Root-mean-squared error over matched pairs
pub fn rmse(matched: &[MatchedPoint]) -> Result<f64, EvalError> {
    if matched.is_empty() {
        return Err(EvalError::EmptyJoin {
            held_out: 0,
            forecast: 0,
        });
    }
    let mse = matched.iter().map(|m| m.error().powi(2)).sum::<f64>() / matched.len() as f64;
    Ok(mse.sqrt())
}
