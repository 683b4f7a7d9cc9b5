//! Percentage return series

use super::price::{validate, Observation};
use super::SeriesError;
use chrono::NaiveDate;

/// Daily percentage returns, dated by the later of the two prices
///
/// May be empty (a one-row price series has no returns).
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    observations: Vec<Observation>,
}

impl ReturnSeries {
    pub fn new(observations: Vec<Observation>) -> Result<Self, SeriesError> {
        validate(&observations)?;
        Ok(Self { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// A copy with every value multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            observations: self
                .observations
                .iter()
                .map(|o| Observation::new(o.date, o.value * factor))
                .collect(),
        }
    }

    /// Everything except the trailing `n` observations
    pub fn without_last(&self, n: usize) -> Result<Self, SeriesError> {
        if n >= self.len() {
            return Err(SeriesError::TooShort {
                len: self.len(),
                horizon: n,
            });
        }
        Ok(Self {
            observations: self.observations[..self.len() - n].to_vec(),
        })
    }
}
