//! Closing price series

use super::{ReturnSeries, SeriesError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Daily closing prices indexed by trading date
///
/// Never empty; dates strictly increasing; values finite.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    observations: Vec<Observation>,
}

impl PriceSeries {
    /// Build a series, validating the ordering and finiteness invariants
    pub fn new(observations: Vec<Observation>) -> Result<Self, SeriesError> {
        validate(&observations)?;
        if observations.is_empty() {
            return Err(SeriesError::Empty);
        }
        Ok(Self { observations })
    }

    /// Build a series from `(date, close)` pairs
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, SeriesError> {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| Observation::new(date, value))
                .collect(),
        )
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

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first(&self) -> &Observation {
        &self.observations[0]
    }

    pub fn last(&self) -> &Observation {
        &self.observations[self.observations.len() - 1]
    }

    /// The first `n` observations
    pub fn head(&self, n: usize) -> &[Observation] {
        &self.observations[..n.min(self.len())]
    }

    /// Period-over-period percentage change; the undefined first element is dropped
    pub fn returns(&self) -> Result<ReturnSeries, SeriesError> {
        let observations = self
            .observations
            .windows(2)
            .map(|w| Observation::new(w[1].date, (w[1].value - w[0].value) / w[0].value))
            .collect();
        ReturnSeries::new(observations)
    }
}

/// Check strict date ordering and finite values
pub(crate) fn validate(observations: &[Observation]) -> Result<(), SeriesError> {
    for (i, obs) in observations.iter().enumerate() {
        if !obs.value.is_finite() {
            return Err(SeriesError::NonFinite(obs.date));
        }
        if i > 0 && observations[i - 1].date >= obs.date {
            return Err(SeriesError::NotIncreasing(obs.date));
        }
    }
    Ok(())
}
