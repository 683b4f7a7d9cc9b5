//! Training / held-out split

use super::{Observation, PriceSeries, SeriesError};
use crate::calendar;

/// A price series divided at `len - horizon`
#[derive(Debug, Clone)]
pub struct SeriesSplit {
    /// All but the trailing `horizon` observations
    pub training: PriceSeries,
    /// The trailing `horizon` observations
    pub held_out_raw: Vec<Observation>,
    /// `held_out_raw` restricted to business days
    pub held_out: Vec<Observation>,
}

/// Hold out the last `horizon` observations of `series`
pub fn split_held_out(series: &PriceSeries, horizon: usize) -> Result<SeriesSplit, SeriesError> {
    if horizon >= series.len() {
        return Err(SeriesError::TooShort {
            len: series.len(),
            horizon,
        });
    }

    let cut = series.len() - horizon;
    let (training, held_out_raw) = series.observations().split_at(cut);
    let held_out = held_out_raw
        .iter()
        .filter(|o| calendar::is_business_day(o.date))
        .copied()
        .collect();

    Ok(SeriesSplit {
        training: PriceSeries::new(training.to_vec())?,
        held_out_raw: held_out_raw.to_vec(),
        held_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn daily_series(len: usize) -> PriceSeries {
        // Calendar days, weekends included
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_pairs(
            (0..len).map(|i| (start + Days::new(i as u64), 20.0 + i as f64 * 0.1)),
        )
        .unwrap()
    }

    #[test]
    fn test_split_lengths() {
        let series = daily_series(30);
        let split = split_held_out(&series, 10).unwrap();
        assert_eq!(split.training.len() + split.held_out_raw.len(), series.len());
        assert_eq!(split.held_out_raw.len(), 10);
        assert!(split.held_out.len() <= split.held_out_raw.len());
    }

    #[test]
    fn test_split_filters_weekends() {
        // 2024-01-21..2024-01-30 contains Sat 27 and Sun 28 (and Sun 21)
        let series = daily_series(30);
        let split = split_held_out(&series, 10).unwrap();
        assert_eq!(split.held_out.len(), 7);
        assert!(split
            .held_out
            .iter()
            .all(|o| calendar::is_business_day(o.date)));
    }

    #[test]
    fn test_split_preserves_order() {
        let series = daily_series(12);
        let split = split_held_out(&series, 4).unwrap();
        assert_eq!(split.training.last().date, series.observations()[7].date);
        assert_eq!(split.held_out_raw[0].date, series.observations()[8].date);
    }

    #[test]
    fn test_split_too_short() {
        let series = daily_series(5);
        assert_eq!(
            split_held_out(&series, 5).unwrap_err(),
            SeriesError::TooShort { len: 5, horizon: 5 }
        );
    }
}
