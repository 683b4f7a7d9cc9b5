//! Business-day trading calendar
//!
//! The forecaster's future dates, the held-out filter and the volatility
//! forecast dates all come from here, so the three always agree.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Whether `date` is a business day (Monday through Friday)
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `n` business days strictly after `date`
pub fn next_business_days(date: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut current = date;
    while days.len() < n {
        current = match current.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
        if is_business_day(current) {
            days.push(current);
        }
    }
    days
}
