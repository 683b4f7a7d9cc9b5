//! Console sections

use crate::evaluate::Evaluation;
use crate::model::{FittedAdditive, Forecast};
use crate::pipeline::VolatilityAnalysis;
use crate::series::{PriceSeries, Summary};
use std::io::{self, Write};

fn heading<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

/// First `rows` observations
pub fn write_preview<W: Write>(
    out: &mut W,
    ticker: &str,
    prices: &PriceSeries,
    rows: usize,
) -> io::Result<()> {
    heading(out, &format!("{} data preview", ticker))?;
    writeln!(out, "{:<12}{:>12}", "Date", "Close")?;
    for obs in prices.head(rows) {
        writeln!(out, "{:<12}{:>12.6}", obs.date.to_string(), obs.value)?;
    }
    writeln!(
        out,
        "[{} rows, {} .. {}]",
        prices.len(),
        prices.first().date,
        prices.last().date
    )
}

/// Descriptive statistics of the closing price
pub fn write_description<W: Write>(out: &mut W, ticker: &str, summary: &Summary) -> io::Result<()> {
    heading(out, &format!("{} descriptive statistics", ticker))?;
    writeln!(out, "{}", summary)
}

/// Model summary and the last few forecast rows
pub fn write_forecaster<W: Write>(
    out: &mut W,
    model: &FittedAdditive,
    forecast: &Forecast,
) -> io::Result<()> {
    heading(out, "Trend/seasonality forecaster")?;
    write!(out, "{}", model.summary())?;

    let future = forecast.future();
    writeln!(out)?;
    writeln!(
        out,
        "{:<12}{:>12}{:>12}{:>12}",
        "Date", "yhat", "yhat_lower", "yhat_upper"
    )?;
    let tail = future.len().saturating_sub(5);
    for point in &future[tail..] {
        writeln!(
            out,
            "{:<12}{:>12.4}{:>12.4}{:>12.4}",
            point.date.to_string(),
            point.yhat,
            point.yhat_lower,
            point.yhat_upper
        )?;
    }
    Ok(())
}

pub fn write_evaluation<W: Write>(out: &mut W, evaluation: &Evaluation) -> io::Result<()> {
    write!(out, "{}", evaluation.format_table())?;
    writeln!(out, "RMSE: {:.2}", evaluation.rmse)
}

/// GARCH coefficient table and the volatility forecast endpoints
pub fn write_volatility<W: Write>(out: &mut W, volatility: &VolatilityAnalysis) -> io::Result<()> {
    heading(out, "Conditional volatility model")?;
    write!(out, "{}", volatility.fit.summary())?;

    if let (Some(first), Some(last)) = (
        volatility.forecast.points.first(),
        volatility.forecast.points.last(),
    ) {
        writeln!(
            out,
            "Volatility forecast: {:.4} on {} -> {:.4} on {} ({} steps)",
            first.value,
            first.date,
            last.value,
            last.date,
            volatility.forecast.len()
        )?;
    }
    Ok(())
}
