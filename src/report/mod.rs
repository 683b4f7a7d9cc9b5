//! Reporting
//!
//! Console text goes to any `io::Write` (stdout in the CLI); charts are SVG
//! files under the configured output directory.

mod charts;
mod console;

pub use charts::{render_exploration, render_models, ChartSize};
pub use console::{
    write_description, write_evaluation, write_forecaster, write_preview, write_volatility,
};

use crate::config::ReportConfig;
use crate::pipeline::Analysis;
use crate::telemetry::{record_stage, Stage};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Reporting errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Console write failed: {0}")]
    Console(#[from] std::io::Error),

    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Chart {chart} failed: {message}")]
    Render { chart: String, message: String },
}

/// Print every section of `analysis` and write all charts
///
/// Returns the chart paths in the order they were written.
pub fn present<W: Write>(
    out: &mut W,
    analysis: &Analysis,
    config: &ReportConfig,
) -> Result<Vec<PathBuf>, ReportError> {
    let started = Instant::now();
    let size = ChartSize::from(config);

    write_preview(out, &analysis.ticker, &analysis.prices, config.preview_rows)?;
    let mut charts = render_exploration(
        &config.output_dir,
        size,
        &analysis.ticker,
        &analysis.prices,
        &analysis.returns,
    )?;
    write_description(out, &analysis.ticker, &analysis.price_summary)?;

    write_forecaster(out, &analysis.model, &analysis.forecast)?;
    write_evaluation(out, &analysis.evaluation)?;
    write_volatility(out, &analysis.volatility)?;
    charts.extend(render_models(&config.output_dir, size, analysis)?);

    writeln!(out)?;
    writeln!(out, "Charts written to {}", config.output_dir.display())?;
    for chart in &charts {
        writeln!(out, "  {}", chart.display())?;
    }
    out.flush()?;

    record_stage(Stage::Report, started.elapsed());
    tracing::info!(charts = charts.len(), "Report complete");
    Ok(charts)
}
