//! Fetch command implementation

use super::yahoo_client;
use crate::config::Config;
use crate::pipeline;
use crate::report::{self, ChartSize};
use crate::series::Summary;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Instrument identifier
    #[arg(long)]
    pub ticker: Option<String>,

    /// Also write the price and return charts
    #[arg(long)]
    pub charts: bool,

    /// Directory for chart files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl FetchArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if let Some(ticker) = &self.ticker {
            config.data.ticker = ticker.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.report.output_dir = dir.clone();
        }

        let client = yahoo_client(&config.data)?;
        let prices = pipeline::acquire(&client, &config.data)
            .await
            .with_context(|| format!("Failed to download {}", config.data.ticker))?;
        let summary = Summary::of(&prices.values()).context("Empty price series")?;

        let mut stdout = std::io::stdout().lock();
        report::write_preview(&mut stdout, &config.data.ticker, &prices, config.report.preview_rows)?;
        report::write_description(&mut stdout, &config.data.ticker, &summary)?;

        if self.charts {
            let returns = pipeline::derive_returns(&prices)?;
            let paths = report::render_exploration(
                &config.report.output_dir,
                ChartSize::from(&config.report),
                &config.data.ticker,
                &prices,
                &returns,
            )?;
            tracing::info!(charts = paths.len(), dir = %config.report.output_dir.display(), "Charts written");
        }
        Ok(())
    }
}
