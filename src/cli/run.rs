//! Run command implementation

use super::yahoo_client;
use crate::config::Config;
use crate::{pipeline, report};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Instrument identifier
    #[arg(long)]
    pub ticker: Option<String>,

    /// First date to download (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Exclusive end date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Forecast horizon in business days
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Directory for chart files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay command-line values on the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(ticker) = &self.ticker {
            config.data.ticker = ticker.clone();
        }
        if let Some(start) = self.start {
            config.data.start_date = start;
        }
        if self.end.is_some() {
            config.data.end_date = self.end;
        }
        if let Some(horizon) = self.horizon {
            config.forecast.horizon = horizon;
        }
        if let Some(dir) = &self.output_dir {
            config.report.output_dir = dir.clone();
        }
    }

    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        self.apply(&mut config);

        let client = yahoo_client(&config.data)?;
        let prices = pipeline::acquire(&client, &config.data)
            .await
            .with_context(|| format!("Failed to download {}", config.data.ticker))?;

        let analysis = pipeline::analyze(&config.data.ticker, prices, &config)
            .context("Analysis failed")?;

        let mut stdout = std::io::stdout().lock();
        report::present(&mut stdout, &analysis, &config.report).context("Reporting failed")?;

        tracing::info!(
            ticker = %analysis.ticker,
            rmse = analysis.evaluation.rmse,
            persistence = analysis.volatility.fit.persistence(),
            "Run complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let args = RunArgs {
            ticker: Some("^GSPC".to_string()),
            start: NaiveDate::from_ymd_opt(2021, 6, 1),
            end: None,
            horizon: Some(30),
            output_dir: Some(PathBuf::from("/tmp/out")),
        };
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.data.ticker, "^GSPC");
        assert_eq!(config.data.start_date, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert_eq!(config.data.end_date, None);
        assert_eq!(config.forecast.horizon, 30);
        assert_eq!(config.report.output_dir, PathBuf::from("/tmp/out"));
    }
}
