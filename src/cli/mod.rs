//! CLI interface for vix-analysis
//!
//! Provides subcommands for:
//! - `run`: Download, forecast, evaluate and report
//! - `fetch`: Download and describe only
//! - `config`: Show the effective configuration

mod fetch;
mod run;

pub use fetch::FetchArgs;
pub use run::RunArgs;

use crate::config::{Config, DataConfig};
use crate::feed::{YahooClient, YahooConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "vix-analysis")]
#[command(about = "Forecast and volatility analysis of a daily price index")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full analysis
    Run(RunArgs),
    /// Download and describe the series only
    Fetch(FetchArgs),
    /// Show the effective configuration
    Config,
}

/// Yahoo client honoring the configured timeout
fn yahoo_client(data: &DataConfig) -> anyhow::Result<YahooClient> {
    let client = YahooClient::with_config(YahooConfig {
        timeout: Duration::from_secs(data.timeout_secs),
        ..YahooConfig::default()
    })?;
    Ok(client)
}

/// Print `config` as TOML
pub fn show_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
