use clap::Parser;
use vix_analysis::cli::{self, Cli, Commands};
use vix_analysis::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())?;

    vix_analysis::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(ticker = %config.data.ticker, "Starting analysis");
            args.execute(config).await?;
        }
        Commands::Fetch(args) => {
            tracing::info!("Fetching price series");
            args.execute(config).await?;
        }
        Commands::Config => {
            cli::show_config(&config)?;
        }
    }

    Ok(())
}
