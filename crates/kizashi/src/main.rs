//! Kizashi CLI binary.
//!
//! This binary provides command-line access to Kizashi:
//! - Run the publishing scheduler, or a single cycle
//! - Preview composed posts
//! - Inspect the dedup ledger
//! - Parse saved research answers

use clap::Parser;
use kizashi::{KizashiConfig, init_telemetry};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, compose_candidate, parse_research, run_bot, show_history};

    // API keys may live in a local .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_telemetry(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Run { once } => {
            let config = KizashiConfig::load(cli.config.as_deref())?;
            run_bot(&config, once).await?;
        }

        Commands::Compose {
            candidate,
            shape,
            max_length,
            rank,
        } => {
            let config = KizashiConfig::load(cli.config.as_deref())?;
            compose_candidate(&config, &candidate, shape.map(Into::into), max_length, rank)
                .await?;
        }

        Commands::History { hours, format } => {
            let config = KizashiConfig::load(cli.config.as_deref())?;
            show_history(&config, hours, format).await?;
        }

        Commands::Parse { file } => {
            parse_research(&file).await?;
        }
    }

    Ok(())
}
