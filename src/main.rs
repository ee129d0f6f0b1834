use anyhow::Result;
use clap::{Parser, Subcommand};
use house_broker::{config::Config, migration, server, telemetry};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "house-broker", version, about = "House Broker property listing service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database if missing and apply migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let prometheus_handle = telemetry::init(&config.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(
                environment = %config.environment,
                "Starting House Broker on {}",
                config.http_addr()
            );
            server::run(config, prometheus_handle).await
        }
        Command::Migrate => migration::run_migrations(&config).await,
    }
}
