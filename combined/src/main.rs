//! `appkit` - administration binary for the security stores and query macros.

mod cli;
mod commands;

use clap::Parser;
use common::ServiceConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let config = ServiceConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    tracing::debug!(service = %config.service_name, command = ?cli.command, "Starting");

    match cli.command {
        Commands::Migrate { action } => commands::migrate::execute(action).await?,
        Commands::User { action } => commands::user::execute(action).await?,
        Commands::Role { action } => commands::role::execute(action).await?,
        Commands::Authorities { username } => commands::authorities::execute(&username).await?,
        Commands::Expand(args) => commands::expand::execute(args).await?,
    }

    Ok(())
}
