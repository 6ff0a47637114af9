//! taxonomy-kit CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = cli.log_level.clone().unwrap_or_else(|| {
        AppConfig::load(cli.config.as_deref())
            .map(|c| c.general.log_level)
            .unwrap_or_else(|_| "info".to_string())
    });
    init_logging(&log_level)?;

    let ctx = commands::Context {
        config_path: cli.config,
        db_override: cli.db,
    };

    // Execute command
    match cli.command {
        Commands::Groups(args) => commands::groups::execute(args, &ctx).await,
        Commands::Show(args) => commands::show::execute(args, &ctx).await,
        Commands::Prompt(args) => commands::prompt::execute(args, &ctx).await,
        Commands::Metadata(args) => commands::metadata::execute(args, &ctx).await,
        Commands::Classify(args) => commands::classify::execute(args, &ctx).await,
        Commands::Import(args) => commands::import::execute(args, &ctx).await,
        Commands::Config(args) => commands::config::execute(args).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
