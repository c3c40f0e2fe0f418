//! APS CLI - Command-line interface for APS facies model documents.

use anyhow::Context;
use aps_cli::commands;
use aps_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config; a missing file means defaults
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path().context("failed to locate config")?,
    };
    let config = Config::load_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    init_logging(&config, cli.verbose);

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Validate(args) => commands::execute_validate(args, &formatter).await?,
        Command::Inspect(args) => commands::execute_inspect(args, &formatter).await?,
        Command::Copy(args) => commands::execute_copy(args, &config.copy, &formatter).await?,
        Command::Export(args) => commands::execute_export(args, &formatter).await?,
        Command::Config(args) => commands::execute_config(args, &config, &config_path, &formatter).await?,
    }

    Ok(())
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.settings.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
