//! Nekomata CLI - translation project workflow

pub mod commands;

use clap::Parser;
use commands::Commands;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::{Settings, Toolkit};

#[derive(Parser)]
#[command(name = "nekomata")]
#[command(about = "Nekomata: translate RPG Maker games", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Run the Nekomata CLI
pub fn run_cli() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.settings.as_deref())?;
    let toolkit = Toolkit::new(settings);
    cli.command.execute(&toolkit)?;

    Ok(())
}
