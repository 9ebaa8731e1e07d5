use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use settle_driver::config::read_config;
use tracing::{error, info};

mod cli;

use cli::{
    cmd_decode, cmd_encode, cmd_info, cmd_simulate, init_logging, DecodeArgs, EncodeArgs,
    SimulateArgs,
};

/// Settle - wait until the app under test settles
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (overrides logging.level)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a waitForCondition command from condition tags
    Encode(EncodeArgs),

    /// Decode a command or condition payload and print its tree
    Decode(DecodeArgs),

    /// Run a wait command against a simulated frame scheduler
    Simulate(SimulateArgs),

    /// Show version and configuration
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The subscriber depends on the logging section, so the config is read
    // first and its source is logged once the subscriber is installed.
    let loaded = read_config(cli.config.as_deref()).await?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| loaded.config.logging.level.clone());
    init_logging(&level, cli.debug, loaded.config.logging.json)?;

    info!("Starting settle v{}", env!("CARGO_PKG_VERSION"));
    loaded.log_source();

    let result = match cli.command {
        Commands::Encode(args) => cmd_encode(args).await,
        Commands::Decode(args) => cmd_decode(args).await,
        Commands::Simulate(args) => cmd_simulate(args, &loaded.config).await,
        Commands::Info => cmd_info(&loaded).await,
    };

    match result {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
