//! Payroute CLI: resolve payment routes from the command line.
//!
//! Subcommands: init, resolve.

mod commands;
mod scenario;

use clap::{Parser, Subcommand};
use payroute_core::config::LoggingConfig;
use payroute_core::ResolverConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Payroute: what can this payer pay with, and how.
#[derive(Parser, Debug)]
#[command(name = "payroute", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "payroute.toml")]
    config: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Resolve payment routes for a scenario.
    Resolve(commands::resolve::ResolveArgs),
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Resolve(args) => {
            let mut config = ResolverConfig::load(&cli.config)?;
            if let Some(level) = &cli.log_level {
                config.logging.level = level.clone();
            }
            init_tracing(&config.logging);
            commands::resolve::run(args, config).await
        }
    }
}
