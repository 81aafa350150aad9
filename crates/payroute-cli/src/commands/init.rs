//! `payroute init`: write a default resolver configuration.

use clap::Args;
use payroute_core::ResolverConfig;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join("payroute.toml");

    if config_path.exists() {
        anyhow::bail!("configuration file already exists at {}", config_path.display());
    }

    ResolverConfig::default().save(&config_path)?;
    println!("Wrote default configuration to {}", config_path.display());
    println!("Run 'payroute resolve --scenario <file>' to resolve routes.");

    Ok(())
}
