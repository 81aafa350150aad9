//! `payroute resolve`: run one resolution against a scenario file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use payroute_core::ResolverConfig;
use payroute_routing::{ResolveOptions, RouteResolver};
use serde_json::json;
use tokio::sync::mpsc;

use crate::scenario::Scenario;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Scenario file (TOML) describing the payer, the merchant and the market.
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Print routes as they are dripped, before the final ranking.
    #[arg(long)]
    pub drip: bool,

    /// Override the drip threshold in milliseconds.
    #[arg(long)]
    pub threshold_ms: Option<u64>,
}

pub async fn run(args: &ResolveArgs, mut config: ResolverConfig) -> anyhow::Result<()> {
    if let Some(threshold_ms) = args.threshold_ms {
        config.drip.threshold_ms = threshold_ms;
    }
    let scenario = Scenario::load(&args.scenario)?;
    let resolver = RouteResolver::new(
        config,
        Arc::new(scenario.discovery()),
        Arc::new(scenario.exchanges()),
        Arc::new(scenario.tokens()),
    )?;

    let options = ResolveOptions {
        whitelist: scenario.whitelist.clone(),
        blacklist: scenario.blacklist.clone(),
        drip: None,
    };

    let resolution = if args.drip {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = async {
            while let Some(route) = rx.recv().await {
                println!("{}", json!({ "event": "drip", "route": route }));
            }
        };
        let (resolution, ()) = tokio::join!(
            resolver.resolve(&scenario.accept, &scenario.accounts, options.with_drip(tx)),
            printer,
        );
        resolution?
    } else {
        resolver
            .resolve(&scenario.accept, &scenario.accounts, options)
            .await?
    };

    tracing::info!(
        routes = resolution.routes.len(),
        assets = resolution.assets.len(),
        "resolution complete"
    );
    let output = json!({
        "event": "routes",
        "routes": resolution.routes,
        "assets": resolution.assets,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
