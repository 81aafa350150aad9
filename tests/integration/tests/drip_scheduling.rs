//! Integration test: priority-ordered drip delivery while discovery runs.
//!
//! Uses paused tokio time so discovery latencies and the release threshold
//! are deterministic.

use std::sync::Arc;
use std::time::Duration;

use payroute_adapters::StaticAssetDiscovery;
use payroute_core::{AcceptedConfiguration, AssetKey};
use payroute_integration_tests::*;
use payroute_routing::{
    DripError, DripReport, PaymentRoute, Resolution, ResolveOptions, RouteResolver,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

fn pay_usdc() -> Vec<AcceptedConfiguration> {
    vec![AcceptedConfiguration::fixed_output("ethereum", USDC, "20", MERCHANT)]
}

fn build(discovery: StaticAssetDiscovery) -> RouteResolver {
    resolver(discovery, Arc::new(exchanges()), Arc::new(tokens()))
}

/// Resolve with drip enabled, recording each dripped from-token and when it
/// arrived relative to the start of the resolution.
async fn resolve_with_drip(
    resolver: &RouteResolver,
    options: ResolveOptions,
) -> (Resolution, Vec<(String, Duration)>) {
    let start = Instant::now();
    let (tx, mut rx) = mpsc::unbounded_channel::<PaymentRoute>();
    let consumer = async {
        let mut seen = Vec::new();
        while let Some(route) = rx.recv().await {
            seen.push((route.from_tokens[0].from_token.clone(), start.elapsed()));
        }
        seen
    };
    let accept = pay_usdc();
    let from = accounts();
    let (resolution, seen) = tokio::join!(
        resolver.resolve(&accept, &from, options.with_drip(tx)),
        consumer,
    );
    (resolution.expect("resolution should succeed"), seen)
}

fn tokens_of(seen: &[(String, Duration)]) -> Vec<&str> {
    seen.iter().map(|(token, _)| token.as_str()).collect()
}

// =========================================================================
// Priority order
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_lower_priority_waits_for_higher_priority() {
    let resolver = build(
        StaticAssetDiscovery::new()
            .with_delayed_asset(dai(100), Duration::from_millis(10))
            .with_delayed_asset(usdc(100), Duration::from_millis(20))
            .with_delayed_asset(wbtc(1), Duration::from_millis(1000)),
    );
    let whitelist = token_list("ethereum", &[USDC, DAI, WBTC]);

    let (resolution, seen) =
        resolve_with_drip(&resolver, ResolveOptions::default().with_whitelist(whitelist)).await;

    assert_eq!(tokens_of(&seen), vec![USDC, DAI]);
    // Both are released as soon as USDC arrives, long before discovery ends.
    assert!(seen.iter().all(|(_, at)| *at >= Duration::from_millis(30)));
    assert!(seen.iter().all(|(_, at)| *at < Duration::from_millis(1000)));
    assert_eq!(resolution.assets.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_threshold_releases_queued_assets() {
    let resolver = build(
        StaticAssetDiscovery::new()
            .with_delayed_asset(dai(100), Duration::from_millis(10))
            .with_delayed_asset(usdc(100), Duration::from_millis(5000)),
    );
    let whitelist = token_list("ethereum", &[USDC, DAI]);

    let (_, seen) =
        resolve_with_drip(&resolver, ResolveOptions::default().with_whitelist(whitelist)).await;

    assert_eq!(tokens_of(&seen), vec![DAI, USDC]);
    let dai_at = seen[0].1;
    let usdc_at = seen[1].1;
    assert!(dai_at >= Duration::from_millis(3000));
    assert!(dai_at < Duration::from_millis(5000));
    assert!(usdc_at >= Duration::from_millis(5010));
}

#[tokio::test(start_paused = true)]
async fn test_unprioritized_asset_released_once_priorities_exhausted() {
    // Priority is [ETH, USDC]; DAI has no entry.
    let resolver = build(
        StaticAssetDiscovery::new()
            .with_asset(eth(1))
            .with_delayed_asset(usdc(100), Duration::from_millis(10))
            .with_delayed_asset(dai(100), Duration::from_millis(10))
            .with_delayed_asset(wbtc(1), Duration::from_millis(2000)),
    );

    let (_, seen) = resolve_with_drip(&resolver, ResolveOptions::default()).await;

    assert_eq!(tokens_of(&seen), vec![ETH, USDC, DAI]);
    let dai_at = seen[2].1;
    assert!(dai_at < Duration::from_millis(2000));
}

// =========================================================================
// Delivery guarantees
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_each_asset_dripped_once() {
    let resolver = build(
        StaticAssetDiscovery::new()
            .with_asset(usdc(100))
            .with_delayed_asset(usdc(100), Duration::from_millis(10)),
    );
    let whitelist = token_list("ethereum", &[USDC]);

    let (resolution, seen) =
        resolve_with_drip(&resolver, ResolveOptions::default().with_whitelist(whitelist)).await;

    assert_eq!(tokens_of(&seen), vec![USDC]);
    assert_eq!(
        resolution.drip,
        Some(DripReport {
            delivered: 1,
            failures: Vec::new(),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_assets_without_routes_are_not_dripped() {
    let resolver = build(StaticAssetDiscovery::new().with_asset(wbtc(1)));

    let (resolution, seen) = resolve_with_drip(&resolver, ResolveOptions::default()).await;

    assert!(seen.is_empty());
    assert_eq!(resolution.assets.len(), 1);
    assert_eq!(resolution.drip.map(|report| report.delivered), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_receiver_reported() {
    let resolver = build(StaticAssetDiscovery::new().with_asset(usdc(100)));
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);

    let resolution = resolver
        .resolve(&pay_usdc(), &accounts(), ResolveOptions::default().with_drip(tx))
        .await
        .expect("a dropped drip receiver must not abort the resolution");

    let report = resolution.drip.expect("drip report");
    assert_eq!(report.delivered, 0);
    assert_eq!(
        report.failures,
        vec![DripError::ReceiverDropped(AssetKey::new("ethereum", USDC))]
    );
    assert_eq!(resolution.routes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_final_ranking_independent_of_drip() {
    let discovery = || {
        StaticAssetDiscovery::new()
            .with_delayed_asset(dai(100), Duration::from_millis(30))
            .with_delayed_asset(eth(1), Duration::from_millis(5))
            .with_delayed_asset(usdc(100), Duration::from_millis(10))
    };

    let plain = build(discovery())
        .resolve(&pay_usdc(), &accounts(), ResolveOptions::default())
        .await
        .unwrap();
    let (dripped, seen) = resolve_with_drip(&build(discovery()), ResolveOptions::default()).await;

    assert_eq!(plain.routes, dripped.routes);
    assert_eq!(seen.len(), 3);
}
