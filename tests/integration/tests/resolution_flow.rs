//! Integration test: full resolutions through the in-memory collaborators.
//!
//! Covers candidate building, swaps, direct transfers, fees, balance
//! filtering, approvals and ranking as one pipeline.

use std::sync::Arc;

use alloy_primitives::U256;
use payroute_adapters::{AdapterError, PairQuote, StaticAssetDiscovery, StaticExchangeRouter};
use payroute_core::{AcceptedConfiguration, Asset, CoreError, Fee};
use payroute_integration_tests::*;
use payroute_routing::filters::required_input;
use payroute_routing::{ResolveError, ResolveOptions};

fn pay_usdc(amount: &str) -> Vec<AcceptedConfiguration> {
    vec![AcceptedConfiguration::fixed_output("ethereum", USDC, amount, MERCHANT)]
}

// =========================================================================
// Swaps and direct transfers
// =========================================================================

#[tokio::test]
async fn test_dai_pays_usdc_through_swap() {
    let tokens = Arc::new(tokens());
    tokens.set_allowance("ethereum", DAI, PAYER, ROUTER, U256::ZERO);
    let resolver = resolver(
        StaticAssetDiscovery::new().with_asset(dai(100)),
        Arc::new(exchanges()),
        Arc::clone(&tokens),
    );

    let resolution = resolver
        .resolve(&pay_usdc("20"), &accounts(), ResolveOptions::default())
        .await
        .expect("resolution should succeed");

    assert_eq!(resolution.routes.len(), 1);
    let route = &resolution.routes[0];
    assert_eq!(route.blockchain, "ethereum");
    assert_eq!(route.from_address, PAYER);
    assert_eq!(route.to_address, MERCHANT);

    let candidate = &route.from_tokens[0];
    assert!(!candidate.direct_transfer);
    assert_eq!(candidate.exchange_routes.len(), 1);
    assert_eq!(candidate.from_amount, Some(units(20, 18)));
    assert_eq!(candidate.to_amount, Some(units(20, 6)));
    assert!(candidate.approval_required);
    assert_eq!(candidate.current_allowance, Some(U256::ZERO));

    let approval = candidate
        .approval_transaction
        .as_ref()
        .expect("approval transaction");
    assert_eq!(approval.to, DAI);
    assert_eq!(approval.spender, ROUTER);
    assert_eq!(approval.amount, U256::MAX);
    assert_eq!(approval.calldata().expect("valid spender").len(), 68);
}

#[tokio::test]
async fn test_sufficient_allowance_needs_no_approval() {
    let tokens = Arc::new(tokens());
    tokens.set_allowance("ethereum", DAI, PAYER, ROUTER, units(20, 18));
    let resolver = resolver(
        StaticAssetDiscovery::new().with_asset(dai(100)),
        Arc::new(exchanges()),
        tokens,
    );

    let resolution = resolver
        .resolve(&pay_usdc("20"), &accounts(), ResolveOptions::default())
        .await
        .unwrap();
    let candidate = &resolution.routes[0].from_tokens[0];
    assert!(!candidate.approval_required);
    assert!(candidate.approval_transaction.is_none());
    assert_eq!(candidate.current_allowance, Some(units(20, 18)));
}

#[tokio::test]
async fn test_native_direct_transfer_skips_swaps_and_approvals() {
    let exchanges = Arc::new(exchanges());
    let tokens = Arc::new(tokens());
    let resolver = resolver(
        StaticAssetDiscovery::new().with_asset(eth(1)),
        Arc::clone(&exchanges),
        Arc::clone(&tokens),
    );
    let accept = vec![AcceptedConfiguration::fixed_output("ethereum", ETH, "0.5", MERCHANT)];

    let resolution = resolver
        .resolve(&accept, &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.routes.len(), 1);
    let candidate = &resolution.routes[0].from_tokens[0];
    assert!(candidate.direct_transfer);
    assert!(!candidate.approval_required);
    assert!(candidate.exchange_routes.is_empty());
    assert_eq!(candidate.from_amount, Some(U256::from(500_000_000_000_000_000u64)));
    assert_eq!(exchanges.call_count(), 0);
    assert_eq!(tokens.allowance_calls(), 0);
}

#[tokio::test]
async fn test_fixed_input_configuration() {
    let resolver = resolver(
        StaticAssetDiscovery::new()
            .with_asset(dai(100))
            .with_asset(usdc(100)),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );
    let accept = vec![AcceptedConfiguration::fixed_input(
        "ethereum", DAI, "5", USDC, MERCHANT,
    )];

    let resolution = resolver
        .resolve(&accept, &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.routes.len(), 1);
    let candidate = &resolution.routes[0].from_tokens[0];
    assert_eq!(candidate.from_token, DAI);
    assert_eq!(candidate.from_amount, Some(units(5, 18)));
    // 5 USDC minus 0.5% slippage.
    assert_eq!(candidate.to_amount, Some(U256::from(4_975_000u64)));
}

// =========================================================================
// Fees
// =========================================================================

#[tokio::test]
async fn test_fee_with_two_decimals_rejected_before_discovery() {
    for fee in ["1.25%", "0.125%", "10.05%"] {
        let (discovery, calls) =
            CountingDiscovery::new(StaticAssetDiscovery::new().with_asset(usdc(100)));
        let resolver = resolver(discovery, Arc::new(exchanges()), Arc::new(tokens()));
        let accept = vec![AcceptedConfiguration::fixed_output("ethereum", USDC, "20", MERCHANT)
            .with_fee(Fee::new(fee))];

        let result = resolver
            .resolve(&accept, &accounts(), ResolveOptions::default())
            .await;

        assert!(
            matches!(result, Err(ResolveError::Config(CoreError::InvalidFee { .. }))),
            "fee {} should be rejected",
            fee
        );
        assert_eq!(CountingDiscovery::count(&calls), 0);
    }
}

#[tokio::test]
async fn test_negative_zero_fee_rejected_before_discovery() {
    let (discovery, calls) =
        CountingDiscovery::new(StaticAssetDiscovery::new().with_asset(usdc(100)));
    let resolver = resolver(discovery, Arc::new(exchanges()), Arc::new(tokens()));
    let accept = vec![AcceptedConfiguration::fixed_output("ethereum", USDC, "20", MERCHANT)
        .with_fee(Fee::new(-0.0))];

    let result = resolver
        .resolve(&accept, &accounts(), ResolveOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(ResolveError::Config(CoreError::InvalidFee { .. }))
    ));
    assert_eq!(CountingDiscovery::count(&calls), 0);
}

#[tokio::test]
async fn test_amount_finer_than_token_decimals_not_truncated() {
    let resolver = resolver(
        StaticAssetDiscovery::new().with_asset(usdc(100)),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );

    // USDC has 6 decimals; the seventh digit cannot be paid exactly.
    let resolution = resolver
        .resolve(&pay_usdc("20.0000009"), &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.assets.len(), 1);
    assert!(resolution.routes.is_empty());
}

#[tokio::test]
async fn test_percentage_fee_on_direct_transfer() {
    let resolver = resolver(
        StaticAssetDiscovery::new().with_asset(usdc(1)),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );
    // 0.0001 USDC is 100 minor units.
    let accept = vec![AcceptedConfiguration::fixed_output("ethereum", USDC, "0.0001", MERCHANT)
        .with_fee(Fee::new("1.5%"))];

    let resolution = resolver
        .resolve(&accept, &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    let route = &resolution.routes[0];
    assert_eq!(route.from_tokens[0].fee_amount, Some(U256::from(1u64)));
    assert_eq!(route.from_tokens[0].from_amount, Some(U256::from(100u64)));
    assert_eq!(route.to_tokens.len(), 1);
    assert_eq!(route.to_tokens[0].amount, U256::from(99u64));
    assert_eq!(route.to_tokens[0].fee_amount, U256::from(1u64));
}

#[tokio::test]
async fn test_fee_and_amount_sum_to_requested_total() {
    let resolver = resolver(
        StaticAssetDiscovery::new()
            .with_asset(dai(100))
            .with_asset(usdc(100)),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );
    let accept = vec![AcceptedConfiguration::fixed_output("ethereum", USDC, "20", MERCHANT)
        .with_fee(Fee::new("2%"))];

    let resolution = resolver
        .resolve(&accept, &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.routes.len(), 2);
    for route in &resolution.routes {
        let total = route
            .to_tokens
            .iter()
            .fold(U256::ZERO, |sum, entry| sum + entry.amount + entry.fee_amount);
        assert_eq!(total, units(20, 6));
        assert_eq!(route.to_tokens[0].fee_amount, U256::from(400_000u64));
    }
}

// =========================================================================
// Feasibility and failure isolation
// =========================================================================

#[tokio::test]
async fn test_insufficient_balance_never_returned() {
    let resolver = resolver(
        StaticAssetDiscovery::new()
            .with_asset(dai(20))
            .with_asset(usdc(19))
            .with_asset(weth(1)),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );

    let resolution = resolver
        .resolve(&pay_usdc("20"), &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    // DAI needs 20 plus slippage; USDC needs 20. One WETH covers 20 USDC.
    assert_eq!(resolution.assets.len(), 3);
    let surviving: Vec<_> = resolution
        .routes
        .iter()
        .flat_map(|r| &r.from_tokens)
        .collect();
    assert_eq!(surviving.len(), 1);
    assert_eq!(surviving[0].from_token, WETH);
    for candidate in surviving {
        assert!(candidate.from_balance >= required_input(candidate).unwrap());
    }
}

#[tokio::test]
async fn test_swap_lookup_failure_isolated() {
    let exchanges = StaticExchangeRouter::new()
        .with_pair(
            "ethereum",
            WETH,
            USDC,
            PairQuote::new(U256::from(500_000_000u64), U256::from(1u64)),
        )
        .with_failing_pair(
            "ethereum",
            DAI,
            USDC,
            AdapterError::Unavailable("aggregator timeout".into()),
        );
    let resolver = resolver(
        StaticAssetDiscovery::new()
            .with_asset(dai(100))
            .with_asset(weth(1)),
        Arc::new(exchanges),
        Arc::new(tokens()),
    );

    let resolution = resolver
        .resolve(&pay_usdc("20"), &accounts(), ResolveOptions::default())
        .await
        .expect("a failing swap lookup must not abort the resolution");

    let payable: Vec<_> = resolution
        .routes
        .iter()
        .filter(|route| !route.is_empty())
        .collect();
    assert_eq!(payable.len(), 1);
    assert_eq!(payable[0].from_tokens[0].from_token, WETH);
}

#[tokio::test]
async fn test_allowance_failure_fails_open() {
    // No allowance configured: every lookup fails.
    let tokens = Arc::new(tokens());
    let resolver = resolver(
        StaticAssetDiscovery::new().with_asset(dai(100)),
        Arc::new(exchanges()),
        Arc::clone(&tokens),
    );

    let resolution = resolver
        .resolve(&pay_usdc("20"), &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    let candidate = &resolution.routes[0].from_tokens[0];
    assert_eq!(tokens.allowance_calls(), 1);
    assert!(!candidate.approval_required);
    assert!(candidate.current_allowance.is_none());
}

#[tokio::test]
async fn test_blacklist_excludes_assets_case_insensitively() {
    let resolver = resolver(
        StaticAssetDiscovery::new()
            .with_asset(dai(100))
            .with_asset(usdc(100)),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );
    let lowercase_dai = DAI.to_lowercase();
    let blacklist = token_list("ethereum", &[lowercase_dai.as_str()]);

    let resolution = resolver
        .resolve(
            &pay_usdc("20"),
            &accounts(),
            ResolveOptions::default().with_blacklist(blacklist.clone()),
        )
        .await
        .unwrap();
    assert!(resolution.assets.iter().all(|asset| asset.address != DAI));

    let routes = resolver
        .assets_to_routes(vec![dai(100)], &pay_usdc("20"), &accounts(), Some(&blacklist))
        .await;
    assert!(routes.is_empty());
}

// =========================================================================
// Ranking
// =========================================================================

#[tokio::test]
async fn test_cheaper_chain_ranked_first() {
    let resolver = resolver(
        StaticAssetDiscovery::new()
            .with_asset(usdc(100))
            .with_asset(Asset::new("polygon", POLYGON_USDC, 6, units(100, 6))),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );
    let accept = vec![
        AcceptedConfiguration::fixed_output("ethereum", USDC, "20", MERCHANT),
        AcceptedConfiguration::fixed_output("polygon", POLYGON_USDC, "20", MERCHANT),
    ];

    let resolution = resolver
        .resolve(&accept, &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    let chains: Vec<&str> = resolution
        .routes
        .iter()
        .map(|route| route.blockchain.as_str())
        .collect();
    assert_eq!(chains, vec!["polygon", "ethereum"]);
}

#[tokio::test]
async fn test_direct_transfer_ranked_before_swap_on_same_chain() {
    let resolver = resolver(
        StaticAssetDiscovery::new()
            .with_asset(dai(100))
            .with_asset(eth(1))
            .with_asset(usdc(100)),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );

    let resolution = resolver
        .resolve(&pay_usdc("20"), &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    let from: Vec<&str> = resolution
        .routes
        .iter()
        .map(|route| route.from_tokens[0].from_token.as_str())
        .collect();
    // Swaps tie on every key and keep discovery order.
    assert_eq!(from, vec![USDC, DAI, ETH]);
}

#[tokio::test]
async fn test_routes_serialize_amounts_as_strings() {
    let resolver = resolver(
        StaticAssetDiscovery::new().with_asset(usdc(100)),
        Arc::new(exchanges()),
        Arc::new(tokens()),
    );
    let resolution = resolver
        .resolve(&pay_usdc("20"), &accounts(), ResolveOptions::default())
        .await
        .unwrap();

    let json = serde_json::to_value(&resolution.routes).unwrap();
    assert_eq!(json[0]["from_tokens"][0]["from_amount"], "20000000");
    assert_eq!(json[0]["to_tokens"][0]["amount"], "20000000");
}
