//! Fixtures shared by the cross-crate resolution scenarios.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use payroute_adapters::{
    AdapterError, AssetDiscovery, DiscoveryRequest, PairQuote, StaticAssetDiscovery,
    StaticExchangeRouter, StaticTokenProvider,
};
use payroute_core::chain::{DEFAULT_EVM_ROUTER, EVM_NATIVE_CURRENCY};
use payroute_core::{Accounts, Asset, ResolverConfig, TokenList};
use payroute_routing::RouteResolver;
use tokio::sync::mpsc;

pub const PAYER: &str = "0x7Bfee91193d9Df2Ac0bFe90191D40F23c773C060";
pub const MERCHANT: &str = "0x4e260bB2b25EC6F3A59B478fCDe5eD5B8D783B02";
pub const ROUTER: &str = DEFAULT_EVM_ROUTER;
pub const ETH: &str = EVM_NATIVE_CURRENCY;
pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const WBTC: &str = "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599";
pub const POLYGON_USDC: &str = "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359";

/// One whole token with `decimals` decimals, in minor units.
pub fn units(whole: u64, decimals: u8) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(decimals))
}

pub fn accounts() -> Accounts {
    let mut accounts = Accounts::new();
    accounts.insert("ethereum".into(), PAYER.into());
    accounts.insert("polygon".into(), PAYER.into());
    accounts
}

pub fn token_list(blockchain: &str, addresses: &[&str]) -> TokenList {
    let mut list = TokenList::new();
    list.insert(
        blockchain.to_string(),
        addresses.iter().map(|a| a.to_string()).collect(),
    );
    list
}

pub fn usdc(whole: u64) -> Asset {
    Asset::new("ethereum", USDC, 6, units(whole, 6))
}

pub fn dai(whole: u64) -> Asset {
    Asset::new("ethereum", DAI, 18, units(whole, 18))
}

pub fn eth(whole: u64) -> Asset {
    Asset::new("ethereum", ETH, 18, units(whole, 18))
}

pub fn weth(whole: u64) -> Asset {
    Asset::new("ethereum", WETH, 18, units(whole, 18))
}

pub fn wbtc(whole: u64) -> Asset {
    Asset::new("ethereum", WBTC, 8, units(whole, 8))
}

/// DAI and ETH/WETH swap into USDC: one DAI buys one USDC, one ETH buys
/// 2000 USDC.
pub fn exchanges() -> StaticExchangeRouter {
    StaticExchangeRouter::new()
        .with_pair(
            "ethereum",
            DAI,
            USDC,
            PairQuote::new(U256::from(1_000_000_000_000u64), U256::from(1u64)),
        )
        .with_pair(
            "ethereum",
            ETH,
            USDC,
            PairQuote::new(U256::from(500_000_000u64), U256::from(1u64)),
        )
        .with_pair(
            "ethereum",
            WETH,
            USDC,
            PairQuote::new(U256::from(500_000_000u64), U256::from(1u64)),
        )
}

pub fn tokens() -> StaticTokenProvider {
    StaticTokenProvider::new()
        .with_decimals("ethereum", USDC, 6)
        .with_decimals("ethereum", DAI, 18)
        .with_decimals("ethereum", WETH, 18)
        .with_decimals("ethereum", ETH, 18)
        .with_decimals("polygon", POLYGON_USDC, 6)
}

pub fn resolver(
    discovery: impl AssetDiscovery + 'static,
    exchanges: Arc<StaticExchangeRouter>,
    tokens: Arc<StaticTokenProvider>,
) -> RouteResolver {
    RouteResolver::new(ResolverConfig::default(), Arc::new(discovery), exchanges, tokens)
        .expect("default config is valid")
}

/// Wraps another discovery and counts how often it is called.
pub struct CountingDiscovery {
    inner: StaticAssetDiscovery,
    calls: Arc<AtomicUsize>,
}

impl CountingDiscovery {
    pub fn new(inner: StaticAssetDiscovery) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    pub fn count(calls: &AtomicUsize) -> usize {
        calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetDiscovery for CountingDiscovery {
    async fn drip_assets(
        &self,
        request: DiscoveryRequest,
        drip: Option<mpsc::UnboundedSender<Asset>>,
    ) -> Result<Vec<Asset>, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.drip_assets(request, drip).await
    }

    fn adapter_id(&self) -> &str {
        "counting-discovery"
    }
}
