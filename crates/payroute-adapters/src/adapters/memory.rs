use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use dashmap::DashMap;
use payroute_core::{Asset, AssetKey};
use tokio::sync::mpsc;

use crate::error::AdapterError;
use crate::traits::{AssetDiscovery, ExchangeRouter, TokenProvider};
use crate::types::{
    DiscoveryRequest, ExchangeAmount, ExchangeInfo, ExchangeRoute, ExchangeRouteRequest,
};

/// Asset discovery over a fixed list of assets.
///
/// Assets are reported in fixture order, each after its configured delay,
/// filtered by the request's accounts, allow list and deny list.
#[derive(Debug, Default)]
pub struct StaticAssetDiscovery {
    entries: Vec<(Asset, Duration)>,
    failure: Option<AdapterError>,
}

impl StaticAssetDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(self, asset: Asset) -> Self {
        self.with_delayed_asset(asset, Duration::ZERO)
    }

    /// Report `asset` only after `delay` has passed since the previous one.
    pub fn with_delayed_asset(mut self, asset: Asset, delay: Duration) -> Self {
        self.entries.push((asset, delay));
        self
    }

    /// Make every discovery run fail with `error`.
    pub fn failing(mut self, error: AdapterError) -> Self {
        self.failure = Some(error);
        self
    }

    fn is_requested(asset: &Asset, request: &DiscoveryRequest) -> bool {
        if !request.accounts.contains_key(&asset.blockchain) {
            return false;
        }
        if let Some(only) = &request.only {
            if !asset.listed_in(only) {
                return false;
            }
        }
        if let Some(exclude) = &request.exclude {
            if asset.listed_in(exclude) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl AssetDiscovery for StaticAssetDiscovery {
    async fn drip_assets(
        &self,
        request: DiscoveryRequest,
        drip: Option<mpsc::UnboundedSender<Asset>>,
    ) -> Result<Vec<Asset>, AdapterError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut found = Vec::new();
        for (asset, delay) in &self.entries {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
            if !Self::is_requested(asset, &request) {
                continue;
            }
            if let Some(tx) = &drip {
                if tx.send(asset.clone()).is_err() {
                    tracing::debug!(asset = %asset.key(), "drip receiver dropped");
                }
            }
            found.push(asset.clone());
        }

        tracing::debug!(count = found.len(), "static discovery complete");
        Ok(found)
    }

    fn adapter_id(&self) -> &str {
        "static-discovery"
    }
}

/// Pricing of one token pair for [`StaticExchangeRouter`].
///
/// One minor unit of the output token costs `price_numerator / price_denominator`
/// minor units of the input token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairQuote {
    pub price_numerator: U256,
    pub price_denominator: U256,
    /// Slippage tolerance in basis points.
    pub slippage_bps: u32,
    pub exchange: String,
    pub wrapper: bool,
}

impl PairQuote {
    pub fn new(price_numerator: impl Into<U256>, price_denominator: impl Into<U256>) -> Self {
        Self {
            price_numerator: price_numerator.into(),
            price_denominator: price_denominator.into(),
            slippage_bps: 50,
            exchange: "static".into(),
            wrapper: false,
        }
    }

    /// A 1:1 native wrap/unwrap.
    pub fn wrapper() -> Self {
        Self {
            slippage_bps: 0,
            exchange: "wrapper".into(),
            wrapper: true,
            ..Self::new(U256::from(1u64), U256::from(1u64))
        }
    }

    pub fn with_exchange(mut self, name: impl Into<String>) -> Self {
        self.exchange = name.into();
        self
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }

    fn slippage_of(&self, amount: U256) -> U256 {
        amount.saturating_mul(U256::from(self.slippage_bps)) / U256::from(10_000u64)
    }

    fn quote(&self, request: &ExchangeRouteRequest) -> Result<ExchangeRoute, AdapterError> {
        if self.price_denominator.is_zero() || self.price_numerator.is_zero() {
            return Err(AdapterError::InvalidResponse("zero price in pair quote".into()));
        }
        let (amount_in, amount_in_max, amount_out, amount_out_min) = match request.amount {
            ExchangeAmount::OutMin(out) => {
                let scaled = out.saturating_mul(self.price_numerator);
                let amount_in = scaled
                    .saturating_add(self.price_denominator - U256::from(1u64))
                    / self.price_denominator;
                let amount_in_max = amount_in.saturating_add(self.slippage_of(amount_in));
                (amount_in, amount_in_max, out, out)
            }
            ExchangeAmount::In(amount_in) => {
                let out = amount_in.saturating_mul(self.price_denominator) / self.price_numerator;
                let out_min = out.saturating_sub(self.slippage_of(out));
                (amount_in, amount_in, out, out_min)
            }
        };
        Ok(ExchangeRoute {
            blockchain: request.blockchain.clone(),
            token_in: request.token_in.clone(),
            token_out: request.token_out.clone(),
            amount_in: Some(amount_in),
            amount_in_max: Some(amount_in_max),
            amount_out: Some(amount_out),
            amount_out_min: Some(amount_out_min),
            exchange: ExchangeInfo {
                name: self.exchange.clone(),
                wrapper: self.wrapper,
            },
            path: vec![request.token_in.clone(), request.token_out.clone()],
        })
    }
}

/// (blockchain, token in, token out), addresses lowercased.
type PairKey = (String, String, String);

fn pair_key(blockchain: &str, token_in: &str, token_out: &str) -> PairKey {
    (
        blockchain.to_string(),
        token_in.to_lowercase(),
        token_out.to_lowercase(),
    )
}

/// Swap routing over configured pair quotes.
#[derive(Debug, Default)]
pub struct StaticExchangeRouter {
    pairs: DashMap<PairKey, PairQuote>,
    failing: DashMap<PairKey, AdapterError>,
    calls: AtomicUsize,
}

impl StaticExchangeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(self, blockchain: &str, token_in: &str, token_out: &str, quote: PairQuote) -> Self {
        self.pairs.insert(pair_key(blockchain, token_in, token_out), quote);
        self
    }

    /// Make lookups for this pair fail with `error`.
    pub fn with_failing_pair(
        self,
        blockchain: &str,
        token_in: &str,
        token_out: &str,
        error: AdapterError,
    ) -> Self {
        self.failing.insert(pair_key(blockchain, token_in, token_out), error);
        self
    }

    /// Number of route lookups served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExchangeRouter for StaticExchangeRouter {
    async fn route(
        &self,
        request: &ExchangeRouteRequest,
    ) -> Result<Vec<ExchangeRoute>, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = pair_key(&request.blockchain, &request.token_in, &request.token_out);
        if let Some(error) = self.failing.get(&key) {
            return Err(error.clone());
        }
        match self.pairs.get(&key) {
            Some(quote) => Ok(vec![quote.quote(request)?]),
            None => Ok(Vec::new()),
        }
    }
}

/// (token, owner, spender), addresses lowercased.
type AllowanceKey = (AssetKey, String, String);

/// Token metadata and allowances from fixed tables. Unknown entries are
/// reported as [`AdapterError::NotFound`].
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    decimals: DashMap<AssetKey, u8>,
    allowances: DashMap<AllowanceKey, U256>,
    allowance_calls: AtomicUsize,
}

impl StaticTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(self, blockchain: &str, token: &str, decimals: u8) -> Self {
        self.decimals.insert(AssetKey::new(blockchain, token), decimals);
        self
    }

    pub fn with_allowance(
        self,
        blockchain: &str,
        token: &str,
        owner: &str,
        spender: &str,
        amount: U256,
    ) -> Self {
        self.set_allowance(blockchain, token, owner, spender, amount);
        self
    }

    pub fn set_allowance(&self, blockchain: &str, token: &str, owner: &str, spender: &str, amount: U256) {
        self.allowances.insert(
            (
                AssetKey::new(blockchain, token),
                owner.to_lowercase(),
                spender.to_lowercase(),
            ),
            amount,
        );
    }

    /// Number of allowance lookups served so far.
    pub fn allowance_calls(&self) -> usize {
        self.allowance_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn decimals(&self, blockchain: &str, token: &str) -> Result<u8, AdapterError> {
        let key = AssetKey::new(blockchain, token);
        self.decimals
            .get(&key)
            .map(|d| *d)
            .ok_or_else(|| AdapterError::NotFound(format!("decimals for {}", key)))
    }

    async fn allowance(
        &self,
        blockchain: &str,
        token: &str,
        owner: &str,
        spender: &str,
    ) -> Result<U256, AdapterError> {
        self.allowance_calls.fetch_add(1, Ordering::SeqCst);
        let key = (
            AssetKey::new(blockchain, token),
            owner.to_lowercase(),
            spender.to_lowercase(),
        );
        self.allowances
            .get(&key)
            .map(|a| *a)
            .ok_or_else(|| AdapterError::NotFound(format!("allowance of {} for {}", key.0, owner)))
    }
}
