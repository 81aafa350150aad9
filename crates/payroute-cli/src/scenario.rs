//! Scenario files: the payer's holdings, swap pairs and token metadata a
//! resolution runs against, plus the merchant's accepted configurations.

use std::path::Path;
use std::time::Duration;

use alloy_primitives::U256;
use anyhow::Context;
use payroute_adapters::{PairQuote, StaticAssetDiscovery, StaticExchangeRouter, StaticTokenProvider};
use payroute_core::amount::u256_decimal;
use payroute_core::{AcceptedConfiguration, Accounts, Asset, TokenList};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Payer address per blockchain.
    pub accounts: Accounts,
    pub accept: Vec<AcceptedConfiguration>,
    #[serde(default)]
    pub whitelist: Option<TokenList>,
    #[serde(default)]
    pub blacklist: Option<TokenList>,
    #[serde(default)]
    pub assets: Vec<ScenarioAsset>,
    #[serde(default)]
    pub pairs: Vec<ScenarioPair>,
    #[serde(default)]
    pub decimals: Vec<ScenarioDecimals>,
    #[serde(default)]
    pub allowances: Vec<ScenarioAllowance>,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioAsset {
    pub blockchain: String,
    pub address: String,
    pub decimals: u8,
    #[serde(with = "u256_decimal")]
    pub balance: U256,
    /// Discovery latency, relative to the previous asset.
    #[serde(default)]
    pub delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioPair {
    pub blockchain: String,
    pub token_in: String,
    pub token_out: String,
    #[serde(with = "u256_decimal")]
    pub price_numerator: U256,
    #[serde(with = "u256_decimal")]
    pub price_denominator: U256,
    #[serde(default)]
    pub slippage_bps: Option<u32>,
    #[serde(default)]
    pub exchange: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioDecimals {
    pub blockchain: String,
    pub token: String,
    pub decimals: u8,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioAllowance {
    pub blockchain: String,
    pub token: String,
    pub owner: String,
    pub spender: String,
    #[serde(with = "u256_decimal")]
    pub amount: U256,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn discovery(&self) -> StaticAssetDiscovery {
        self.assets
            .iter()
            .fold(StaticAssetDiscovery::new(), |discovery, entry| {
                discovery.with_delayed_asset(
                    Asset::new(
                        entry.blockchain.as_str(),
                        entry.address.as_str(),
                        entry.decimals,
                        entry.balance,
                    ),
                    Duration::from_millis(entry.delay_ms),
                )
            })
    }

    pub fn exchanges(&self) -> StaticExchangeRouter {
        self.pairs.iter().fold(StaticExchangeRouter::new(), |router, pair| {
            let mut quote = PairQuote::new(pair.price_numerator, pair.price_denominator);
            if let Some(bps) = pair.slippage_bps {
                quote = quote.with_slippage_bps(bps);
            }
            if let Some(exchange) = &pair.exchange {
                quote = quote.with_exchange(exchange.as_str());
            }
            router.with_pair(&pair.blockchain, &pair.token_in, &pair.token_out, quote)
        })
    }

    pub fn tokens(&self) -> StaticTokenProvider {
        let provider = self
            .decimals
            .iter()
            .fold(StaticTokenProvider::new(), |provider, entry| {
                provider.with_decimals(&entry.blockchain, &entry.token, entry.decimals)
            });
        for entry in &self.allowances {
            provider.set_allowance(
                &entry.blockchain,
                &entry.token,
                &entry.owner,
                &entry.spender,
                entry.amount,
            );
        }
        provider
    }
}
