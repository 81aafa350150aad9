use alloy_primitives::U256;
use payroute_core::amount::option_u256_decimal;
use payroute_core::{Accounts, PriorityEntry, TokenList};
use serde::{Deserialize, Serialize};

/// Parameters for one asset discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryRequest {
    /// Payer address per blockchain.
    pub accounts: Accounts,
    /// Preferred order in which assets should be looked up.
    pub priority: Vec<PriorityEntry>,
    /// Restrict discovery to these tokens.
    pub only: Option<TokenList>,
    /// Never report these tokens.
    pub exclude: Option<TokenList>,
}

/// The amount side fixed by a swap-route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeAmount {
    /// Receive at least this much of `token_out`.
    OutMin(#[serde(with = "payroute_core::amount::u256_decimal")] U256),
    /// Spend exactly this much of `token_in`.
    In(#[serde(with = "payroute_core::amount::u256_decimal")] U256),
}

/// A swap-route lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRouteRequest {
    pub blockchain: String,
    pub token_in: String,
    pub token_out: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: ExchangeAmount,
}

/// The exchange executing a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeInfo {
    pub name: String,
    /// True for native wrap/unwrap contracts rather than real swaps.
    #[serde(default)]
    pub wrapper: bool,
}

/// One candidate on-chain exchange path returned by swap routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRoute {
    pub blockchain: String,
    pub token_in: String,
    pub token_out: String,
    #[serde(default, with = "option_u256_decimal")]
    pub amount_in: Option<U256>,
    #[serde(default, with = "option_u256_decimal")]
    pub amount_in_max: Option<U256>,
    #[serde(default, with = "option_u256_decimal")]
    pub amount_out: Option<U256>,
    #[serde(default, with = "option_u256_decimal")]
    pub amount_out_min: Option<U256>,
    pub exchange: ExchangeInfo,
    /// Token addresses the swap passes through.
    #[serde(default)]
    pub path: Vec<String>,
}
