use alloy_primitives::U256;
use payroute_adapters::ExchangeRoute;
use payroute_core::amount::{option_u256_decimal, u256_decimal};
use payroute_core::{AssetKey, Fee};
use serde::{Deserialize, Serialize};

use crate::approval::ApprovalTransaction;

/// Which side of a candidate's amounts the merchant fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountTarget {
    /// The merchant receives a fixed amount of the destination token.
    FixedOutput,
    /// The payer spends a fixed amount of the source token.
    FixedInput,
}

/// One way of paying a route from a single held token.
///
/// Built by the candidate builder and replaced, never patched in place, by each
/// later pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromTokenCandidate {
    pub from_token: String,
    pub to_token: String,
    pub target: AmountTarget,
    #[serde(default, with = "option_u256_decimal")]
    pub from_amount: Option<U256>,
    #[serde(default, with = "option_u256_decimal")]
    pub to_amount: Option<U256>,
    pub from_decimals: u8,
    pub to_decimals: u8,
    #[serde(with = "u256_decimal")]
    pub from_balance: U256,
    #[serde(default)]
    pub exchange_routes: Vec<ExchangeRoute>,
    #[serde(default)]
    pub direct_transfer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
    #[serde(default, with = "option_u256_decimal")]
    pub fee_amount: Option<U256>,
    #[serde(default)]
    pub approval_required: bool,
    #[serde(default, with = "option_u256_decimal")]
    pub current_allowance: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_transaction: Option<ApprovalTransaction>,
}

impl FromTokenCandidate {
    /// The first (best) exchange route, if the candidate swaps.
    pub fn best_exchange_route(&self) -> Option<&ExchangeRoute> {
        self.exchange_routes.first()
    }

    /// True if the candidate pays with the destination token itself.
    pub fn is_same_token(&self) -> bool {
        self.from_token.eq_ignore_ascii_case(&self.to_token)
    }
}

/// Amount settled into one destination token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToTokenAmount {
    pub to_token: String,
    #[serde(with = "u256_decimal")]
    pub amount: U256,
    #[serde(with = "u256_decimal")]
    pub fee_amount: U256,
}

/// A feasible way to pay on one chain, aggregating one or more candidates
/// that settle into the same destination token set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRoute {
    pub blockchain: String,
    pub from_address: String,
    pub to_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
    pub from_tokens: Vec<FromTokenCandidate>,
    #[serde(default)]
    pub to_tokens: Vec<ToTokenAmount>,
}

impl PaymentRoute {
    /// True once every candidate has been filtered out.
    pub fn is_empty(&self) -> bool {
        self.from_tokens.is_empty()
    }

    /// Identity of the token this route is primarily paid with.
    pub fn key(&self) -> Option<AssetKey> {
        self.from_tokens
            .first()
            .map(|candidate| AssetKey::new(&self.blockchain, &candidate.from_token))
    }

    pub fn direct_transfer_count(&self) -> usize {
        self.from_tokens
            .iter()
            .filter(|candidate| candidate.direct_transfer)
            .count()
    }

    pub fn approvals_required(&self) -> usize {
        self.from_tokens
            .iter()
            .filter(|candidate| candidate.approval_required)
            .count()
    }

    /// Total amount of `to_token` the merchant receives.
    pub fn to_amount_of(&self, to_token: &str) -> Option<U256> {
        self.to_tokens
            .iter()
            .find(|entry| entry.to_token.eq_ignore_ascii_case(to_token))
            .map(|entry| entry.amount)
    }

    /// Returns a copy with `candidates` in place of the current ones.
    pub fn with_from_tokens(&self, candidates: Vec<FromTokenCandidate>) -> Self {
        Self {
            from_tokens: candidates,
            ..self.clone()
        }
    }

    /// Final normalisation: every candidate reports a spend amount.
    pub fn finalize(mut self) -> Self {
        for candidate in &mut self.from_tokens {
            if candidate.from_amount.is_none() {
                candidate.from_amount = candidate.to_amount;
            }
        }
        self
    }
}
