use alloy_primitives::U256;
use payroute_adapters::AdapterError;
use payroute_core::{AssetKey, CoreError};

/// Errors that abort a whole resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("asset discovery failed: {0}")]
    Discovery(#[source] AdapterError),
}

/// Why a single candidate was dropped from the pipeline.
///
/// Candidate failures never abort sibling candidates or the resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("no payer account configured on {0}")]
    MissingAccount(String),

    #[error("unknown blockchain: {0}")]
    UnknownBlockchain(String),

    #[error("decimals lookup failed for {token} on {blockchain}: {source}")]
    Decimals {
        blockchain: String,
        token: String,
        #[source]
        source: AdapterError,
    },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid fee: {0}")]
    InvalidFee(String),

    #[error("exchange route is missing {0}")]
    MissingExchangeAmount(&'static str),

    #[error("fee {fee} exceeds amount {amount}")]
    FeeExceedsAmount { fee: U256, amount: U256 },

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Failure to hand a released route to the drip consumer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DripError {
    #[error("drip receiver dropped before {0} was delivered")]
    ReceiverDropped(AssetKey),
}
