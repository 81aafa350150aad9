use std::collections::BTreeMap;
use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::amount::{u256_decimal, DecimalAmount};
use crate::fee::Fee;

/// Payer address per blockchain (`blockchain -> address`).
pub type Accounts = BTreeMap<String, String>;

/// Token addresses per blockchain, used for allow and deny lists.
pub type TokenList = BTreeMap<String, Vec<String>>;

/// Identity of a token on a chain: blockchain name plus lowercased address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn new(blockchain: &str, address: &str) -> Self {
        Self(format!("{}:{}", blockchain, address.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A token the payer holds, as reported by asset discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub blockchain: String,
    pub address: String,
    pub decimals: u8,
    /// Balance in minor units.
    #[serde(with = "u256_decimal")]
    pub balance: U256,
}

impl Asset {
    pub fn new(
        blockchain: impl Into<String>,
        address: impl Into<String>,
        decimals: u8,
        balance: U256,
    ) -> Self {
        Self {
            blockchain: blockchain.into(),
            address: address.into(),
            decimals,
            balance,
        }
    }

    pub fn key(&self) -> AssetKey {
        AssetKey::new(&self.blockchain, &self.address)
    }

    /// True if `list` names this asset for its chain (case-insensitive).
    pub fn listed_in(&self, list: &TokenList) -> bool {
        list.get(&self.blockchain).is_some_and(|addresses| {
            addresses
                .iter()
                .any(|address| address.eq_ignore_ascii_case(&self.address))
        })
    }
}

/// An entry of the ordered list the payer prefers to be charged from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityEntry {
    pub blockchain: String,
    pub address: String,
}

impl PriorityEntry {
    pub fn new(blockchain: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            blockchain: blockchain.into(),
            address: address.into(),
        }
    }

    pub fn key(&self) -> AssetKey {
        AssetKey::new(&self.blockchain, &self.address)
    }
}

/// A merchant-declared acceptance rule.
///
/// Either `token` + `amount` (the merchant wants a fixed amount of `token`) or
/// `from_token` + `from_amount` + `to_token` (the payer spends a fixed amount of
/// `from_token`). A configuration matching neither shape is inert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AcceptedConfiguration {
    pub blockchain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<DecimalAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_amount: Option<DecimalAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_token: Option<String>,
    pub to_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
}

/// The two meaningful shapes of an [`AcceptedConfiguration`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigurationShape<'a> {
    FixedOutput {
        token: &'a str,
        amount: &'a DecimalAmount,
    },
    FixedInput {
        from_token: &'a str,
        from_amount: &'a DecimalAmount,
        to_token: &'a str,
    },
    Inert,
}

impl AcceptedConfiguration {
    /// Fixed-output configuration: the merchant receives `amount` of `token`.
    pub fn fixed_output(
        blockchain: impl Into<String>,
        token: impl Into<String>,
        amount: impl Into<DecimalAmount>,
        to_address: impl Into<String>,
    ) -> Self {
        Self {
            blockchain: blockchain.into(),
            token: Some(token.into()),
            amount: Some(amount.into()),
            to_address: to_address.into(),
            ..Default::default()
        }
    }

    /// Fixed-input configuration: the payer spends `from_amount` of `from_token`.
    pub fn fixed_input(
        blockchain: impl Into<String>,
        from_token: impl Into<String>,
        from_amount: impl Into<DecimalAmount>,
        to_token: impl Into<String>,
        to_address: impl Into<String>,
    ) -> Self {
        Self {
            blockchain: blockchain.into(),
            from_token: Some(from_token.into()),
            from_amount: Some(from_amount.into()),
            to_token: Some(to_token.into()),
            to_address: to_address.into(),
            ..Default::default()
        }
    }

    pub fn with_fee(mut self, fee: Fee) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn shape(&self) -> ConfigurationShape<'_> {
        match (
            &self.token,
            &self.amount,
            &self.from_token,
            &self.from_amount,
            &self.to_token,
        ) {
            (Some(token), Some(amount), _, _, _) => ConfigurationShape::FixedOutput { token, amount },
            (_, _, Some(from_token), Some(from_amount), Some(to_token)) => {
                ConfigurationShape::FixedInput {
                    from_token,
                    from_amount,
                    to_token,
                }
            }
            _ => ConfigurationShape::Inert,
        }
    }

    /// The destination token this configuration settles into.
    pub fn destination_token(&self) -> Option<&str> {
        self.token.as_deref().or(self.to_token.as_deref())
    }
}
