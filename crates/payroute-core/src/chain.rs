use std::collections::HashMap;
use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Native currency placeholder address shared by EVM chains.
pub const EVM_NATIVE_CURRENCY: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// Native currency (SOL) address on Solana.
pub const SVM_NATIVE_CURRENCY: &str = "11111111111111111111111111111111";

/// Canonical Permit2 deployment, identical on every EVM chain. Used as the
/// default spender when a chain profile does not configure its own router.
pub const DEFAULT_EVM_ROUTER: &str = "0x000000000022D473030F116dDEE9F6B43aC78BA3";

/// Capabilities shared by every chain of one virtual-machine family.
pub trait ChainFamily: Send + Sync + fmt::Debug {
    /// Short family name (e.g. "evm").
    fn name(&self) -> &'static str;

    /// Whether spending a token through a router requires a prior approval.
    fn supports_approval(&self) -> bool;

    /// Whether a same-token payment can skip swapping entirely.
    fn supports_direct_transfer(&self) -> bool {
        true
    }

    /// The value used for unlimited approvals.
    fn max_approval_value(&self) -> U256;

    /// Address comparison used for token identity on this family.
    fn addresses_equal(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}

/// Ethereum-compatible chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evm;

impl ChainFamily for Evm {
    fn name(&self) -> &'static str {
        "evm"
    }

    fn supports_approval(&self) -> bool {
        true
    }

    fn max_approval_value(&self) -> U256 {
        U256::MAX
    }
}

/// Solana-style chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct Svm;

impl ChainFamily for Svm {
    fn name(&self) -> &'static str {
        "svm"
    }

    fn supports_approval(&self) -> bool {
        false
    }

    fn max_approval_value(&self) -> U256 {
        U256::from(u64::MAX)
    }
}

static EVM: Evm = Evm;
static SVM: Svm = Svm;

/// Family selector as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyKind {
    Evm,
    Svm,
}

impl FamilyKind {
    pub fn family(&self) -> &'static dyn ChainFamily {
        match self {
            Self::Evm => &EVM,
            Self::Svm => &SVM,
        }
    }
}

/// Per-chain constants: family, native currency, router and relative cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainProfile {
    pub name: String,
    pub family: FamilyKind,
    pub native_currency: String,
    /// Spender that approvals are granted to. Required on approval families.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<String>,
    /// Relative cost of paying on this chain; lower is cheaper.
    pub cost: u32,
}

impl ChainProfile {
    pub fn evm(name: &str, cost: u32) -> Self {
        Self {
            name: name.to_string(),
            family: FamilyKind::Evm,
            native_currency: EVM_NATIVE_CURRENCY.to_string(),
            router: Some(DEFAULT_EVM_ROUTER.to_string()),
            cost,
        }
    }

    pub fn svm(name: &str, cost: u32) -> Self {
        Self {
            name: name.to_string(),
            family: FamilyKind::Svm,
            native_currency: SVM_NATIVE_CURRENCY.to_string(),
            router: None,
            cost,
        }
    }

    pub fn family(&self) -> &'static dyn ChainFamily {
        self.family.family()
    }

    pub fn is_native(&self, address: &str) -> bool {
        self.family().addresses_equal(&self.native_currency, address)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.is_empty() {
            return Err(CoreError::InvalidConfig("chain name is empty".into()));
        }
        if self.native_currency.is_empty() {
            return Err(CoreError::InvalidConfig(format!(
                "chain {} has no native currency address",
                self.name
            )));
        }
        if self.family().supports_approval() && self.router.is_none() {
            return Err(CoreError::InvalidConfig(format!(
                "chain {} requires approvals but has no router configured",
                self.name
            )));
        }
        Ok(())
    }
}

/// Default chain profiles.
pub fn default_chains() -> Vec<ChainProfile> {
    vec![
        ChainProfile::evm("ethereum", 6),
        ChainProfile::evm("bsc", 1),
        ChainProfile::evm("polygon", 1),
        ChainProfile::svm("solana", 1),
        ChainProfile::evm("fantom", 1),
        ChainProfile::evm("arbitrum", 1),
        ChainProfile::evm("avalanche", 1),
        ChainProfile::evm("gnosis", 1),
        ChainProfile::evm("optimism", 1),
        ChainProfile::evm("base", 1),
        ChainProfile::evm("worldchain", 1),
    ]
}

/// Lookup table of chain profiles keyed by chain name.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: HashMap<String, ChainProfile>,
}

impl ChainRegistry {
    pub fn new(profiles: impl IntoIterator<Item = ChainProfile>) -> Result<Self, CoreError> {
        let mut chains = HashMap::new();
        for profile in profiles {
            profile.validate()?;
            if chains.contains_key(&profile.name) {
                return Err(CoreError::InvalidConfig(format!(
                    "duplicate chain profile: {}",
                    profile.name
                )));
            }
            chains.insert(profile.name.clone(), profile);
        }
        Ok(Self { chains })
    }

    pub fn get(&self, blockchain: &str) -> Result<&ChainProfile, CoreError> {
        self.chains
            .get(blockchain)
            .ok_or_else(|| CoreError::UnknownBlockchain(blockchain.to_string()))
    }

    pub fn contains(&self, blockchain: &str) -> bool {
        self.chains.contains_key(blockchain)
    }

    /// Relative cost of a chain. Unknown chains sort last.
    pub fn cost(&self, blockchain: &str) -> u32 {
        self.chains
            .get(blockchain)
            .map(|profile| profile.cost)
            .unwrap_or(u32::MAX)
    }

    pub fn is_native(&self, blockchain: &str, address: &str) -> bool {
        self.chains
            .get(blockchain)
            .is_some_and(|profile| profile.is_native(address))
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self {
            chains: default_chains()
                .into_iter()
                .map(|profile| (profile.name.clone(), profile))
                .collect(),
        }
    }
}
