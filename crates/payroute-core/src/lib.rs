pub mod amount;
pub mod chain;
pub mod config;
pub mod error;
pub mod fee;
pub mod types;

pub use alloy_primitives::U256;
pub use amount::DecimalAmount;
pub use chain::{ChainFamily, ChainProfile, ChainRegistry, Evm, FamilyKind, Svm};
pub use config::ResolverConfig;
pub use error::CoreError;
pub use fee::{Fee, FeeAmount, FeeRule};
pub use types::{
    AcceptedConfiguration, Accounts, Asset, AssetKey, ConfigurationShape, PriorityEntry,
    TokenList,
};
