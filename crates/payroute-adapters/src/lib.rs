//! Payroute Adapters
//!
//! Interfaces for the collaborators route resolution composes (asset
//! discovery, swap routing, token metadata and allowances) and deterministic
//! in-memory adapters implementing them.

pub mod adapters;
pub mod error;
pub mod traits;
pub mod types;

pub use adapters::memory::{PairQuote, StaticAssetDiscovery, StaticExchangeRouter, StaticTokenProvider};
pub use error::AdapterError;
pub use traits::{AssetDiscovery, ExchangeRouter, TokenProvider};
pub use types::{DiscoveryRequest, ExchangeAmount, ExchangeInfo, ExchangeRoute, ExchangeRouteRequest};
