use alloy_primitives::U256;
use async_trait::async_trait;
use payroute_core::Asset;
use tokio::sync::mpsc;

use crate::error::AdapterError;
use crate::types::{DiscoveryRequest, ExchangeRoute, ExchangeRouteRequest};

/// Balance discovery across blockchains.
#[async_trait]
pub trait AssetDiscovery: Send + Sync {
    /// Discover the payer's assets.
    ///
    /// When `drip` is set, every asset is also sent on it as soon as it is
    /// found. The full list is returned once discovery completes; the sender is
    /// dropped at that point.
    async fn drip_assets(
        &self,
        request: DiscoveryRequest,
        drip: Option<mpsc::UnboundedSender<Asset>>,
    ) -> Result<Vec<Asset>, AdapterError>;

    /// Return the unique identifier of this adapter.
    fn adapter_id(&self) -> &str;
}

/// Swap-route discovery.
#[async_trait]
pub trait ExchangeRouter: Send + Sync {
    /// Candidate exchange paths for a token pair, best first. An empty list
    /// means no path exists.
    async fn route(
        &self,
        request: &ExchangeRouteRequest,
    ) -> Result<Vec<ExchangeRoute>, AdapterError>;
}

/// Token metadata and allowance queries.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn decimals(&self, blockchain: &str, token: &str) -> Result<u8, AdapterError>;

    /// How much of `token` `spender` may move on behalf of `owner`.
    async fn allowance(
        &self,
        blockchain: &str,
        token: &str,
        owner: &str,
        spender: &str,
    ) -> Result<U256, AdapterError>;
}
