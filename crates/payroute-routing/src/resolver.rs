//! One resolution: priority list, discovery with optional drip delivery, and
//! the full pipeline over every discovered asset.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use payroute_adapters::{AssetDiscovery, DiscoveryRequest, ExchangeRouter, TokenProvider};
use payroute_core::{
    AcceptedConfiguration, Accounts, Asset, ChainRegistry, CoreError, ResolverConfig, TokenList,
};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::amounts::compute_amounts;
use crate::approval::check_approvals;
use crate::builder::convert_to_routes;
use crate::drip::DripScheduler;
use crate::error::{DripError, ResolveError};
use crate::exchange::attach_exchange_routes;
use crate::filters::{
    classify_direct_transfers, filter_blacklisted, filter_insufficient_balance, filter_not_routable,
};
use crate::priority::build_priority;
use crate::ranking::{rank_routes, RankingPolicy};
use crate::route::PaymentRoute;

/// Caller options for one resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Only consider these tokens; also replaces the inferred priority list.
    pub whitelist: Option<TokenList>,
    /// Never consider these tokens.
    pub blacklist: Option<TokenList>,
    /// Receives routes early, at most one per asset, while discovery runs.
    pub drip: Option<mpsc::UnboundedSender<PaymentRoute>>,
}

impl ResolveOptions {
    pub fn with_whitelist(mut self, whitelist: TokenList) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    pub fn with_blacklist(mut self, blacklist: TokenList) -> Self {
        self.blacklist = Some(blacklist);
        self
    }

    pub fn with_drip(mut self, drip: mpsc::UnboundedSender<PaymentRoute>) -> Self {
        self.drip = Some(drip);
        self
    }
}

/// What drip delivery did during one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DripReport {
    pub delivered: usize,
    pub failures: Vec<DripError>,
}

impl DripReport {
    fn deliver(&mut self, released: Vec<PaymentRoute>, sink: &mpsc::UnboundedSender<PaymentRoute>) {
        for route in released {
            let Some(key) = route.key() else {
                continue;
            };
            match sink.send(route) {
                Ok(()) => {
                    info!(asset = %key, "Dripped route");
                    self.delivered += 1;
                }
                Err(_) => {
                    warn!(asset = %key, "Drip receiver dropped");
                    self.failures.push(DripError::ReceiverDropped(key));
                }
            }
        }
    }
}

/// The result of one resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Ranked routes, best first.
    pub routes: Vec<PaymentRoute>,
    /// Every asset discovery reported.
    pub assets: Vec<Asset>,
    /// Present when drip delivery was requested.
    pub drip: Option<DripReport>,
}

/// Resolves payment routes by composing the discovery, swap-routing and
/// token collaborators.
pub struct RouteResolver {
    config: ResolverConfig,
    registry: ChainRegistry,
    discovery: Arc<dyn AssetDiscovery>,
    exchanges: Arc<dyn ExchangeRouter>,
    tokens: Arc<dyn TokenProvider>,
}

impl RouteResolver {
    pub fn new(
        config: ResolverConfig,
        discovery: Arc<dyn AssetDiscovery>,
        exchanges: Arc<dyn ExchangeRouter>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, CoreError> {
        let registry = config.registry()?;
        Ok(Self {
            config,
            registry,
            discovery,
            exchanges,
            tokens,
        })
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn ranking_policy(&self) -> RankingPolicy {
        RankingPolicy::new(self.config.ranking.extended_tie_breakers)
    }

    /// Resolve every feasible way for the payer (`from`, address per chain)
    /// to satisfy one of the accepted configurations.
    ///
    /// Fee specifications and the priority list are validated before
    /// discovery is called; a failure there or in discovery itself is the
    /// only way this returns an error.
    pub async fn resolve(
        &self,
        accept: &[AcceptedConfiguration],
        from: &Accounts,
        options: ResolveOptions,
    ) -> Result<Resolution, ResolveError> {
        for configuration in accept {
            if let Some(fee) = &configuration.fee {
                fee.rule()?;
            }
        }
        let priority = build_priority(accept, options.whitelist.as_ref(), &self.registry)?;

        info!(
            configurations = accept.len(),
            priority = priority.len(),
            drip = options.drip.is_some(),
            discovery = self.discovery.adapter_id(),
            "Resolving payment routes"
        );

        let request = DiscoveryRequest {
            accounts: from.clone(),
            priority: priority.clone(),
            only: options.whitelist.clone(),
            exclude: options.blacklist.clone(),
        };
        let blacklist = options.blacklist.as_ref();

        let (assets, drip) = match options.drip {
            Some(sink) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let scheduler =
                    DripScheduler::new(&priority, Instant::now(), self.config.drip_threshold());
                let (assets, report) = tokio::join!(
                    self.discovery.drip_assets(request, Some(tx)),
                    self.run_drip(rx, scheduler, accept, from, blacklist, sink),
                );
                (assets, Some(report))
            }
            None => (self.discovery.drip_assets(request, None).await, None),
        };
        let assets = assets.map_err(ResolveError::Discovery)?;

        let routes = self
            .assets_to_routes(assets.clone(), accept, from, blacklist)
            .await;
        info!(
            assets = assets.len(),
            routes = routes.len(),
            "Resolved payment routes"
        );
        Ok(Resolution {
            routes,
            assets,
            drip,
        })
    }

    /// Run the full pipeline over `assets` and return the ranked routes.
    pub async fn assets_to_routes(
        &self,
        assets: Vec<Asset>,
        accept: &[AcceptedConfiguration],
        from: &Accounts,
        blacklist: Option<&TokenList>,
    ) -> Vec<PaymentRoute> {
        let assets = filter_blacklisted(assets, blacklist);
        let routes =
            convert_to_routes(&assets, accept, from, &self.registry, self.tokens.as_ref()).await;
        let routes = classify_direct_transfers(routes, &self.registry);
        let routes = attach_exchange_routes(routes, self.exchanges.as_ref()).await;
        let routes = filter_not_routable(routes);
        let routes = filter_insufficient_balance(routes);
        let routes = compute_amounts(routes);
        let routes = check_approvals(routes, &self.registry, self.tokens.as_ref()).await;
        rank_routes(routes, &self.registry, self.ranking_policy())
            .into_iter()
            .map(PaymentRoute::finalize)
            .collect()
    }

    /// Best route for a single freshly discovered asset.
    async fn single_asset_route(
        &self,
        asset: Asset,
        accept: &[AcceptedConfiguration],
        from: &Accounts,
        blacklist: Option<&TokenList>,
    ) -> Option<PaymentRoute> {
        self.assets_to_routes(vec![asset], accept, from, blacklist)
            .await
            .into_iter()
            .find(|route| !route.is_empty())
    }

    /// Consume assets as discovery reports them, resolve each on its own and
    /// feed the results through the scheduler until discovery completes.
    async fn run_drip(
        &self,
        mut assets: mpsc::UnboundedReceiver<Asset>,
        mut scheduler: DripScheduler,
        accept: &[AcceptedConfiguration],
        from: &Accounts,
        blacklist: Option<&TokenList>,
        sink: mpsc::UnboundedSender<PaymentRoute>,
    ) -> DripReport {
        let mut report = DripReport::default();
        let mut pending = FuturesUnordered::new();
        let mut receiving = true;
        let mut expired = false;
        let deadline = sleep_until(scheduler.deadline());
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                asset = assets.recv(), if receiving => match asset {
                    Some(asset) => {
                        debug!(blockchain = %asset.blockchain, token = %asset.address, "Asset discovered");
                        pending.push(self.single_asset_route(asset, accept, from, blacklist));
                    }
                    None => receiving = false,
                },
                Some(route) = pending.next(), if !pending.is_empty() => {
                    if let Some(route) = route {
                        let step = scheduler.offer(route, Instant::now());
                        debug!(decision = ?step.decision, released = step.released.len(), "Drip offer");
                        report.deliver(step.released, &sink);
                    }
                }
                () = &mut deadline, if !expired => {
                    expired = true;
                    report.deliver(scheduler.release_expired(Instant::now()), &sink);
                }
                else => break,
            }
            if !receiving && pending.is_empty() {
                break;
            }
        }

        report.deliver(scheduler.finish(), &sink);
        report
    }
}
