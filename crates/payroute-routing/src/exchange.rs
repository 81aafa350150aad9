use futures::future::join_all;
use payroute_adapters::{ExchangeAmount, ExchangeRoute, ExchangeRouteRequest, ExchangeRouter};
use tracing::{debug, warn};

use crate::route::{AmountTarget, FromTokenCandidate, PaymentRoute};

/// Attach swap paths to every candidate that does not transfer directly.
///
/// All lookups run concurrently. A failed lookup leaves its candidate with no
/// exchange routes.
pub async fn attach_exchange_routes(
    routes: Vec<PaymentRoute>,
    router: &dyn ExchangeRouter,
) -> Vec<PaymentRoute> {
    join_all(routes.into_iter().map(|route| async move {
        let parent = &route;
        let candidates = join_all(parent.from_tokens.iter().map(|candidate| async move {
            if candidate.direct_transfer {
                return candidate.clone();
            }
            FromTokenCandidate {
                exchange_routes: lookup(parent, candidate, router).await,
                ..candidate.clone()
            }
        }))
        .await;
        route.with_from_tokens(candidates)
    }))
    .await
}

/// Swap-route request for a candidate, or `None` if the amount it needs is
/// missing.
pub fn exchange_request(
    route: &PaymentRoute,
    candidate: &FromTokenCandidate,
) -> Option<ExchangeRouteRequest> {
    let amount = match candidate.target {
        AmountTarget::FixedOutput => ExchangeAmount::OutMin(candidate.to_amount?),
        AmountTarget::FixedInput => ExchangeAmount::In(candidate.from_amount?),
    };
    Some(ExchangeRouteRequest {
        blockchain: route.blockchain.clone(),
        token_in: candidate.from_token.clone(),
        token_out: candidate.to_token.clone(),
        from_address: route.from_address.clone(),
        to_address: route.to_address.clone(),
        amount,
    })
}

async fn lookup(
    route: &PaymentRoute,
    candidate: &FromTokenCandidate,
    router: &dyn ExchangeRouter,
) -> Vec<ExchangeRoute> {
    let Some(request) = exchange_request(route, candidate) else {
        warn!(
            blockchain = %route.blockchain,
            token = %candidate.from_token,
            "Candidate has no amount to route"
        );
        return Vec::new();
    };
    match router.route(&request).await {
        Ok(found) => {
            debug!(
                blockchain = %request.blockchain,
                token_in = %request.token_in,
                token_out = %request.token_out,
                routes = found.len(),
                "Exchange routes found"
            );
            found
        }
        Err(e) => {
            warn!(
                blockchain = %request.blockchain,
                token_in = %request.token_in,
                token_out = %request.token_out,
                error = %e,
                "Exchange route lookup failed"
            );
            Vec::new()
        }
    }
}
