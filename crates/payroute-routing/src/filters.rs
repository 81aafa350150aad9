use alloy_primitives::U256;
use payroute_core::{Asset, ChainRegistry, TokenList};
use tracing::debug;

use crate::route::{AmountTarget, FromTokenCandidate, PaymentRoute};

/// Drop assets named on the deny list (per chain, case-insensitive).
pub fn filter_blacklisted(assets: Vec<Asset>, blacklist: Option<&TokenList>) -> Vec<Asset> {
    match blacklist {
        Some(list) => assets
            .into_iter()
            .filter(|asset| !asset.listed_in(list))
            .collect(),
        None => assets,
    }
}

/// Mark candidates that pay with the destination token itself.
pub fn classify_direct_transfers(
    routes: Vec<PaymentRoute>,
    registry: &ChainRegistry,
) -> Vec<PaymentRoute> {
    routes
        .into_iter()
        .map(|route| {
            let Ok(profile) = registry.get(&route.blockchain) else {
                return route;
            };
            let family = profile.family();
            let candidates = route
                .from_tokens
                .iter()
                .map(|candidate| FromTokenCandidate {
                    direct_transfer: family.supports_direct_transfer()
                        && family.addresses_equal(&candidate.from_token, &candidate.to_token),
                    ..candidate.clone()
                })
                .collect();
            route.with_from_tokens(candidates)
        })
        .collect()
}

/// Drop candidates that neither transfer directly nor have a swap path.
///
/// Routes left without candidates are kept.
pub fn filter_not_routable(routes: Vec<PaymentRoute>) -> Vec<PaymentRoute> {
    retain_candidates(routes, |_, candidate| {
        candidate.direct_transfer || !candidate.exchange_routes.is_empty()
    })
}

/// Drop candidates whose balance does not cover the input they need.
pub fn filter_insufficient_balance(routes: Vec<PaymentRoute>) -> Vec<PaymentRoute> {
    retain_candidates(routes, |route, candidate| match required_input(candidate) {
        Some(required) if candidate.from_balance >= required => true,
        required => {
            debug!(
                blockchain = %route.blockchain,
                token = %candidate.from_token,
                balance = %candidate.from_balance,
                required = ?required,
                "Insufficient balance"
            );
            false
        }
    })
}

/// Input amount a candidate spends, in from-token minor units.
pub fn required_input(candidate: &FromTokenCandidate) -> Option<U256> {
    if candidate.direct_transfer {
        return candidate.to_amount.or(candidate.from_amount);
    }
    let best = candidate.best_exchange_route()?;
    match candidate.target {
        AmountTarget::FixedOutput => best.amount_in_max.or(best.amount_in),
        AmountTarget::FixedInput => best.amount_in.or(candidate.from_amount),
    }
}

fn retain_candidates<F>(routes: Vec<PaymentRoute>, keep: F) -> Vec<PaymentRoute>
where
    F: Fn(&PaymentRoute, &FromTokenCandidate) -> bool,
{
    routes
        .into_iter()
        .map(|route| {
            let candidates = route
                .from_tokens
                .iter()
                .filter(|candidate| keep(&route, *candidate))
                .cloned()
                .collect();
            route.with_from_tokens(candidates)
        })
        .collect()
}
