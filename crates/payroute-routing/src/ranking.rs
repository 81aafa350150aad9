use std::cmp::Ordering;

use payroute_core::ChainRegistry;
use serde::{Deserialize, Serialize};

use crate::route::PaymentRoute;

/// Ordering criteria applied by [`rank_routes`].
///
/// Routes compare by:
///   1. chain cost, ascending
///   2. share of direct-transfer candidates, descending
///
/// With `extended_tie_breakers` two more keys follow:
///   3. number of required approvals, ascending
///   4. routes paid in the native currency first
///
/// Routes equal on every active key keep their input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingPolicy {
    pub extended_tie_breakers: bool,
}

impl RankingPolicy {
    pub fn new(extended_tie_breakers: bool) -> Self {
        Self {
            extended_tie_breakers,
        }
    }
}

/// The sort keys of one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingInput {
    pub cost: u32,
    pub direct_transfers: usize,
    pub candidates: usize,
    pub approvals: usize,
    pub native: bool,
}

impl RankingInput {
    pub fn of(route: &PaymentRoute, registry: &ChainRegistry) -> Self {
        Self {
            cost: registry.cost(&route.blockchain),
            direct_transfers: route.direct_transfer_count(),
            candidates: route.from_tokens.len(),
            approvals: route.approvals_required(),
            native: route
                .from_tokens
                .first()
                .is_some_and(|candidate| registry.is_native(&route.blockchain, &candidate.from_token)),
        }
    }

    /// Compares direct-transfer ratios without division. A route with no
    /// candidates has ratio 0.
    fn cmp_direct_ratio(&self, other: &Self) -> Ordering {
        let lhs = self.direct_transfers * other.candidates.max(1);
        let rhs = other.direct_transfers * self.candidates.max(1);
        // Higher ratio ranks first.
        rhs.cmp(&lhs)
    }

    pub fn compare(&self, other: &Self, policy: RankingPolicy) -> Ordering {
        let ordering = self
            .cost
            .cmp(&other.cost)
            .then_with(|| self.cmp_direct_ratio(other));
        if !policy.extended_tie_breakers {
            return ordering;
        }
        ordering
            .then_with(|| self.approvals.cmp(&other.approvals))
            .then_with(|| other.native.cmp(&self.native))
    }
}

/// Compare two routes under `policy`.
pub fn compare_routes(
    a: &PaymentRoute,
    b: &PaymentRoute,
    registry: &ChainRegistry,
    policy: RankingPolicy,
) -> Ordering {
    RankingInput::of(a, registry).compare(&RankingInput::of(b, registry), policy)
}

/// Stable sort of `routes`, best first.
pub fn rank_routes(
    routes: Vec<PaymentRoute>,
    registry: &ChainRegistry,
    policy: RankingPolicy,
) -> Vec<PaymentRoute> {
    let mut keyed: Vec<(RankingInput, PaymentRoute)> = routes
        .into_iter()
        .map(|route| (RankingInput::of(&route, registry), route))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b, policy));
    keyed.into_iter().map(|(_, route)| route).collect()
}
