use std::str::FromStr;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use futures::future::join_all;
use payroute_adapters::TokenProvider;
use payroute_core::amount::u256_decimal;
use payroute_core::ChainRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CandidateError;
use crate::route::{FromTokenCandidate, PaymentRoute};

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// An unsigned token approval the payer must submit before paying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalTransaction {
    pub blockchain: String,
    /// Token contract the transaction is sent to.
    pub to: String,
    pub spender: String,
    #[serde(with = "u256_decimal")]
    pub amount: U256,
}

impl ApprovalTransaction {
    /// ABI-encoded `approve(spender, amount)` call.
    pub fn calldata(&self) -> Result<Vec<u8>, CandidateError> {
        let spender = Address::from_str(&self.spender)
            .map_err(|_| CandidateError::InvalidAddress(self.spender.clone()))?;
        Ok(IERC20::approveCall {
            spender,
            amount: self.amount,
        }
        .abi_encode())
    }
}

/// Fill in `approval_required`, `current_allowance` and `approval_transaction`
/// on every candidate that spends a token through the chain's router.
///
/// Direct transfers, native-currency inputs and chains without approvals are
/// left untouched. A failed allowance lookup keeps the candidate without an
/// approval.
pub async fn check_approvals(
    routes: Vec<PaymentRoute>,
    registry: &ChainRegistry,
    tokens: &dyn TokenProvider,
) -> Vec<PaymentRoute> {
    join_all(routes.into_iter().map(|route| async move {
        let candidates = join_all(
            route
                .from_tokens
                .iter()
                .map(|candidate| check_candidate(&route, candidate.clone(), registry, tokens)),
        )
        .await;
        route.with_from_tokens(candidates)
    }))
    .await
}

async fn check_candidate(
    route: &PaymentRoute,
    candidate: FromTokenCandidate,
    registry: &ChainRegistry,
    tokens: &dyn TokenProvider,
) -> FromTokenCandidate {
    let Ok(profile) = registry.get(&route.blockchain) else {
        return candidate;
    };
    let family = profile.family();
    if !family.supports_approval()
        || candidate.direct_transfer
        || profile.is_native(&candidate.from_token)
    {
        return candidate;
    }
    let (Some(spender), Some(required)) = (
        profile.router.as_deref(),
        candidate.from_amount.or(candidate.to_amount),
    ) else {
        return candidate;
    };

    let allowance = match tokens
        .allowance(&route.blockchain, &candidate.from_token, &route.from_address, spender)
        .await
    {
        Ok(allowance) => allowance,
        Err(e) => {
            warn!(
                blockchain = %route.blockchain,
                token = %candidate.from_token,
                error = %e,
                "Allowance lookup failed, assuming no approval is needed"
            );
            return candidate;
        }
    };

    let approval_required = allowance < required;
    debug!(
        blockchain = %route.blockchain,
        token = %candidate.from_token,
        %allowance,
        %required,
        approval_required,
        "Checked allowance"
    );
    let approval_transaction = approval_required.then(|| ApprovalTransaction {
        blockchain: route.blockchain.clone(),
        to: candidate.from_token.clone(),
        spender: spender.to_string(),
        amount: family.max_approval_value(),
    });
    FromTokenCandidate {
        approval_required,
        current_allowance: Some(allowance),
        approval_transaction,
        ..candidate
    }
}
