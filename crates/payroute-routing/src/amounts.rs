use alloy_primitives::U256;
use tracing::warn;

use crate::error::CandidateError;
use crate::route::{FromTokenCandidate, PaymentRoute, ToTokenAmount};

/// Settle final input, output and fee amounts on every candidate and
/// aggregate the per-destination-token totals of each route.
///
/// Candidates whose amounts cannot be settled are dropped.
pub fn compute_amounts(routes: Vec<PaymentRoute>) -> Vec<PaymentRoute> {
    routes
        .into_iter()
        .map(|route| {
            let candidates: Vec<FromTokenCandidate> = route
                .from_tokens
                .iter()
                .filter_map(|candidate| match settle(candidate) {
                    Ok(settled) => Some(settled),
                    Err(e) => {
                        warn!(
                            blockchain = %route.blockchain,
                            token = %candidate.from_token,
                            error = %e,
                            "Dropping candidate with unsettled amounts"
                        );
                        None
                    }
                })
                .collect();
            let to_tokens = aggregate_to_tokens(&candidates);
            PaymentRoute {
                to_tokens,
                ..route.with_from_tokens(candidates)
            }
        })
        .collect()
}

/// Settle one candidate's amounts.
pub fn settle(candidate: &FromTokenCandidate) -> Result<FromTokenCandidate, CandidateError> {
    if candidate.direct_transfer && candidate.fee.is_none() {
        let amount = candidate
            .to_amount
            .or(candidate.from_amount)
            .ok_or(CandidateError::MissingExchangeAmount("amount"))?;
        return Ok(FromTokenCandidate {
            from_amount: Some(amount),
            to_amount: Some(amount),
            ..candidate.clone()
        });
    }

    let (from_amount, gross) = match candidate.best_exchange_route() {
        Some(best) => (
            best.amount_in
                .or(candidate.from_amount)
                .ok_or(CandidateError::MissingExchangeAmount("amount_in"))?,
            best.amount_out_min
                .or(best.amount_out)
                .ok_or(CandidateError::MissingExchangeAmount("amount_out_min"))?,
        ),
        None => {
            let amount = candidate
                .from_amount
                .or(candidate.to_amount)
                .ok_or(CandidateError::MissingExchangeAmount("amount"))?;
            (amount, amount)
        }
    };

    let fee_amount = match &candidate.fee {
        Some(fee) => {
            let rule = fee
                .rule()
                .map_err(|e| CandidateError::InvalidFee(e.to_string()))?;
            let basis = candidate.to_amount.unwrap_or(gross);
            Some(
                rule.fee_on(basis, candidate.to_decimals)
                    .map_err(|e| CandidateError::InvalidFee(e.to_string()))?,
            )
        }
        None => None,
    };
    let to_amount = match fee_amount {
        Some(fee) => gross
            .checked_sub(fee)
            .ok_or(CandidateError::FeeExceedsAmount { fee, amount: gross })?,
        None => gross,
    };

    Ok(FromTokenCandidate {
        from_amount: Some(from_amount),
        to_amount: Some(to_amount),
        fee_amount,
        ..candidate.clone()
    })
}

/// Sum settled output and fee amounts per destination token, in first-seen
/// order.
pub fn aggregate_to_tokens(candidates: &[FromTokenCandidate]) -> Vec<ToTokenAmount> {
    let mut totals: Vec<ToTokenAmount> = Vec::new();
    for candidate in candidates {
        let amount = candidate.to_amount.unwrap_or(U256::ZERO);
        let fee_amount = candidate.fee_amount.unwrap_or(U256::ZERO);
        match totals
            .iter_mut()
            .find(|entry| entry.to_token.eq_ignore_ascii_case(&candidate.to_token))
        {
            Some(entry) => {
                entry.amount = entry.amount.saturating_add(amount);
                entry.fee_amount = entry.fee_amount.saturating_add(fee_amount);
            }
            None => totals.push(ToTokenAmount {
                to_token: candidate.to_token.clone(),
                amount,
                fee_amount,
            }),
        }
    }
    totals
}
