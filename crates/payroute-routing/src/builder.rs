use futures::future::join_all;
use payroute_adapters::TokenProvider;
use payroute_core::{
    AcceptedConfiguration, Accounts, Asset, ChainRegistry, ConfigurationShape, DecimalAmount,
};
use tracing::{debug, warn};

use crate::error::CandidateError;
use crate::route::{AmountTarget, FromTokenCandidate, PaymentRoute};

/// Turn every (asset, accepted configuration) pair on the same chain into a
/// single-candidate route skeleton.
///
/// Output order is asset order, then configuration order. A pair that does
/// not apply produces nothing; a pair whose lookups fail is logged and skipped
/// without affecting the others.
pub async fn convert_to_routes(
    assets: &[Asset],
    accept: &[AcceptedConfiguration],
    accounts: &Accounts,
    registry: &ChainRegistry,
    tokens: &dyn TokenProvider,
) -> Vec<PaymentRoute> {
    let pairs = assets.iter().flat_map(|asset| {
        accept
            .iter()
            .filter(move |configuration| configuration.blockchain == asset.blockchain)
            .map(move |configuration| (asset, configuration))
    });

    let built = join_all(pairs.map(|(asset, configuration)| async move {
        let result = build_route(asset, configuration, accounts, registry, tokens).await;
        (asset, result)
    }))
    .await;

    let mut routes = Vec::new();
    for (asset, result) in built {
        match result {
            Ok(Some(route)) => routes.push(route),
            Ok(None) => {}
            Err(e) => warn!(
                blockchain = %asset.blockchain,
                token = %asset.address,
                error = %e,
                "Dropping candidate route"
            ),
        }
    }
    debug!(assets = assets.len(), routes = routes.len(), "Built candidate routes");
    routes
}

/// Build the route for one pair, or `None` if the configuration does not
/// apply to the asset.
pub async fn build_route(
    asset: &Asset,
    configuration: &AcceptedConfiguration,
    accounts: &Accounts,
    registry: &ChainRegistry,
    tokens: &dyn TokenProvider,
) -> Result<Option<PaymentRoute>, CandidateError> {
    let profile = registry
        .get(&asset.blockchain)
        .map_err(|_| CandidateError::UnknownBlockchain(asset.blockchain.clone()))?;
    let family = profile.family();

    let candidate = match configuration.shape() {
        ConfigurationShape::FixedOutput { token, amount } => {
            let to_decimals = if family.addresses_equal(token, &asset.address) {
                asset.decimals
            } else {
                decimals(tokens, &asset.blockchain, token).await?
            };
            FromTokenCandidate {
                to_amount: Some(minor_units(amount, to_decimals)?),
                ..skeleton(asset, token, AmountTarget::FixedOutput, to_decimals)
            }
        }
        ConfigurationShape::FixedInput {
            from_token,
            from_amount,
            to_token,
        } => {
            if !family.addresses_equal(from_token, &asset.address) {
                return Ok(None);
            }
            let to_decimals = if family.addresses_equal(to_token, &asset.address) {
                asset.decimals
            } else {
                decimals(tokens, &asset.blockchain, to_token).await?
            };
            FromTokenCandidate {
                from_amount: Some(minor_units(from_amount, asset.decimals)?),
                ..skeleton(asset, to_token, AmountTarget::FixedInput, to_decimals)
            }
        }
        ConfigurationShape::Inert => return Ok(None),
    };

    let from_address = accounts
        .get(&asset.blockchain)
        .ok_or_else(|| CandidateError::MissingAccount(asset.blockchain.clone()))?;

    Ok(Some(PaymentRoute {
        blockchain: asset.blockchain.clone(),
        from_address: from_address.clone(),
        to_address: configuration.to_address.clone(),
        fee: configuration.fee.clone(),
        from_tokens: vec![FromTokenCandidate {
            fee: configuration.fee.clone(),
            ..candidate
        }],
        to_tokens: Vec::new(),
    }))
}

fn skeleton(asset: &Asset, to_token: &str, target: AmountTarget, to_decimals: u8) -> FromTokenCandidate {
    FromTokenCandidate {
        from_token: asset.address.clone(),
        to_token: to_token.to_string(),
        target,
        from_amount: None,
        to_amount: None,
        from_decimals: asset.decimals,
        to_decimals,
        from_balance: asset.balance,
        exchange_routes: Vec::new(),
        direct_transfer: false,
        fee: None,
        fee_amount: None,
        approval_required: false,
        current_allowance: None,
        approval_transaction: None,
    }
}

async fn decimals(
    tokens: &dyn TokenProvider,
    blockchain: &str,
    token: &str,
) -> Result<u8, CandidateError> {
    tokens
        .decimals(blockchain, token)
        .await
        .map_err(|source| CandidateError::Decimals {
            blockchain: blockchain.to_string(),
            token: token.to_string(),
            source,
        })
}

fn minor_units(amount: &DecimalAmount, decimals: u8) -> Result<alloy_primitives::U256, CandidateError> {
    amount
        .to_minor_units(decimals)
        .map_err(|e| CandidateError::InvalidAmount(e.to_string()))
}
