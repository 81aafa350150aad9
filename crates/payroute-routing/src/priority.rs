use std::collections::HashSet;

use payroute_core::{AcceptedConfiguration, ChainRegistry, CoreError, PriorityEntry, TokenList};

/// Build the ordered list of assets the payer should preferably be charged
/// from.
///
/// Entries come from the whitelist when one is given, otherwise from the
/// destination token of every accepted configuration. Each involved chain gets
/// its native currency appended unless it is already present or the whitelist
/// leaves it out. The result is free of duplicate keys and sorted by chain
/// cost, native currency first within equal cost.
pub fn build_priority(
    accept: &[AcceptedConfiguration],
    whitelist: Option<&TokenList>,
    registry: &ChainRegistry,
) -> Result<Vec<PriorityEntry>, CoreError> {
    let mut entries: Vec<PriorityEntry> = match whitelist {
        Some(list) => list
            .iter()
            .flat_map(|(blockchain, addresses)| {
                addresses
                    .iter()
                    .map(move |address| PriorityEntry::new(blockchain.as_str(), address.as_str()))
            })
            .collect(),
        None => accept
            .iter()
            .filter_map(|configuration| {
                configuration
                    .destination_token()
                    .map(|token| PriorityEntry::new(configuration.blockchain.as_str(), token))
            })
            .collect(),
    };

    let mut chains: Vec<String> = Vec::new();
    for entry in &entries {
        registry.get(&entry.blockchain)?;
        if !chains.contains(&entry.blockchain) {
            chains.push(entry.blockchain.clone());
        }
    }

    for blockchain in chains {
        let profile = registry.get(&blockchain)?;
        let present = entries
            .iter()
            .any(|entry| entry.blockchain == blockchain && profile.is_native(&entry.address));
        let allowed = whitelist.map_or(true, |list| {
            list.get(&blockchain)
                .is_some_and(|addresses| addresses.iter().any(|address| profile.is_native(address)))
        });
        if !present && allowed {
            entries.push(PriorityEntry::new(blockchain.as_str(), profile.native_currency.as_str()));
        }
    }

    let mut seen = HashSet::new();
    entries.retain(|entry| seen.insert(entry.key()));

    entries.sort_by(|a, b| {
        registry
            .cost(&a.blockchain)
            .cmp(&registry.cost(&b.blockchain))
            .then_with(|| {
                let a_native = registry.is_native(&a.blockchain, &a.address);
                let b_native = registry.is_native(&b.blockchain, &b.address);
                b_native.cmp(&a_native)
            })
    });
    Ok(entries)
}
