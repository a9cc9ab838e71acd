use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{config::BridgeConfig, models::ChainId};

/// A network the wallet knows about
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfiguration {
    pub chain_id: ChainId,
    pub name: String,
    /// Symbol of the native currency, e.g. `ETH` or `POL`
    pub native_currency: String,
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_block_explorer_url_index: Option<usize>,
}

impl NetworkConfiguration {
    /// Root of the default block explorer, without a trailing slash
    pub fn block_explorer_url(&self) -> Option<&str> {
        let index = self.default_block_explorer_url_index?;
        self.block_explorer_urls
            .get(index)
            .map(|url| url.trim_end_matches('/'))
    }
}

/// Networks the user has added that bridging supports, one per chain id.
pub fn bridgeable_networks(
    networks: &[NetworkConfiguration],
    allowed_chain_ids: &[ChainId],
) -> Vec<NetworkConfiguration> {
    let mut seen = HashSet::new();
    networks
        .iter()
        .filter(|network| seen.insert(network.chain_id))
        .filter(|network| allowed_chain_ids.contains(&network.chain_id))
        .cloned()
        .collect()
}

pub fn from_chains(
    bridgeable: &[NetworkConfiguration],
    src_network_allowlist: &[ChainId],
) -> Vec<NetworkConfiguration> {
    bridgeable
        .iter()
        .filter(|network| src_network_allowlist.contains(&network.chain_id))
        .cloned()
        .collect()
}

/// Destinations for a source chain: every allowlisted network other than the source.
/// Nothing can be picked before a source chain is.
pub fn to_chains(
    from_chain: Option<&NetworkConfiguration>,
    bridgeable: &[NetworkConfiguration],
    dest_network_allowlist: &[ChainId],
) -> Vec<NetworkConfiguration> {
    let Some(from_chain) = from_chain else {
        return Vec::new();
    };
    bridgeable
        .iter()
        .filter(|network| {
            network.chain_id != from_chain.chain_id
                && dest_network_allowlist.contains(&network.chain_id)
        })
        .cloned()
        .collect()
}

/// Source and destination chains offered for bridging
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeChains {
    pub from_chains: Vec<NetworkConfiguration>,
    /// Empty until an allowed source chain is selected
    pub to_chains: Vec<NetworkConfiguration>,
}

/// Applies the configured chain allowlists to the user's networks.
pub fn bridge_chains(
    networks: &[NetworkConfiguration],
    from_chain_id: Option<ChainId>,
    config: &BridgeConfig,
) -> BridgeChains {
    let bridgeable = bridgeable_networks(networks, &config.allowed_chain_ids);
    let from = from_chains(&bridgeable, &config.src_network_allowlist);
    let from_chain = from_chain_id.and_then(|id| from.iter().find(|n| n.chain_id == id));
    let to = to_chains(from_chain, &bridgeable, &config.dest_network_allowlist);
    BridgeChains {
        from_chains: from,
        to_chains: to,
    }
}

/// A transfer is a bridge transaction when bridging is enabled and both chains are
/// selected and differ.
pub fn is_bridge_tx(
    from_chain: Option<&NetworkConfiguration>,
    to_chain: Option<&NetworkConfiguration>,
    bridge_enabled: bool,
) -> bool {
    match (from_chain, to_chain) {
        (Some(from), Some(to)) if bridge_enabled => from.chain_id != to.chain_id,
        _ => false,
    }
}
