use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{fees::GasFeeLevel, models::ChainId};

pub const BRIDGE_API_BASE_URL: &str = "https://bridge.api.cx.metamask.io";

/// Ethereum, Optimism, BNB Chain, Polygon, zkSync Era, Base, Arbitrum One, Avalanche C-Chain, Linea
pub const ALLOWED_BRIDGE_CHAIN_IDS: [ChainId; 9] = [1, 10, 56, 137, 324, 8453, 42161, 43114, 59144];

/// Tuning of quote ranking, refresh and status polling
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Cheapest quotes slower than this are not recommended
    pub max_eta_seconds: u64,
    /// Fastest quotes returning less than this share of the best return are not recommended
    pub min_return_ratio: Decimal,
    pub preferred_gas_estimate: GasFeeLevel,
    pub max_refresh_count: u32,
    pub default_slippage_percentage: Decimal,
    /// Chains bridging supports at all
    pub allowed_chain_ids: Vec<ChainId>,
    /// Source chains the user may bridge from
    pub src_network_allowlist: Vec<ChainId>,
    /// Destination chains the user may bridge to
    pub dest_network_allowlist: Vec<ChainId>,
    pub status_api_base_url: String,
    pub status_poll_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_eta_seconds: 3600, // 1 hour
            min_return_ratio: Decimal::new(8, 1),
            preferred_gas_estimate: GasFeeLevel::High,
            max_refresh_count: 5,
            default_slippage_percentage: Decimal::new(5, 1),
            allowed_chain_ids: ALLOWED_BRIDGE_CHAIN_IDS.to_vec(),
            src_network_allowlist: ALLOWED_BRIDGE_CHAIN_IDS.to_vec(),
            dest_network_allowlist: ALLOWED_BRIDGE_CHAIN_IDS.to_vec(),
            status_api_base_url: BRIDGE_API_BASE_URL.to_string(),
            status_poll_interval_ms: 10_000,
        }
    }
}
