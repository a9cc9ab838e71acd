mod amounts;
mod chains;
mod config;
mod error;
mod fees;
mod logger;
mod metadata;
mod models;
mod normalizer;
mod persist;
mod ranking;
mod rates;
mod rest;
mod status;
mod tracker;

#[cfg(test)]
mod test_utils;

pub use amounts::{calc_token_amount, parse_base_units, token_amount_from_str};
pub use chains::{
    BridgeChains, NetworkConfiguration, bridge_chains, bridgeable_networks, from_chains,
    is_bridge_tx, to_chains,
};
pub use config::{ALLOWED_BRIDGE_CHAIN_IDS, BRIDGE_API_BASE_URL, BridgeConfig};
pub use error::{BridgeError, ServiceConnectivityError};
pub use fees::{
    BridgeFeesPerGas, GasFeeEstimates, GasFeeLevel, GasFeeLevelEstimate, gwei_to_native,
    gwei_to_wei,
};
pub use logger::{LogEntry, Logger, init_logging};
pub use metadata::{
    EnrichmentContext, calc_adjusted_return, calc_cost, calc_sent_amount, calc_swap_rate,
    calc_to_amount, calc_total_network_fee, enrich_quote, enrich_quotes,
};
pub use models::*;
pub use normalizer::{normalize_quotes, normalize_quotes_json};
pub use persist::{BridgeHistoryStorage, StorageError, sqlite::SqliteStorage};
pub use ranking::{
    BridgeQuotes, QuoteFetchState, SortOrder, bridge_quotes, recommended_quote, sort_quotes,
};
pub use rates::{
    CurrencyRate, CurrencyRates, ExchangeRates, UsdAmounts, converted_usd_amounts,
    resolve_dest_exchange_rate,
};
pub use rest::{ReqwestRestClient, RestClient, RestResponse};
pub use status::{StatusUpdate, TxSegments, apply_status, block_explorer_tx_url, bridge_amount};
pub use tracker::{BridgeStatusTracker, StatusApi, rest_status_api::RestStatusApi};
