use std::{path::PathBuf, time::Duration};

use anyhow::{Result, anyhow};
use bridge_core::{
    BridgeConfig, BridgeFeesPerGas, BridgeHistoryItem, BridgeStatusTracker, ChainId,
    EnrichmentContext, GasFeeEstimates, NetworkConfiguration, QuoteFetchState, SortOrder,
    StartTrackingRequest, StatusResponse, TxSegments, bridge_amount, bridge_chains, bridge_quotes,
    enrich_quote, normalize_quotes_json,
};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

#[derive(Clone, Subcommand)]
pub enum Command {
    /// Normalize, price and rank the quotes stored in a JSON file
    Quotes {
        /// File holding the raw quote array returned by the bridge API
        quotes: PathBuf,

        /// Ranking order (cost, eta)
        #[arg(short, long, default_value = "cost")]
        sort: SortOrder,

        #[command(flatten)]
        pricing: PricingArgs,

        /// Number of times the quotes were already refreshed
        #[arg(long, default_value_t = 0)]
        refresh_count: u32,

        /// Whether the account lacks the balance for the requested amount
        #[arg(long)]
        insufficient_balance: bool,
    },

    /// Start tracking a submitted bridge transaction
    Track {
        /// File holding the raw quote the transaction was submitted for
        quote: PathBuf,

        /// Hash of the submitted source chain transaction
        #[arg(short, long)]
        tx_hash: String,

        /// Account that submitted the transaction
        #[arg(short, long)]
        account: String,

        /// Slippage tolerance in percent
        #[arg(long)]
        slippage: Option<Decimal>,

        /// Rates and gas fees the quote was priced with when submitted
        #[command(flatten)]
        pricing: PricingArgs,
    },

    /// Apply a status snapshot stored in a JSON file to a tracked transaction
    Status {
        /// Source chain transaction hash
        tx_hash: String,

        /// File holding the status response
        status: PathBuf,
    },

    /// Fetch the latest status of a tracked transaction
    Poll {
        /// Source chain transaction hash
        tx_hash: String,

        /// Keep polling until the transaction reaches a terminal status
        #[arg(short, long)]
        watch: bool,
    },

    /// Show a tracked transaction with its progress
    Get {
        /// Source chain transaction hash
        tx_hash: String,

        /// Whether the wallet saw the source transaction confirmed
        #[arg(long)]
        src_confirmed: bool,
    },

    /// List tracked transactions, newest first
    History {
        /// Only list transactions of this account
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Delete all tracked transactions
    Wipe,

    /// List the chains that can be bridged from, and to from a selected source chain
    Chains {
        /// File holding the user's network configurations
        networks: PathBuf,

        /// Selected source chain id
        #[arg(short, long)]
        from: Option<ChainId>,
    },
}

/// Inputs used to price quotes in the display currency
#[derive(Clone, Debug, Default, Args)]
pub struct PricingArgs {
    /// Display currency rate of the source token
    #[arg(long)]
    src_rate: Option<Decimal>,

    /// Display currency rate of the destination token
    #[arg(long)]
    dest_rate: Option<Decimal>,

    /// Display currency rate of the source chain's native asset
    #[arg(long)]
    native_rate: Option<Decimal>,

    /// File holding the gas fee estimates of the source chain
    #[arg(long)]
    gas_fees: Option<PathBuf>,
}

impl PricingArgs {
    fn enrichment_context(&self, config: &BridgeConfig) -> Result<EnrichmentContext> {
        let estimates = match &self.gas_fees {
            Some(path) => Some(serde_json::from_str::<GasFeeEstimates>(
                &std::fs::read_to_string(path)?,
            )?),
            None => None,
        };
        Ok(EnrichmentContext {
            src_token_exchange_rate: self.src_rate,
            dest_token_exchange_rate: self.dest_rate,
            native_exchange_rate: self.native_rate,
            fees: BridgeFeesPerGas::from_estimates(
                estimates.as_ref(),
                config.preferred_gas_estimate,
            ),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryItemDetails {
    item: BridgeHistoryItem,
    bridge_amount: String,
    segments: TxSegments,
}

pub(crate) async fn execute_command(
    command: Command,
    tracker: &BridgeStatusTracker,
    config: &BridgeConfig,
) -> Result<()> {
    match command {
        Command::Quotes {
            quotes,
            sort,
            pricing,
            refresh_count,
            insufficient_balance,
        } => {
            let responses = normalize_quotes_json(&std::fs::read_to_string(quotes)?)?;
            let context = pricing.enrichment_context(config)?;
            let fetch_state = QuoteFetchState {
                quotes_refresh_count: refresh_count,
                insufficient_balance,
                ..QuoteFetchState::default()
            };
            let result = bridge_quotes(&responses, &context, sort, &fetch_state, config);
            print_value(&result)?;
        }
        Command::Track {
            quote,
            tx_hash,
            account,
            slippage,
            pricing,
        } => {
            let quote_response = normalize_quotes_json(&std::fs::read_to_string(quote)?)?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("No valid quote found"))?;
            let context = pricing.enrichment_context(config)?;
            let pricing_data = Some(enrich_quote(&quote_response, &context)?.metadata);
            let item = tracker
                .start_tracking(StartTrackingRequest {
                    src_tx_hash: tx_hash,
                    quote_response,
                    pricing_data,
                    slippage_percentage: slippage.unwrap_or(config.default_slippage_percentage),
                    start_time: None,
                    initial_dest_asset_balance: None,
                    target_contract_address: None,
                    account,
                })
                .await?;
            print_value(&item)?;
        }
        Command::Status { tx_hash, status } => {
            let status: StatusResponse = serde_json::from_str(&std::fs::read_to_string(status)?)?;
            let item = tracker.apply_status(&tx_hash, status).await?;
            print_value(&item)?;
        }
        Command::Poll { tx_hash, watch } => {
            let mut item = tracker.poll_status(&tx_hash).await?;
            while watch && !item.status.status.is_terminal() {
                info!(
                    "Bridge tx {tx_hash} still {}, polling again in {}ms",
                    item.status.status, config.status_poll_interval_ms
                );
                tokio::time::sleep(Duration::from_millis(config.status_poll_interval_ms)).await;
                item = tracker.poll_status(&tx_hash).await?;
            }
            print_value(&item)?;
        }
        Command::Get {
            tx_hash,
            src_confirmed,
        } => {
            let item = tracker
                .history_item(&tx_hash)
                .await?
                .ok_or_else(|| anyhow!("Bridge tx {tx_hash} is not tracked"))?;
            let details = HistoryItemDetails {
                bridge_amount: bridge_amount(&item)?,
                segments: TxSegments::for_item(&item, src_confirmed)?,
                item,
            };
            print_value(&details)?;
        }
        Command::History { account } => {
            let items = match account {
                Some(account) => tracker.history_for_account(&account).await?,
                None => tracker.history().await?,
            };
            print_value(&items)?;
        }
        Command::Wipe => {
            tracker.wipe_history().await?;
            println!("Bridge history wiped");
        }
        Command::Chains { networks, from } => {
            let networks: Vec<NetworkConfiguration> =
                serde_json::from_str(&std::fs::read_to_string(networks)?)?;
            print_value(&bridge_chains(&networks, from, config))?;
        }
    }
    Ok(())
}

fn print_value<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let serialized = serialize(value)?;
    println!("{serialized}");
    Ok(())
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
