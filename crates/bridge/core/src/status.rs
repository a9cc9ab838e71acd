use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    BridgeError,
    amounts::token_amount_from_str,
    chains::NetworkConfiguration,
    models::{BridgeHistoryItem, StatusResponse, StatusTypes},
};

/// Outcome of applying a status snapshot to a history item
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The item changed and must be persisted
    Updated(Box<BridgeHistoryItem>),
    /// The stored item already reflects the snapshot, or is terminal
    Unchanged,
}

fn validate_status(status: &StatusResponse) -> Result<(), BridgeError> {
    if status.src_tx_hash().is_some() {
        return Ok(());
    }
    if status.dest_tx_hash().is_some() {
        return Err(BridgeError::InvalidStatus(
            "destination tx hash reported without a source tx hash".to_string(),
        ));
    }
    if status.status == StatusTypes::Complete {
        return Err(BridgeError::InvalidStatus(
            "complete status reported without a source tx hash".to_string(),
        ));
    }
    Ok(())
}

/// Applies a provider status snapshot to a history item.
///
/// The snapshot replaces the stored status as a whole. Terminal items never change
/// again, so re-applying a terminal status is a no-op. `completion_time` is stamped with
/// `now_ms` on the first transition to [`StatusTypes::Complete`].
pub fn apply_status(
    item: &BridgeHistoryItem,
    status: StatusResponse,
    now_ms: i64,
) -> Result<StatusUpdate, BridgeError> {
    validate_status(&status)?;

    if let Some(src_tx_hash) = status.src_tx_hash()
        && src_tx_hash != item.src_tx_hash()
    {
        return Err(BridgeError::InvalidStatus(format!(
            "status for {src_tx_hash} applied to {}",
            item.src_tx_hash()
        )));
    }

    if item.status.status.is_terminal() {
        debug!(
            "Ignoring {} status for {}: already {}",
            status.status,
            item.src_tx_hash(),
            item.status.status
        );
        return Ok(StatusUpdate::Unchanged);
    }

    let mut status = status;
    if status.src_tx_hash().is_none() {
        status.src_chain.tx_hash = item.src_tx_hash().to_string();
    }
    if status == item.status {
        return Ok(StatusUpdate::Unchanged);
    }

    let mut updated = item.clone();
    if status.status == StatusTypes::Complete && updated.completion_time.is_none() {
        updated.completion_time = Some(now_ms);
    }
    updated.status = status;
    Ok(StatusUpdate::Updated(Box::new(updated)))
}

/// Progress of the two legs of a bridge transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxSegments {
    /// Which of the two transactions is in progress, 1 or 2
    pub tx_index: u8,
    pub src_status: StatusTypes,
    /// Unknown until the source leg completes
    pub dest_status: Option<StatusTypes>,
}

impl TxSegments {
    /// `src_tx_confirmed` is whether the wallet saw the source transaction confirmed.
    pub fn for_item(item: &BridgeHistoryItem, src_tx_confirmed: bool) -> Result<Self, BridgeError> {
        let src_tx_hash = item.status.src_tx_hash();
        let dest_tx_hash = item.status.dest_tx_hash();

        let tx_index = match (src_tx_hash, dest_tx_hash) {
            (_, None) => 1,
            (Some(_), Some(_)) => 2,
            (None, Some(_)) => {
                return Err(BridgeError::InvalidStatus(
                    "destination tx hash without a source tx hash".to_string(),
                ));
            }
        };

        let src_status = if src_tx_confirmed {
            StatusTypes::Complete
        } else {
            StatusTypes::Pending
        };

        let dest_status = (src_status == StatusTypes::Complete).then(|| {
            if dest_tx_hash.is_some() && item.status.status == StatusTypes::Complete {
                StatusTypes::Complete
            } else {
                StatusTypes::Pending
            }
        });

        Ok(Self {
            tx_index,
            src_status,
            dest_status,
        })
    }
}

/// Link to a transaction on the network's default block explorer.
pub fn block_explorer_tx_url(
    network: Option<&NetworkConfiguration>,
    tx_hash: Option<&str>,
) -> Option<String> {
    let tx_hash = tx_hash.filter(|hash| !hash.is_empty())?;
    let root = network?.block_explorer_url()?;
    Some(format!("{root}/tx/{tx_hash}"))
}

/// Quoted destination amount with its symbol, e.g. `2480 USDC`
pub fn bridge_amount(item: &BridgeHistoryItem) -> Result<String, BridgeError> {
    let amount = token_amount_from_str(
        &item.quote.dest_token_amount,
        item.quote.dest_asset.decimals,
    )?;
    Ok(format!("{amount} {}", item.quote.dest_asset.symbol))
}
