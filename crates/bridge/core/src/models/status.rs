use std::{convert::Infallible, fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use super::{Asset, ChainId, Quote, QuoteMetadata, QuoteResponse};

/// Overall status of a bridge transaction as reported by the status service.
///
/// Parsing never fails: any state the service reports that is not known here maps to
/// [`StatusTypes::Unknown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum StatusTypes {
    #[default]
    Unknown,
    Failed,
    Pending,
    Complete,
}

impl StatusTypes {
    /// No further polling is expected once a terminal status is reached
    pub fn is_terminal(self) -> bool {
        matches!(self, StatusTypes::Complete | StatusTypes::Failed)
    }
}

impl fmt::Display for StatusTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusTypes::Unknown => write!(f, "UNKNOWN"),
            StatusTypes::Failed => write!(f, "FAILED"),
            StatusTypes::Pending => write!(f, "PENDING"),
            StatusTypes::Complete => write!(f, "COMPLETE"),
        }
    }
}

impl FromStr for StatusTypes {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "FAILED" => StatusTypes::Failed,
            "PENDING" => StatusTypes::Pending,
            "COMPLETE" => StatusTypes::Complete,
            _ => StatusTypes::Unknown,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrcChainStatus {
    pub chain_id: ChainId,
    pub tx_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Asset>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestChainStatus {
    pub chain_id: ChainId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// The service sends `{}` until the received token is known
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_object_as_none"
    )]
    pub token: Option<Asset>,
}

fn empty_object_as_none<'de, D>(deserializer: D) -> Result<Option<Asset>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Status snapshot returned by the bridge status service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: StatusTypes,
    pub src_chain: SrcChainStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_chain: Option<DestChainStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expected_token: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unrecognized_router_address: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refuel: Option<Box<StatusResponse>>,
}

impl StatusResponse {
    /// The status recorded right after the source transaction is submitted
    pub fn pending(src_chain_id: ChainId, src_tx_hash: &str) -> Self {
        Self {
            status: StatusTypes::Pending,
            src_chain: SrcChainStatus {
                chain_id: src_chain_id,
                tx_hash: src_tx_hash.to_string(),
                amount: None,
                token: None,
            },
            dest_chain: None,
            bridge: None,
            is_expected_token: None,
            is_unrecognized_router_address: None,
            refuel: None,
        }
    }

    pub fn dest_tx_hash(&self) -> Option<&str> {
        self.dest_chain
            .as_ref()
            .and_then(|d| d.tx_hash.as_deref())
            .filter(|h| !h.is_empty())
    }

    pub fn src_tx_hash(&self) -> Option<&str> {
        Some(self.src_chain.tx_hash.as_str()).filter(|h| !h.is_empty())
    }
}

/// Query sent to the status service for one submitted bridge transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub bridge_id: String,
    pub src_tx_hash: String,
    pub bridge: String,
    pub src_chain_id: ChainId,
    pub dest_chain_id: ChainId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refuel: Option<bool>,
}

impl StatusRequest {
    pub fn from_quote(quote: &Quote, src_tx_hash: &str) -> Self {
        Self {
            bridge_id: quote.bridge_id.clone(),
            src_tx_hash: src_tx_hash.to_string(),
            bridge: quote
                .bridges
                .first()
                .cloned()
                .unwrap_or_else(|| quote.bridge_id.clone()),
            src_chain_id: quote.src_chain_id,
            dest_chain_id: quote.dest_chain_id,
            refuel: Some(quote.refuel.is_some()),
        }
    }
}

/// Durable record of one submitted bridge transaction, keyed by its source-chain tx hash
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeHistoryItem {
    pub quote: Quote,
    pub status: StatusResponse,
    /// Milliseconds since the unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    pub estimated_processing_time_in_seconds: u64,
    pub slippage_percentage: Decimal,
    /// Milliseconds since the unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<i64>,
    /// Pricing snapshot taken at submission time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_data: Option<QuoteMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_dest_asset_balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_contract_address: Option<String>,
    pub account: String,
}

impl BridgeHistoryItem {
    pub fn src_tx_hash(&self) -> &str {
        &self.status.src_chain.tx_hash
    }

    pub fn status_request(&self) -> StatusRequest {
        StatusRequest::from_quote(&self.quote, self.src_tx_hash())
    }
}

/// Everything needed to start tracking a submitted bridge transaction
#[derive(Clone, Debug)]
pub struct StartTrackingRequest {
    pub src_tx_hash: String,
    pub quote_response: QuoteResponse,
    pub pricing_data: Option<QuoteMetadata>,
    pub slippage_percentage: Decimal,
    pub start_time: Option<i64>,
    pub initial_dest_asset_balance: Option<Decimal>,
    pub target_contract_address: Option<String>,
    pub account: String,
}
