mod status;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use status::*;

pub type ChainId = u64;

/// Address used by providers for the native asset of an EVM chain
pub const NATIVE_ASSET_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Returns true when the address denotes the chain's native asset.
pub fn is_native_address(address: &str) -> bool {
    address.is_empty() || address.eq_ignore_ascii_case(NATIVE_ASSET_ADDRESS)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub chain_id: ChainId,
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Asset {
    pub fn is_native(&self) -> bool {
        is_native_address(&self.address)
    }
}

/// Display descriptor of the protocol executing a quote
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Legacy quotes only carry a name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Protocol {
    pub fn has_label(&self) -> bool {
        self.display_name.is_some() || self.name.is_some()
    }

    /// Label shown to the user, preferring the display name
    pub fn label(&self) -> Option<&str> {
        self.display_name.as_deref().or(self.name.as_deref())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Bridge,
    Swap,
    Refuel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub action: ActionType,
    pub src_chain_id: ChainId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_chain_id: Option<ChainId>,
    pub src_asset: Asset,
    pub dest_asset: Asset,
    pub src_amount: String,
    pub dest_amount: String,
    pub protocol: Protocol,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeData {
    /// Fee amount in base units of `asset`
    pub amount: String,
    pub asset: Asset,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFeeData {
    pub metabridge: FeeData,
}

/// One provider's offer to convert an asset on one chain into an asset on another chain.
///
/// Amounts are base-unit integer strings exactly as received from the quote service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub request_id: String,
    pub src_chain_id: ChainId,
    pub src_asset: Asset,
    pub src_token_amount: String,
    pub dest_chain_id: ChainId,
    pub dest_asset: Asset,
    pub dest_token_amount: String,
    pub fee_data: QuoteFeeData,
    pub bridge_id: String,
    #[serde(default)]
    pub bridges: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refuel: Option<Step>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
    pub chain_id: ChainId,
    pub to: String,
    pub from: String,
    pub value: String,
    pub data: String,
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote: Quote,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<TxData>,
    pub trade: TxData,
    pub estimated_processing_time_in_seconds: u64,
}

impl QuoteResponse {
    /// The protocol shown for this quote: the first step's protocol when it is labelled,
    /// otherwise the first bridge used by the provider.
    pub fn protocol(&self) -> Protocol {
        if let Some(step) = self.quote.steps.first().filter(|s| s.protocol.has_label()) {
            return step.protocol.clone();
        }
        Protocol {
            name: self.quote.bridges.first().cloned(),
            ..Protocol::default()
        }
    }

    /// Identifier of the provider and bridge, e.g. `lifi_across`
    pub fn provider_label(&self) -> String {
        match self.quote.bridges.first() {
            Some(bridge) => format!("{}_{bridge}", self.quote.bridge_id),
            None => self.quote.bridge_id.clone(),
        }
    }

    /// Total gas units of the trade and the optional approval transaction
    pub fn total_gas_limit(&self) -> u64 {
        let approval = self
            .approval
            .as_ref()
            .and_then(|a| a.gas_limit)
            .unwrap_or_default();
        self.trade
            .gas_limit
            .unwrap_or_default()
            .saturating_add(approval)
    }
}

/// A token amount in token units with its value in the display currency
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmountValues {
    pub amount: Decimal,
    pub fiat: Option<Decimal>,
}

/// Like [`TokenAmountValues`], but the amount itself may be unknown
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountValues {
    pub amount: Option<Decimal>,
    pub fiat: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatValue {
    pub fiat: Option<Decimal>,
}

/// Values derived from a quote and the current exchange rates and gas fees.
///
/// Every fiat value is `None` when any rate it depends on is unknown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMetadata {
    pub to_token_amount: TokenAmountValues,
    pub sent_amount: TokenAmountValues,
    pub total_network_fee: AmountValues,
    pub adjusted_return: FiatValue,
    /// Destination token units received per source token unit sent
    pub swap_rate: Option<Decimal>,
    pub cost: FiatValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteWithMetadata {
    #[serde(flatten)]
    pub response: QuoteResponse,
    #[serde(flatten)]
    pub metadata: QuoteMetadata,
}

impl QuoteWithMetadata {
    pub fn quote(&self) -> &Quote {
        &self.response.quote
    }

    pub fn estimated_processing_time_in_seconds(&self) -> u64 {
        self.response.estimated_processing_time_in_seconds
    }
}
