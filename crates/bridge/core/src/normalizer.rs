use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    BridgeError,
    amounts::{parse_base_units, token_amount_from_str},
    models::QuoteResponse,
};

/// Converts raw provider quotes into [`QuoteResponse`]s.
///
/// Every entry is handled on its own: entries that do not deserialize or fail validation
/// are dropped and logged, the rest are returned in their original order.
///
/// Token amounts must be representable as a [`rust_decimal::Decimal`] once shifted by the
/// asset decimals, so a quote whose source or destination amount has more than 28
/// significant integer digits in token units is dropped even though its base-unit string
/// parses as a `u128`.
pub fn normalize_quotes(raw: &[Value]) -> Vec<QuoteResponse> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, value)| match normalize_quote(value) {
            Ok(response) => Some(response),
            Err(e) => {
                debug!("Dropping malformed quote at index {index}: {e}");
                None
            }
        })
        .collect()
}

/// Parses a JSON array of raw provider quotes and normalizes its entries.
pub fn normalize_quotes_json(json: &str) -> Result<Vec<QuoteResponse>, BridgeError> {
    let raw: Vec<Value> = serde_json::from_str(json)?;
    Ok(normalize_quotes(&raw))
}

fn normalize_quote(value: &Value) -> Result<QuoteResponse, BridgeError> {
    let response = QuoteResponse::deserialize(value)?;
    validate_quote(&response)?;
    Ok(response)
}

fn validate_quote(response: &QuoteResponse) -> Result<(), BridgeError> {
    let quote = &response.quote;
    if quote.bridge_id.trim().is_empty() {
        return Err(BridgeError::InvalidInput("missing bridge id".to_string()));
    }
    if quote.src_asset.address.is_empty() || quote.dest_asset.address.is_empty() {
        return Err(BridgeError::InvalidInput(
            "missing asset address".to_string(),
        ));
    }
    token_amount_from_str(&quote.src_token_amount, quote.src_asset.decimals)?;
    token_amount_from_str(&quote.dest_token_amount, quote.dest_asset.decimals)?;
    parse_base_units(&quote.fee_data.metabridge.amount)?;
    Ok(())
}
