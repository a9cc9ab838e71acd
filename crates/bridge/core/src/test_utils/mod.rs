mod mock_rest_client;

use rust_decimal::Decimal;
use serde_json::{Value, json};

pub use mock_rest_client::{MockResponse, MockRestClient};

use crate::models::{
    AmountValues, BridgeHistoryItem, FiatValue, QuoteMetadata, QuoteResponse, QuoteWithMetadata,
    StatusResponse, TokenAmountValues,
};

pub const SRC_TX_HASH: &str = "0x76a65e4cea35d8732f1e5b5f0dfe3ae3a2e6e8c6ac4e6d1d9a08bba5f4fc3d41";
pub const DEST_TX_HASH: &str = "0x1f8bd8f5c2e4ab7ba3ad8dc4e35f11c0bbf8d0f8b8e1f46de7ec0b1e01d6a93c";
pub const USDC_POLYGON: &str = "0x3c499c542cef5e3811e1192ce70d8cc03d5c3359";
pub const ACCOUNT: &str = "0xc5fe6ef47965741f6f7a4734bf784bf3ae3f2452";

/// 1 ETH on Optimism (0.00875 of it as fee) to 2480 USDC on Polygon via lifi/across
pub fn raw_quote() -> Value {
    let eth = json!({
        "chainId": 10,
        "address": "0x0000000000000000000000000000000000000000",
        "symbol": "ETH",
        "name": "Ethereum",
        "decimals": 18
    });
    let usdc = json!({
        "chainId": 137,
        "address": USDC_POLYGON,
        "symbol": "USDC",
        "name": "USD Coin",
        "decimals": 6
    });
    json!({
        "quote": {
            "requestId": "6a4c4f5b-5b7e-4e66-9c9c-2b9e6e9b1f1a",
            "srcChainId": 10,
            "srcAsset": eth,
            "srcTokenAmount": "991250000000000000",
            "destChainId": 137,
            "destAsset": usdc,
            "destTokenAmount": "2480000000",
            "feeData": {
                "metabridge": { "amount": "8750000000000000", "asset": eth }
            },
            "bridgeId": "lifi",
            "bridges": ["across"],
            "steps": [{
                "action": "bridge",
                "srcChainId": 10,
                "destChainId": 137,
                "srcAsset": eth,
                "destAsset": usdc,
                "srcAmount": "991250000000000000",
                "destAmount": "2480000000",
                "protocol": {
                    "name": "across",
                    "displayName": "Across",
                    "icon": "https://raw.githubusercontent.com/lifinance/types/main/src/assets/icons/bridges/acrossv2.png"
                }
            }]
        },
        "approval": null,
        "trade": {
            "chainId": 10,
            "to": "0xB90357f2b86dbfD59c3502215d4060f71DF8ca0e",
            "from": ACCOUNT,
            "value": "0x0de0b6b3a7640000",
            "data": "0x3ce33bff",
            "gasLimit": 196_023
        },
        "estimatedProcessingTimeInSeconds": 60
    })
}

pub fn quote_response() -> QuoteResponse {
    serde_json::from_value(raw_quote()).unwrap()
}

/// A quote whose only relevant inputs for ranking are its cost, adjusted return and ETA
pub fn ranked_quote(
    request_id: &str,
    cost: Option<Decimal>,
    adjusted_return: Option<Decimal>,
    eta_seconds: u64,
) -> QuoteWithMetadata {
    let mut response = quote_response();
    response.quote.request_id = request_id.to_string();
    response.estimated_processing_time_in_seconds = eta_seconds;
    QuoteWithMetadata {
        response,
        metadata: QuoteMetadata {
            to_token_amount: TokenAmountValues {
                amount: Decimal::ONE,
                fiat: None,
            },
            sent_amount: TokenAmountValues {
                amount: Decimal::ONE,
                fiat: None,
            },
            total_network_fee: AmountValues {
                amount: None,
                fiat: None,
            },
            adjusted_return: FiatValue {
                fiat: adjusted_return,
            },
            swap_rate: Some(Decimal::ONE),
            cost: FiatValue { fiat: cost },
        },
    }
}

/// A freshly submitted, still pending bridge transaction
pub fn history_item(src_tx_hash: &str, account: &str, start_time: i64) -> BridgeHistoryItem {
    let response = quote_response();
    BridgeHistoryItem {
        status: StatusResponse::pending(response.quote.src_chain_id, src_tx_hash),
        estimated_processing_time_in_seconds: response.estimated_processing_time_in_seconds,
        quote: response.quote,
        start_time: Some(start_time),
        slippage_percentage: Decimal::new(5, 1),
        completion_time: None,
        pricing_data: None,
        initial_dest_asset_balance: None,
        target_contract_address: None,
        account: account.to_string(),
    }
}
