use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    BridgeError,
    amounts::{calc_token_amount, checked_sub_opt, parse_base_units, to_fiat},
    fees::{BridgeFeesPerGas, gwei_to_native},
    models::{
        AmountValues, FiatValue, Quote, QuoteMetadata, QuoteResponse, QuoteWithMetadata,
        TokenAmountValues,
    },
};

/// Externally supplied inputs needed to price quotes in the display currency.
///
/// Any rate may be unknown; values depending on it are then left unknown as well.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentContext {
    pub src_token_exchange_rate: Option<Decimal>,
    pub dest_token_exchange_rate: Option<Decimal>,
    /// Rate of the source chain's native asset, used for gas and native source assets
    pub native_exchange_rate: Option<Decimal>,
    #[serde(default)]
    pub fees: BridgeFeesPerGas,
}

impl EnrichmentContext {
    /// Rate applying to the amount sent, which depends on whether the source asset is
    /// the chain's native asset.
    fn sent_rate(&self, quote: &Quote) -> Option<Decimal> {
        if quote.src_asset.is_native() {
            self.native_exchange_rate
        } else {
            self.src_token_exchange_rate
        }
    }
}

pub fn calc_to_amount(
    quote: &Quote,
    dest_exchange_rate: Option<Decimal>,
) -> Result<TokenAmountValues, BridgeError> {
    let amount = calc_token_amount(
        parse_base_units(&quote.dest_token_amount)?,
        quote.dest_asset.decimals,
    )?;
    Ok(TokenAmountValues {
        amount,
        fiat: to_fiat(amount, dest_exchange_rate),
    })
}

/// The amount leaving the wallet: the bridged amount plus the metabridge fee, which is
/// denominated in the source asset.
pub fn calc_sent_amount(
    quote: &Quote,
    src_exchange_rate: Option<Decimal>,
) -> Result<TokenAmountValues, BridgeError> {
    let bridged = parse_base_units(&quote.src_token_amount)?;
    let fee = parse_base_units(&quote.fee_data.metabridge.amount)?;
    let total = bridged.checked_add(fee).ok_or_else(|| {
        BridgeError::InvalidAmount(format!(
            "sent amount overflows for quote {}",
            quote.request_id
        ))
    })?;
    let amount = calc_token_amount(total, quote.src_asset.decimals)?;
    Ok(TokenAmountValues {
        amount,
        fiat: to_fiat(amount, src_exchange_rate),
    })
}

/// Gas cost of the trade and approval transactions in native units.
pub fn calc_total_network_fee(
    response: &QuoteResponse,
    fees: &BridgeFeesPerGas,
    native_exchange_rate: Option<Decimal>,
) -> AmountValues {
    let gas = Decimal::from(response.total_gas_limit());
    let amount = fees
        .fee_per_gas_gwei()
        .and_then(|fee| fee.checked_mul(gas))
        .and_then(gwei_to_native);
    AmountValues {
        amount,
        fiat: amount.and_then(|amount| to_fiat(amount, native_exchange_rate)),
    }
}

pub fn calc_adjusted_return(
    to_token_fiat: Option<Decimal>,
    network_fee_fiat: Option<Decimal>,
) -> FiatValue {
    FiatValue {
        fiat: checked_sub_opt(to_token_fiat, network_fee_fiat),
    }
}

/// Destination token units received per source token unit sent
pub fn calc_swap_rate(sent_amount: Decimal, to_amount: Decimal) -> Option<Decimal> {
    to_amount.checked_div(sent_amount)
}

pub fn calc_cost(sent_fiat: Option<Decimal>, adjusted_return_fiat: Option<Decimal>) -> FiatValue {
    FiatValue {
        fiat: checked_sub_opt(sent_fiat, adjusted_return_fiat),
    }
}

/// Computes the full pricing metadata of one quote.
pub fn enrich_quote(
    response: &QuoteResponse,
    context: &EnrichmentContext,
) -> Result<QuoteWithMetadata, BridgeError> {
    let quote = &response.quote;
    let to_token_amount = calc_to_amount(quote, context.dest_token_exchange_rate)?;
    let sent_amount = calc_sent_amount(quote, context.sent_rate(quote))?;
    let total_network_fee =
        calc_total_network_fee(response, &context.fees, context.native_exchange_rate);
    let adjusted_return = calc_adjusted_return(to_token_amount.fiat, total_network_fee.fiat);
    let swap_rate = calc_swap_rate(sent_amount.amount, to_token_amount.amount);
    let cost = calc_cost(sent_amount.fiat, adjusted_return.fiat);

    debug!(
        "Enriched quote {} ({}): cost {:?}, adjusted return {:?}",
        quote.request_id,
        response.provider_label(),
        cost.fiat,
        adjusted_return.fiat
    );
    Ok(QuoteWithMetadata {
        response: response.clone(),
        metadata: QuoteMetadata {
            to_token_amount,
            sent_amount,
            total_network_fee,
            adjusted_return,
            swap_rate,
            cost,
        },
    })
}

/// Enriches every quote, skipping those whose amounts cannot be priced.
pub fn enrich_quotes(
    responses: &[QuoteResponse],
    context: &EnrichmentContext,
) -> Vec<QuoteWithMetadata> {
    responses
        .iter()
        .filter_map(|response| match enrich_quote(response, context) {
            Ok(enriched) => Some(enriched),
            Err(e) => {
                warn!(
                    "Skipping quote {} that cannot be priced: {e}",
                    response.quote.request_id
                );
                None
            }
        })
        .collect()
}
