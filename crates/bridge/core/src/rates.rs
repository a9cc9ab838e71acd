use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    amounts::to_fiat,
    chains::NetworkConfiguration,
    models::{NATIVE_ASSET_ADDRESS, QuoteWithMetadata, is_native_address},
};

const USD_CURRENCY_CODE: &str = "usd";

/// Token exchange rates keyed by lowercased token address.
///
/// A missing key means the rate is unknown, never zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, Decimal>", into = "HashMap<String, Decimal>")]
pub struct ExchangeRates(HashMap<String, Decimal>);

impl ExchangeRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token_address: &str, rate: Decimal) {
        self.0.insert(token_address.to_lowercase(), rate);
    }

    pub fn get(&self, token_address: &str) -> Option<Decimal> {
        self.0.get(&token_address.to_lowercase()).copied()
    }

    /// Rate of the chain's native asset
    pub fn native(&self) -> Option<Decimal> {
        self.get(NATIVE_ASSET_ADDRESS)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, Decimal>> for ExchangeRates {
    fn from(rates: HashMap<String, Decimal>) -> Self {
        let mut result = ExchangeRates::new();
        for (address, rate) in rates {
            result.insert(&address, rate);
        }
        result
    }
}

impl From<ExchangeRates> for HashMap<String, Decimal> {
    fn from(rates: ExchangeRates) -> Self {
        rates.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRate {
    pub conversion_rate: Option<Decimal>,
}

/// Cached conversion rates of native currencies, keyed by currency symbol
pub type CurrencyRates = HashMap<String, CurrencyRate>;

/// Resolves the rate of the destination token.
///
/// The destination network may be selected before its rates are cached, so a freshly
/// fetched rate wins. Otherwise a native destination token falls back to the cached
/// conversion rate of the network's native currency.
pub fn resolve_dest_exchange_rate(
    fetched: Option<Decimal>,
    dest_token_address: Option<&str>,
    dest_network: Option<&NetworkConfiguration>,
    cached: &CurrencyRates,
) -> Option<Decimal> {
    if fetched.is_some() {
        return fetched;
    }
    let address = dest_token_address?;
    if !is_native_address(address) {
        return None;
    }
    let network = dest_network?;
    cached
        .get(&network.native_currency)
        .and_then(|rate| rate.conversion_rate)
}

/// Values of the active quote in USD
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdAmounts {
    pub usd_amount_source: Option<Decimal>,
    pub usd_quoted_gas: Option<Decimal>,
    pub usd_quoted_return: Option<Decimal>,
}

/// Computes USD values of the active quote.
///
/// When the display currency is already USD the fiat values of the quote are reused,
/// otherwise the amounts are converted with USD rates of the source and destination
/// tokens. The source rates also carry the native asset rate used for gas.
pub fn converted_usd_amounts(
    active_quote: Option<&QuoteWithMetadata>,
    currency: &str,
    usd_src_rates: &ExchangeRates,
    usd_dest_rates: &ExchangeRates,
) -> UsdAmounts {
    let Some(active) = active_quote else {
        return UsdAmounts::default();
    };
    let metadata = &active.metadata;

    if currency.eq_ignore_ascii_case(USD_CURRENCY_CODE) {
        return UsdAmounts {
            usd_amount_source: metadata.sent_amount.fiat,
            usd_quoted_gas: metadata.total_network_fee.fiat,
            usd_quoted_return: metadata.to_token_amount.fiat,
        };
    }

    let quote = active.quote();
    UsdAmounts {
        usd_amount_source: to_fiat(
            metadata.sent_amount.amount,
            usd_src_rates.get(&quote.src_asset.address),
        ),
        usd_quoted_gas: metadata
            .total_network_fee
            .amount
            .and_then(|amount| to_fiat(amount, usd_src_rates.native())),
        usd_quoted_return: to_fiat(
            metadata.to_token_amount.amount,
            usd_dest_rates.get(&quote.dest_asset.address),
        ),
    }
}
