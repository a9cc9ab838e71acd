use std::{cmp::Ordering, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    BridgeError,
    config::BridgeConfig,
    metadata::{EnrichmentContext, enrich_quotes},
    models::{QuoteResponse, QuoteWithMetadata},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Cheapest first
    #[default]
    #[serde(rename = "cost_ascending")]
    CostAsc,
    /// Fastest first
    #[serde(rename = "time_descending")]
    EtaAsc,
}

impl FromStr for SortOrder {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cost" | "cost_ascending" => Ok(SortOrder::CostAsc),
            "eta" | "time_descending" => Ok(SortOrder::EtaAsc),
            other => Err(BridgeError::InvalidInput(format!(
                "unknown sort order: {other}"
            ))),
        }
    }
}

/// State of the quote fetch loop, owned by the caller
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFetchState {
    pub quotes_last_fetched_ms: Option<i64>,
    pub is_loading: bool,
    pub quotes_refresh_count: u32,
    /// The wallet cannot cover the requested source amount
    pub insufficient_balance: bool,
}

/// Ranked quotes ready for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeQuotes {
    pub sorted_quotes: Vec<QuoteWithMetadata>,
    pub recommended_quote: Option<QuoteWithMetadata>,
    pub active_quote: Option<QuoteWithMetadata>,
    pub quotes_last_fetched_ms: Option<i64>,
    pub is_loading: bool,
    pub quotes_refresh_count: u32,
    pub is_quote_going_to_refresh: bool,
}

impl BridgeQuotes {
    /// Destination amount of the active quote, in token units
    pub fn to_amount(&self) -> Option<Decimal> {
        self.active_quote
            .as_ref()
            .map(|quote| quote.metadata.to_token_amount.amount)
    }
}

/// Orders defined values ascending and undefined values last.
fn cmp_defined_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts quotes by cost or by ETA. The sort is stable, quotes without a cost are last.
pub fn sort_quotes(quotes: &[QuoteWithMetadata], order: SortOrder) -> Vec<QuoteWithMetadata> {
    let mut sorted = quotes.to_vec();
    match order {
        SortOrder::CostAsc => {
            sorted.sort_by(|a, b| cmp_defined_first(a.metadata.cost.fiat, b.metadata.cost.fiat));
        }
        SortOrder::EtaAsc => {
            sorted.sort_by_key(QuoteWithMetadata::estimated_processing_time_in_seconds);
        }
    }
    sorted
}

/// Picks the quote to preselect from an already sorted list.
///
/// When sorting by cost, the cheapest quote that arrives within `max_eta_seconds` wins.
/// When sorting by ETA, the fastest quote whose adjusted return is at least
/// `min_return_ratio` of the best adjusted return wins. If no quote passes its guard the
/// first sorted quote is used.
pub fn recommended_quote<'a>(
    sorted: &'a [QuoteWithMetadata],
    order: SortOrder,
    config: &BridgeConfig,
) -> Option<&'a QuoteWithMetadata> {
    let first = sorted.first()?;

    let best_return = sorted
        .iter()
        .map(|quote| quote.metadata.adjusted_return.fiat.unwrap_or_default())
        .max()
        .unwrap_or_default();

    let is_return_reasonable = |adjusted_return: Option<Decimal>| match adjusted_return {
        None => true,
        Some(_) if best_return <= Decimal::ZERO => false,
        Some(value) => value
            .checked_div(best_return)
            .is_some_and(|ratio| ratio >= config.min_return_ratio),
    };
    let is_eta_reasonable = |eta_seconds: u64| eta_seconds < config.max_eta_seconds;

    let selected = sorted.iter().find(|quote| match order {
        SortOrder::EtaAsc => is_return_reasonable(quote.metadata.adjusted_return.fiat),
        SortOrder::CostAsc => is_eta_reasonable(quote.estimated_processing_time_in_seconds()),
    });

    match selected {
        Some(quote) => {
            debug!(
                "Recommended quote {} ({}) out of {} quote(s), order {order:?}",
                quote.quote().request_id,
                quote.response.provider_label(),
                sorted.len()
            );
            Some(quote)
        }
        None => {
            debug!(
                "No quote passed the {order:?} guard, falling back to {}",
                first.quote().request_id
            );
            Some(first)
        }
    }
}

/// Runs the enrichment and ranking from scratch for the current inputs.
pub fn bridge_quotes(
    quotes: &[QuoteResponse],
    context: &EnrichmentContext,
    order: SortOrder,
    fetch_state: &QuoteFetchState,
    config: &BridgeConfig,
) -> BridgeQuotes {
    let enriched = enrich_quotes(quotes, context);
    let sorted_quotes = sort_quotes(&enriched, order);
    let recommended = recommended_quote(&sorted_quotes, order, config).cloned();
    let is_quote_going_to_refresh = if fetch_state.insufficient_balance {
        false
    } else {
        fetch_state.quotes_refresh_count < config.max_refresh_count
    };

    BridgeQuotes {
        sorted_quotes,
        active_quote: recommended.clone(),
        recommended_quote: recommended,
        quotes_last_fetched_ms: fetch_state.quotes_last_fetched_ms,
        is_loading: fetch_state.is_loading,
        quotes_refresh_count: fetch_state.quotes_refresh_count,
        is_quote_going_to_refresh,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_utils::{quote_response, ranked_quote};

    fn dec(value: i64) -> Option<Decimal> {
        Some(Decimal::from(value))
    }

    fn ids(quotes: &[QuoteWithMetadata]) -> Vec<&str> {
        quotes.iter().map(|q| q.quote().request_id.as_str()).collect()
    }

    fn config_with(max_eta_seconds: u64) -> BridgeConfig {
        BridgeConfig {
            max_eta_seconds,
            ..BridgeConfig::default()
        }
    }

    #[test]
    fn test_sort_by_cost_places_unknown_last() {
        let quotes = vec![
            ranked_quote("a", None, None, 10),
            ranked_quote("b", dec(3), dec(90), 20),
            ranked_quote("c", dec(1), dec(95), 30),
            ranked_quote("d", dec(2), dec(92), 40),
        ];
        let sorted = sort_quotes(&quotes, SortOrder::CostAsc);
        assert_eq!(ids(&sorted), vec!["c", "d", "b", "a"]);
    }

    #[test]
    fn test_sort_by_eta_is_stable() {
        let quotes = vec![
            ranked_quote("a", dec(1), dec(90), 300),
            ranked_quote("b", dec(2), dec(90), 60),
            ranked_quote("c", dec(3), dec(90), 300),
            ranked_quote("d", dec(4), dec(90), 60),
        ];
        let sorted = sort_quotes(&quotes, SortOrder::EtaAsc);
        assert_eq!(ids(&sorted), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_cost_ascending_reversed_is_cost_descending() {
        let quotes = vec![
            ranked_quote("a", dec(7), None, 10),
            ranked_quote("b", dec(-2), None, 10),
            ranked_quote("c", dec(11), None, 10),
            ranked_quote("d", dec(3), None, 10),
        ];
        let mut ascending = sort_quotes(&quotes, SortOrder::CostAsc);
        ascending.reverse();

        let mut descending = quotes.clone();
        descending.sort_by(|a, b| b.metadata.cost.fiat.cmp(&a.metadata.cost.fiat));
        assert_eq!(ids(&ascending), ids(&descending));
    }

    #[test]
    fn test_recommended_quote_empty_list() {
        assert!(recommended_quote(&[], SortOrder::CostAsc, &BridgeConfig::default()).is_none());
        assert!(recommended_quote(&[], SortOrder::EtaAsc, &BridgeConfig::default()).is_none());

        let result = bridge_quotes(
            &[],
            &EnrichmentContext::default(),
            SortOrder::CostAsc,
            &QuoteFetchState::default(),
            &BridgeConfig::default(),
        );
        assert!(result.sorted_quotes.is_empty());
        assert!(result.recommended_quote.is_none());
        assert!(result.active_quote.is_none());
        assert_eq!(result.to_amount(), None);
    }

    #[rstest]
    #[case::slow_cheapest_is_skipped(3_000, "five")]
    #[case::slow_cheapest_within_ceiling(7_000, "one")]
    #[case::ceiling_is_exclusive(6_000, "five")]
    fn test_cost_order_respects_eta_ceiling(
        #[case] max_eta_seconds: u64,
        #[case] expected: &str,
    ) {
        let quotes = vec![
            ranked_quote("five", dec(5), dec(95), 600),
            ranked_quote("one", dec(1), dec(99), 6_000),
        ];
        let sorted = sort_quotes(&quotes, SortOrder::CostAsc);
        let recommended =
            recommended_quote(&sorted, SortOrder::CostAsc, &config_with(max_eta_seconds)).unwrap();
        assert_eq!(recommended.quote().request_id, expected);
    }

    #[rstest]
    #[case::fastest_return_reasonable(dec(85), "fast")]
    #[case::fastest_return_too_low(dec(70), "slow")]
    #[case::fastest_return_at_threshold(dec(80), "fast")]
    #[case::fastest_return_unknown(None, "fast")]
    fn test_eta_order_respects_return_ratio(
        #[case] fast_return: Option<Decimal>,
        #[case] expected: &str,
    ) {
        let quotes = vec![
            ranked_quote("slow", dec(1), dec(100), 900),
            ranked_quote("fast", dec(20), fast_return, 60),
        ];
        let sorted = sort_quotes(&quotes, SortOrder::EtaAsc);
        let recommended =
            recommended_quote(&sorted, SortOrder::EtaAsc, &BridgeConfig::default()).unwrap();
        assert_eq!(recommended.quote().request_id, expected);
    }

    #[test]
    fn test_falls_back_to_first_when_no_quote_passes() {
        let quotes = vec![
            ranked_quote("a", dec(1), dec(90), 7_200),
            ranked_quote("b", dec(2), dec(90), 9_000),
        ];
        let sorted = sort_quotes(&quotes, SortOrder::CostAsc);
        let recommended =
            recommended_quote(&sorted, SortOrder::CostAsc, &BridgeConfig::default()).unwrap();
        assert_eq!(recommended.quote().request_id, "a");
    }

    #[test]
    fn test_non_positive_best_return_fails_ratio_guard() {
        let quotes = vec![
            ranked_quote("fast", dec(1), dec(-5), 60),
            ranked_quote("slow", dec(2), dec(0), 600),
            ranked_quote("unknown", dec(3), None, 900),
        ];
        let sorted = sort_quotes(&quotes, SortOrder::EtaAsc);
        let recommended =
            recommended_quote(&sorted, SortOrder::EtaAsc, &BridgeConfig::default()).unwrap();
        assert_eq!(recommended.quote().request_id, "unknown");
    }

    #[rstest]
    #[case::refreshing(2, false, true)]
    #[case::refresh_limit_reached(5, false, false)]
    #[case::insufficient_balance(0, true, false)]
    fn test_is_quote_going_to_refresh(
        #[case] quotes_refresh_count: u32,
        #[case] insufficient_balance: bool,
        #[case] expected: bool,
    ) {
        let fetch_state = QuoteFetchState {
            quotes_last_fetched_ms: Some(1_700_000_000_000),
            is_loading: false,
            quotes_refresh_count,
            insufficient_balance,
        };
        let result = bridge_quotes(
            &[quote_response()],
            &EnrichmentContext::default(),
            SortOrder::CostAsc,
            &fetch_state,
            &BridgeConfig::default(),
        );
        assert_eq!(result.is_quote_going_to_refresh, expected);
        assert_eq!(result.quotes_refresh_count, quotes_refresh_count);
        assert_eq!(result.quotes_last_fetched_ms, Some(1_700_000_000_000));
    }

    #[test]
    fn test_bridge_quotes_active_is_recommended() {
        let result = bridge_quotes(
            &[quote_response()],
            &EnrichmentContext::default(),
            SortOrder::default(),
            &QuoteFetchState::default(),
            &BridgeConfig::default(),
        );
        assert_eq!(result.sorted_quotes.len(), 1);
        assert_eq!(result.active_quote, result.recommended_quote);
        assert_eq!(result.to_amount(), Some(Decimal::from(2_480)));
    }

    #[test]
    fn test_sort_order_serialization() {
        assert_eq!(
            serde_json::to_string(&SortOrder::CostAsc).unwrap(),
            "\"cost_ascending\""
        );
        assert_eq!(
            serde_json::to_string(&SortOrder::EtaAsc).unwrap(),
            "\"time_descending\""
        );
        assert_eq!("eta".parse::<SortOrder>().unwrap(), SortOrder::EtaAsc);
        assert!("fastest".parse::<SortOrder>().is_err());
    }
}
