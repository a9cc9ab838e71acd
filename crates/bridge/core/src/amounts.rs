use std::str::FromStr;

use rust_decimal::Decimal;

use crate::BridgeError;

/// Significant digits that always fit in a [`Decimal`] mantissa
const MAX_DECIMAL_DIGITS: usize = 28;

/// Parses a base-unit integer amount as sent by the quote and status services.
pub fn parse_base_units(raw: &str) -> Result<u128, BridgeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BridgeError::InvalidAmount(format!(
            "not a base unit amount: {raw:?}"
        )));
    }
    u128::from_str(trimmed)
        .map_err(|e| BridgeError::InvalidAmount(format!("{raw:?} out of range: {e}")))
}

/// Converts an amount in base units into token units by shifting it `decimals` places.
///
/// The conversion is exact unless the token units need more than 28 significant digits,
/// in which case the least significant fractional digits are truncated.
pub fn calc_token_amount(base_units: u128, decimals: u8) -> Result<Decimal, BridgeError> {
    let digits = base_units.to_string();
    let scale = usize::from(decimals);
    let (int_part, frac_part) = if digits.len() > scale {
        let split = digits.len().saturating_sub(scale);
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>scale$}"))
    };

    let int_digits = int_part.trim_start_matches('0');
    if int_digits.len() > MAX_DECIMAL_DIGITS {
        return Err(BridgeError::InvalidAmount(format!(
            "{base_units} with {decimals} decimals does not fit a decimal"
        )));
    }
    let frac_budget = MAX_DECIMAL_DIGITS.saturating_sub(int_digits.len());
    let frac = frac_part.trim_end_matches('0');
    let frac = &frac[..frac.len().min(frac_budget)];

    let text = if frac.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac}")
    };
    Ok(Decimal::from_str(&text)?.normalize())
}

/// Parses a base-unit string and converts it into token units.
pub fn token_amount_from_str(raw: &str, decimals: u8) -> Result<Decimal, BridgeError> {
    calc_token_amount(parse_base_units(raw)?, decimals)
}

/// Multiplies an amount by an optional exchange rate; an unknown rate gives an unknown value.
pub fn to_fiat(amount: Decimal, rate: Option<Decimal>) -> Option<Decimal> {
    rate.and_then(|rate| amount.checked_mul(rate))
}

/// Subtraction where either unknown operand makes the result unknown.
pub fn checked_sub_opt(lhs: Option<Decimal>, rhs: Option<Decimal>) -> Option<Decimal> {
    lhs?.checked_sub(rhs?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_token_amount_shifts_decimals() {
        assert_eq!(
            calc_token_amount(1_500_000, 6).unwrap(),
            Decimal::from_str("1.5").unwrap()
        );
        assert_eq!(
            calc_token_amount(1, 18).unwrap(),
            Decimal::from_str("0.000000000000000001").unwrap()
        );
        assert_eq!(calc_token_amount(42, 0).unwrap(), Decimal::from(42));
        assert_eq!(calc_token_amount(0, 18).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_calc_token_amount_large_values() {
        // u128::MAX has 39 digits, 21 integer digits remain after shifting by 18
        let amount = calc_token_amount(u128::MAX, 18).unwrap();
        assert_eq!(amount.trunc().to_string(), "340282366920938463463");
        assert!(calc_token_amount(u128::MAX, 0).is_err());
    }

    #[test]
    fn test_parse_base_units_rejects_garbage() {
        assert_eq!(parse_base_units("1000").unwrap(), 1000);
        assert!(parse_base_units("").is_err());
        assert!(parse_base_units("-1").is_err());
        assert!(parse_base_units("1.5").is_err());
        assert!(parse_base_units("0x10").is_err());
        assert!(parse_base_units("1000000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn test_unknown_rate_propagates() {
        assert_eq!(to_fiat(Decimal::ONE, None), None);
        assert_eq!(checked_sub_opt(Some(Decimal::ONE), None), None);
        assert_eq!(checked_sub_opt(None, Some(Decimal::ONE)), None);
        assert_eq!(
            checked_sub_opt(Some(Decimal::TEN), Some(Decimal::ONE)),
            Some(Decimal::from(9))
        );
    }
}
