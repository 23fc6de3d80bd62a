//! Conversion of native odds formats to decimal odds.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::error::OddsFormatError;

/// American moneyline price to decimal odds (`+150` → 2.5, `-110` → 1.9090…).
pub fn american_to_decimal(price: Decimal) -> Result<Decimal, OddsFormatError> {
    if price.abs() < dec!(100) {
        return Err(OddsFormatError::OutOfRange(price.to_string()));
    }
    let odd = if price.is_sign_positive() {
        price / dec!(100) + Decimal::ONE
    } else {
        dec!(100) / price.abs() + Decimal::ONE
    };
    Ok(odd)
}

/// Fractional price ("17/20") to decimal odds (1.85).
pub fn fractional_to_decimal(text: &str) -> Result<Decimal, OddsFormatError> {
    let (num, den) = text
        .split_once('/')
        .ok_or_else(|| OddsFormatError::Malformed(text.to_string()))?;
    let num = parse_plain(num).ok_or_else(|| OddsFormatError::Malformed(text.to_string()))?;
    let den = parse_plain(den).ok_or_else(|| OddsFormatError::Malformed(text.to_string()))?;
    if num <= Decimal::ZERO {
        return Err(OddsFormatError::OutOfRange(text.to_string()));
    }
    num.checked_div(den)
        .filter(|ratio| *ratio > Decimal::ZERO)
        .map(|ratio| ratio + Decimal::ONE)
        .ok_or_else(|| OddsFormatError::OutOfRange(text.to_string()))
}

/// Parse an odd written in any supported native format.
///
/// - contains `/` → fractional;
/// - signed with magnitude ≥ 100 → American;
/// - otherwise decimal, accepting a decimal comma ("1,85").
pub fn parse_odd(text: &str) -> Result<Decimal, OddsFormatError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(OddsFormatError::Empty);
    }
    if text.contains('/') {
        return fractional_to_decimal(text);
    }

    let value = parse_plain(&text.replace(',', "."))
        .ok_or_else(|| OddsFormatError::Malformed(text.to_string()))?;

    let signed = text.starts_with('+') || text.starts_with('-');
    let odd = if signed && value.abs() >= dec!(100) {
        american_to_decimal(value)?
    } else {
        value
    };

    if odd <= Decimal::ONE {
        return Err(OddsFormatError::OutOfRange(text.to_string()));
    }
    Ok(odd)
}

fn parse_plain(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text.strip_prefix('+').unwrap_or(text)).ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NativeOdd {
    Text(String),
    Number(f64),
    Other(IgnoredAny),
}

/// Serde adapter accepting a JSON number or a native odds string.
///
/// An unusable value deserializes as zero so that only its own record is
/// later excluded as an invalid odd; the rest of the snapshot still loads.
pub fn deserialize_odd<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let odd = match NativeOdd::deserialize(deserializer)? {
        NativeOdd::Text(text) => parse_odd(&text).map_err(|e| e.to_string()),
        NativeOdd::Number(value) => Decimal::from_str(&value.to_string()).map_err(|e| e.to_string()),
        NativeOdd::Other(_) => Err("odd is neither a number nor a string".to_string()),
    };

    Ok(odd.unwrap_or_else(|error| {
        warn!(%error, "Unusable odd");
        Decimal::ZERO
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn american_prices_convert() {
        assert_eq!(american_to_decimal(dec!(150)).unwrap(), dec!(2.5));
        assert_eq!(american_to_decimal(dec!(-200)).unwrap(), dec!(1.5));
        assert_eq!(american_to_decimal(dec!(-110)).unwrap().round_dp(4), dec!(1.9091));
        assert!(american_to_decimal(dec!(50)).is_err());
    }

    #[test]
    fn fractional_prices_convert() {
        assert_eq!(fractional_to_decimal("17/20").unwrap(), dec!(1.85));
        assert_eq!(fractional_to_decimal("5/2").unwrap(), dec!(3.5));
        assert!(matches!(fractional_to_decimal("1/0"), Err(OddsFormatError::OutOfRange(_))));
        assert!(matches!(fractional_to_decimal("a/b"), Err(OddsFormatError::Malformed(_))));
    }

    #[test]
    fn parse_odd_dispatches_on_format() {
        assert_eq!(parse_odd("1,85").unwrap(), dec!(1.85));
        assert_eq!(parse_odd(" 2.10 ").unwrap(), dec!(2.10));
        assert_eq!(parse_odd("+120").unwrap(), dec!(2.2));
        assert_eq!(parse_odd("4/5").unwrap(), dec!(1.8));
    }

    #[test]
    fn parse_odd_rejects_unusable_values() {
        assert_eq!(parse_odd("  "), Err(OddsFormatError::Empty));
        assert!(matches!(parse_odd("1.00"), Err(OddsFormatError::OutOfRange(_))));
        assert!(matches!(parse_odd("SP"), Err(OddsFormatError::Malformed(_))));
    }
}
