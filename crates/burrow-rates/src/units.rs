//! Raw on-chain amounts versus human-facing token units and USD prices

use crate::error::{RateError, Result};
use crate::math::pow10;
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;

/// Decimal places carried by oracle price multipliers
pub const ORACLE_PRICE_DECIMALS: u8 = 4;

/// Raw integer units to whole tokens (`raw / 10^decimals`), exact
pub fn shrink_token(raw: &BigDecimal, decimals: u8) -> BigDecimal {
    raw * pow10(-(decimals as i64))
}

/// Whole tokens to raw integer units, truncating sub-unit dust
pub fn expand_token(amount: &BigDecimal, decimals: u8) -> BigInt {
    let (digits, _) = (amount * pow10(decimals as i64))
        .with_scale_round(0, RoundingMode::Down)
        .as_bigint_and_exponent();
    digits
}

/// USD price from an oracle multiplier
pub fn usd_price_from_multiplier(multiplier: &BigDecimal) -> BigDecimal {
    shrink_token(multiplier, ORACLE_PRICE_DECIMALS)
}

/// Decimals of an asset balance: token metadata decimals plus the
/// protocol's extra decimals for that asset
pub fn total_decimals(metadata_decimals: u8, extra_decimals: u8) -> Result<u8> {
    metadata_decimals.checked_add(extra_decimals).ok_or_else(|| {
        RateError::InvalidInput(format!(
            "asset decimals overflow: {} + {} extra",
            metadata_decimals, extra_decimals
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_shrink_token() {
        assert_eq!(shrink_token(&dec("1500000"), 6), dec("1.5"));
        assert_eq!(shrink_token(&dec("1"), 24), dec("0.000000000000000000000001"));
        assert_eq!(shrink_token(&dec("42"), 0), dec("42"));
    }

    #[test]
    fn test_expand_token_truncates() {
        assert_eq!(expand_token(&dec("1.5"), 6), BigInt::from(1_500_000));
        assert_eq!(expand_token(&dec("0.0000019"), 6), BigInt::from(1));
    }

    #[test]
    fn test_oracle_price() {
        assert_eq!(usd_price_from_multiplier(&dec("10001")), dec("1.0001"));
        assert_eq!(usd_price_from_multiplier(&dec("0")), dec("0"));
    }

    #[test]
    fn test_total_decimals() {
        assert_eq!(total_decimals(6, 12).unwrap(), 18);
        assert_eq!(total_decimals(245, 10).unwrap(), u8::MAX);
        assert!(matches!(total_decimals(250, 10), Err(RateError::InvalidInput(_))));
    }
}
