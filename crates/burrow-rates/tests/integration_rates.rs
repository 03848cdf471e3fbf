//! Integration tests for rate conversion
//!
//! These tests verify the APR <-> fixed-point rate conversion end to end,
//! including the round trip, the zero-interest identity and monotonicity.

use bigdecimal::BigDecimal;
use burrow_rates::{apr_to_rate, rate_to_apr, FixedPointRate, RateConverter, RateError};
use proptest::prelude::*;
use std::str::FromStr;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

mod round_trip_tests {
    use super::*;

    #[test]
    fn test_representative_aprs_round_trip() {
        for apr in ["0", "0.01", "5", "25", "100", "500"] {
            let rate = apr_to_rate(apr).unwrap();
            let back = rate_to_apr(&rate).unwrap();

            let diff = (dec(&back) - dec(apr)).abs();
            assert!(diff <= dec("0.01"), "apr {} came back as {}", apr, back);
        }
    }

    #[test]
    fn test_five_percent_exact() {
        let rate = apr_to_rate("5").unwrap();
        assert_eq!(rate, "1000000000000000001547125957");
        assert_eq!(rate_to_apr(&rate).unwrap(), "5.00");
    }

    #[test]
    fn test_identity() {
        assert_eq!(apr_to_rate("0").unwrap(), "1000000000000000000000000000");
        assert_eq!(rate_to_apr("1000000000000000000000000000").unwrap(), "0.00");
    }

    #[test]
    fn test_minimum_precision_still_round_trips() {
        let converter = RateConverter::new(burrow_rates::PERIODS_PER_YEAR, 35).unwrap();
        let rate = converter.apr_to_rate("25").unwrap();
        assert_eq!(converter.rate_to_apr(&rate.to_string()).unwrap(), "25.00");
    }
}

mod monotonicity_tests {
    use super::*;

    #[test]
    fn test_strictly_increasing_grid() {
        let grid = ["-99", "-50", "-1", "0", "0.01", "1", "5", "25", "100", "500", "10000"];
        let rates: Vec<FixedPointRate> = grid
            .iter()
            .map(|apr| apr_to_rate(apr).unwrap().parse().unwrap())
            .collect();

        for (pair, aprs) in rates.windows(2).zip(grid.windows(2)) {
            assert!(pair[0] < pair[1], "rate({}) >= rate({})", aprs[0], aprs[1]);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_increasing_in_apr(low in 0u32..50_000, gap in 1u32..5_000) {
            // hundredths of a percent
            let a = BigDecimal::new(low.into(), 2).to_string();
            let b = BigDecimal::new((low + gap).into(), 2).to_string();

            let ra: FixedPointRate = apr_to_rate(&a).unwrap().parse().unwrap();
            let rb: FixedPointRate = apr_to_rate(&b).unwrap().parse().unwrap();
            prop_assert!(ra < rb);
        }

        #[test]
        fn prop_round_trip_within_tolerance(hundredths in 0u32..100_000) {
            let apr = BigDecimal::new(hundredths.into(), 2);
            let rate = apr_to_rate(&apr.to_string()).unwrap();
            let back = dec(&rate_to_apr(&rate).unwrap());
            prop_assert!((back - apr).abs() <= dec("0.01"));
        }
    }
}

mod bounded_cost_tests {
    use super::*;

    #[test]
    fn test_huge_apr_exponent_converts() {
        // the decimal exponent is split off, not walked one power of two at a time
        let rate: FixedPointRate = apr_to_rate("1e2000000").unwrap().parse().unwrap();
        let million: FixedPointRate = apr_to_rate("1000000").unwrap().parse().unwrap();
        assert!(rate > million);
    }

    #[test]
    fn test_rates_far_above_unit_are_rejected() {
        for rate in [
            "1000000010000000000000000000",
            "1000000001000000000000000000",
            "1000000000000010000000000000",
        ] {
            assert!(
                matches!(rate_to_apr(rate), Err(RateError::InvalidInput(_))),
                "{} should not expand into an APR",
                rate
            );
        }
    }

    #[test]
    fn test_converted_huge_apr_does_not_expand_back() {
        let rate = apr_to_rate("1e2000000").unwrap();
        assert!(matches!(rate_to_apr(&rate), Err(RateError::InvalidInput(_))));
    }

    #[test]
    fn test_large_apr_within_range_round_trips() {
        let rate = apr_to_rate("1000000").unwrap();
        let back = dec(&rate_to_apr(&rate).unwrap());
        assert!((back - dec("1000000")).abs() <= dec("0.01"));
    }

    #[test]
    fn test_apr_output_length_is_bounded() {
        let widest = rate_to_apr("1000000000000002000000000000").unwrap();
        assert!(widest.len() < 40, "{}", widest);
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_rejects_apr_at_or_below_floor() {
        for apr in ["-150", "-100", "-100.5"] {
            assert!(
                matches!(apr_to_rate(apr), Err(RateError::InvalidInput(_))),
                "{} should be rejected",
                apr
            );
        }
        assert!(apr_to_rate("-99.99").is_ok());
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(matches!(apr_to_rate("5%"), Err(RateError::InvalidInput(_))));
        assert!(matches!(rate_to_apr("NaN"), Err(RateError::InvalidInput(_))));
        assert!(matches!(rate_to_apr("-1000"), Err(RateError::InvalidInput(_))));
    }

    #[test]
    fn test_error_codes_for_display() {
        let err = apr_to_rate("-150").unwrap_err();
        assert_eq!(err.code(), 2001);
    }
}
