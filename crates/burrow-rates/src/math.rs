//! # Decimal Math
//!
//! Natural logarithm and exponential over [`BigDecimal`] at a caller-chosen
//! working precision, plus the rounding and formatting helpers every other
//! module funnels its results through.
//!
//! ## Method
//!
//! - `ln(x)`: split off the decimal exponent (`x = m * 10^k`, `m` in
//!   `[1, 10)`) unless `x` is already in `[0.1, 10)`, bring `m` into
//!   `[0.5, 2)` by powers of two, then `ln(m) = 2 * atanh((m - 1) / (m + 1))`
//!   with `|z| <= 1/3`. Cost does not grow with the size of `k`.
//! - `exp(y)`: halve `y` until `|y| <= 0.5`, sum the Taylor series, square back.
//!
//! Every partial result is cut back to the working precision, so repeated
//! calls never accumulate digits.

use crate::error::{RateError, Result};
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};
use std::str::FromStr;

/// Floor on significant digits carried through rate calculations
pub const MIN_WORKING_PRECISION: u64 = 35;

/// Default significant digits carried through rate calculations
pub const DEFAULT_WORKING_PRECISION: u64 = 50;

/// Ceiling on working precision; `BigDecimal` division keeps 100 digits
pub const MAX_WORKING_PRECISION: u64 = 90;

/// Extra digits carried inside the series
const GUARD_DIGITS: u64 = 10;

/// Hard stop for series evaluation
const MAX_SERIES_TERMS: u64 = 10_000;

/// Reject a working precision outside the supported range
pub fn check_precision(precision: u64) -> Result<u64> {
    if !(MIN_WORKING_PRECISION..=MAX_WORKING_PRECISION).contains(&precision) {
        return Err(RateError::InvalidConfig(format!(
            "working precision {} outside {}..={}",
            precision, MIN_WORKING_PRECISION, MAX_WORKING_PRECISION
        )));
    }
    Ok(precision)
}

/// Parse a decimal string, naming the quantity in the error
pub fn parse_decimal(what: &str, value: &str) -> Result<BigDecimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RateError::not_a_decimal(what, value));
    }
    BigDecimal::from_str(trimmed).map_err(|_| RateError::not_a_decimal(what, value))
}

/// `10^exponent` as an exact decimal
pub fn pow10(exponent: i64) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -exponent)
}

/// `k` such that `10^k <= |x| < 10^(k+1)`; 0 for zero
pub fn decimal_exponent(x: &BigDecimal) -> i64 {
    if x.is_zero() {
        return 0;
    }
    let (_, scale) = x.as_bigint_and_exponent();
    x.digits() as i64 - 1 - scale
}

fn epsilon(digits: u64) -> BigDecimal {
    pow10(-(digits as i64))
}

fn half() -> BigDecimal {
    BigDecimal::new(BigInt::from(5), 1)
}

/// `atanh(z)` for `|z| <= 1/3`
fn atanh_series(z: &BigDecimal, wp: u64) -> BigDecimal {
    let z2 = (z * z).with_prec(wp);
    let eps = epsilon(wp);

    let mut power = z.clone();
    let mut sum = BigDecimal::zero();
    let mut denom: u64 = 1;

    for _ in 0..MAX_SERIES_TERMS {
        let term = (&power / BigDecimal::from(denom)).with_prec(wp);
        if term.abs() < eps {
            break;
        }
        sum += term;
        power = (&power * &z2).with_prec(wp);
        denom += 2;
    }

    sum.with_prec(wp)
}

fn ln2(wp: u64) -> BigDecimal {
    let third = (BigDecimal::one() / BigDecimal::from(3)).with_prec(wp);
    atanh_series(&third, wp) * BigDecimal::from(2)
}

/// `ln(10) = 3 ln(2) + 2 atanh(1/9)`
pub fn ln10(precision: u64) -> BigDecimal {
    let wp = precision + GUARD_DIGITS;
    let ninth = (BigDecimal::one() / BigDecimal::from(9)).with_prec(wp);
    let result = ln2(wp) * BigDecimal::from(3) + atanh_series(&ninth, wp) * BigDecimal::from(2);
    result.with_prec(precision)
}

/// Natural logarithm of a strictly positive decimal
pub fn ln(x: &BigDecimal, precision: u64) -> Result<BigDecimal> {
    if x.sign() != Sign::Plus {
        return Err(RateError::InvalidInput(format!(
            "logarithm of non-positive value {}",
            x
        )));
    }

    let wp = precision + GUARD_DIGITS;
    let two = BigDecimal::from(2);
    let half = half();

    let rounded = x.with_prec(wp);
    let exp10 = decimal_exponent(&rounded);
    // in [0.1, 10) splitting off 10^k would cancel against ln(m) near one
    let (mut mantissa, decimal_exp) = if exp10 == 0 || exp10 == -1 {
        (rounded, 0)
    } else {
        let (digits, _) = rounded.as_bigint_and_exponent();
        (BigDecimal::new(digits, rounded.digits() as i64 - 1), exp10)
    };

    let mut exponent: i64 = 0;
    while mantissa >= two {
        mantissa = (&mantissa * &half).with_prec(wp);
        exponent += 1;
    }
    while mantissa < half {
        mantissa = (&mantissa * &two).with_prec(wp);
        exponent -= 1;
    }

    let z = ((&mantissa - BigDecimal::one()) / (&mantissa + BigDecimal::one())).with_prec(wp);
    let mut result = atanh_series(&z, wp) * BigDecimal::from(2);
    if exponent != 0 {
        result += ln2(wp) * BigDecimal::from(exponent);
    }
    if decimal_exp != 0 {
        // k * ln(10) needs as many extra digits as k has
        let extra = decimal_exp.unsigned_abs().to_string().len() as u64;
        result += ln10(wp + extra) * BigDecimal::from(decimal_exp);
    }

    Ok(result.with_prec(precision))
}

/// Natural exponential
pub fn exp(y: &BigDecimal, precision: u64) -> BigDecimal {
    let wp = precision + GUARD_DIGITS;
    let half = half();
    let eps = epsilon(wp);

    let mut reduced = y.with_prec(wp);
    let mut squarings: u32 = 0;
    while reduced.abs() > half {
        reduced = (&reduced * &half).with_prec(wp);
        squarings += 1;
    }

    let mut sum = BigDecimal::one();
    let mut term = BigDecimal::one();
    for n in 1..MAX_SERIES_TERMS {
        term = (&term * &reduced / BigDecimal::from(n)).with_prec(wp);
        if term.abs() < eps {
            break;
        }
        sum += term.clone();
    }

    for _ in 0..squarings {
        sum = (&sum * &sum).with_prec(wp);
    }

    sum.with_prec(precision)
}

/// Round half away from zero to `places` decimal places
pub fn round_half_up(value: &BigDecimal, places: i64) -> BigDecimal {
    value.with_scale_round(places, RoundingMode::HalfUp)
}

/// Round half away from zero to an integer
pub fn to_integer(value: &BigDecimal) -> BigInt {
    let (digits, _) = value
        .with_scale_round(0, RoundingMode::HalfUp)
        .as_bigint_and_exponent();
    digits
}

/// Plain (never scientific) notation with exactly `places` decimals
pub fn format_fixed(value: &BigDecimal, places: u32) -> String {
    let (digits, _) = round_half_up(value, places as i64).as_bigint_and_exponent();
    let mut text = digits.magnitude().to_string();

    let places = places as usize;
    if places > 0 {
        if text.len() <= places {
            text = format!("{}{}", "0".repeat(places + 1 - text.len()), text);
        }
        text.insert(text.len() - places, '.');
    }

    if digits.sign() == Sign::Minus {
        format!("-{}", text)
    } else {
        text
    }
}
