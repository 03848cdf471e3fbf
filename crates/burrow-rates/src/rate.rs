//! # Rate Conversion
//!
//! Converts between the protocol's fixed-point per-period growth factor and
//! the annual percentage shown to users.
//!
//! ```text
//! apr -> rate:  round((1 + apr/100) ^ (1/N) * 10^27)
//! rate -> apr:  100 * ((rate / 10^27) ^ N - 1),  2 decimals
//! ```
//!
//! `N` is [`PERIODS_PER_YEAR`] unless overridden. With `N ~ 3e16` the
//! per-period growth differs from one in the 18th digit, far below what an
//! `f64` can carry through the power, so both directions run in
//! [`BigDecimal`] at the converter's working precision.
//!
//! A rate that grows more than `10^MAX_YEARLY_GROWTH_DIGITS`-fold in a year
//! has no printable APR and is rejected; one that shrinks by more than that
//! annualizes to -100%.

use crate::constants::{PERIODS_PER_YEAR, RATE_DECIMALS};
use crate::error::{RateError, Result};
use crate::math::{self, DEFAULT_WORKING_PRECISION};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal orders of magnitude a rate may grow by in one year
pub const MAX_YEARLY_GROWTH_DIGITS: u32 = 30;

/// Per-period growth factor scaled by 10^27
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixedPointRate(BigInt);

impl FixedPointRate {
    /// Growth factor of exactly one (zero interest)
    pub fn one() -> Self {
        Self(BigInt::from(10u8).pow(RATE_DECIMALS))
    }

    /// Wrap a raw scaled integer, rejecting negatives
    pub fn from_raw(raw: BigInt) -> Result<Self> {
        if raw.sign() == Sign::Minus {
            return Err(RateError::InvalidInput(format!("rate must not be negative: {}", raw)));
        }
        Ok(Self(raw))
    }

    /// Raw scaled integer
    pub fn raw(&self) -> &BigInt {
        &self.0
    }

    /// Unscaled growth factor (`raw / 10^27`), exact
    pub fn growth_factor(&self) -> BigDecimal {
        BigDecimal::new(self.0.clone(), RATE_DECIMALS as i64)
    }
}

impl fmt::Display for FixedPointRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FixedPointRate {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let raw = BigInt::from_str(trimmed)
            .map_err(|_| RateError::InvalidInput(format!("rate is not an integer: {:?}", s)))?;
        Self::from_raw(raw)
    }
}

impl TryFrom<String> for FixedPointRate {
    type Error = RateError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FixedPointRate> for String {
    fn from(rate: FixedPointRate) -> Self {
        rate.0.to_string()
    }
}

/// Converter between APR strings and fixed-point rates
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateConverter {
    periods_per_year: u64,
    precision: u64,
}

impl Default for RateConverter {
    fn default() -> Self {
        Self {
            periods_per_year: PERIODS_PER_YEAR,
            precision: DEFAULT_WORKING_PRECISION,
        }
    }
}

impl RateConverter {
    /// Create a converter for a custom period count and working precision
    pub fn new(periods_per_year: u64, precision: u64) -> Result<Self> {
        if periods_per_year == 0 {
            return Err(RateError::InvalidConfig("periods_per_year must be positive".into()));
        }
        Ok(Self {
            periods_per_year,
            precision: math::check_precision(precision)?,
        })
    }

    pub fn periods_per_year(&self) -> u64 {
        self.periods_per_year
    }

    pub fn precision(&self) -> u64 {
        self.precision
    }

    /// Nominal annual percentage to per-period fixed-point rate
    pub fn apr_to_rate(&self, apr: &str) -> Result<FixedPointRate> {
        let apr = math::parse_decimal("APR", apr)?;
        self.apr_decimal_to_rate(&apr)
    }

    pub(crate) fn apr_decimal_to_rate(&self, apr: &BigDecimal) -> Result<FixedPointRate> {
        let ratio = (apr / BigDecimal::from(100)).with_prec(self.precision);
        // ratio <= -1, decided on the exponent so huge inputs are never rescaled
        if ratio.sign() == Sign::Minus && math::decimal_exponent(&ratio) >= 0 {
            return Err(RateError::InvalidInput(format!(
                "APR must be greater than -100, got {}",
                apr
            )));
        }

        // past the working precision the leading 1 cannot change the base
        let base = if math::decimal_exponent(&ratio) > self.precision as i64 {
            ratio
        } else {
            (BigDecimal::one() + ratio).with_prec(self.precision)
        };
        let log_per_period =
            (math::ln(&base, self.precision)? / BigDecimal::from(self.periods_per_year))
                .with_prec(self.precision);
        let growth = math::exp(&log_per_period, self.precision);

        tracing::trace!(apr = %apr, growth = %growth, "per-period growth");

        let scaled = growth * math::pow10(RATE_DECIMALS as i64);
        FixedPointRate::from_raw(math::to_integer(&scaled))
    }

    /// Per-period fixed-point rate to annual percentage, 2 decimals
    pub fn rate_to_apr(&self, rate: &str) -> Result<String> {
        let rate = math::parse_decimal("rate", rate)?;
        let apr = self.rate_decimal_to_apr(&rate)?;
        Ok(math::format_fixed(&apr, 2))
    }

    /// Annual percentage for an already-parsed rate, unrounded
    pub fn annual_percentage(&self, rate: &FixedPointRate) -> Result<BigDecimal> {
        self.rate_decimal_to_apr(&BigDecimal::from(rate.raw().clone()))
    }

    fn rate_decimal_to_apr(&self, rate: &BigDecimal) -> Result<BigDecimal> {
        if rate.sign() == Sign::Minus {
            return Err(RateError::InvalidInput(format!("rate must not be negative: {}", rate)));
        }

        let hundred = BigDecimal::from(100);
        if rate.is_zero() {
            return Ok(-hundred);
        }

        let growth = rate * math::pow10(-(RATE_DECIMALS as i64));
        let log_per_year = (math::ln(&growth, self.precision)?
            * BigDecimal::from(self.periods_per_year))
        .with_prec(self.precision);

        let limit = math::ln10(self.precision) * BigDecimal::from(MAX_YEARLY_GROWTH_DIGITS);
        if log_per_year > limit {
            return Err(RateError::InvalidInput(format!("rate {} overflows the APR range", rate)));
        }
        if log_per_year < -limit {
            tracing::trace!(rate = %rate, "rate annualizes below the APR floor");
            return Ok(-hundred);
        }
        let yearly = math::exp(&log_per_year, self.precision);

        let apr = (hundred.clone() * yearly - hundred).with_prec(self.precision);
        tracing::trace!(rate = %rate, apr = %apr, "annualized rate");
        Ok(apr)
    }
}

/// [`RateConverter::apr_to_rate`] with protocol defaults, as a decimal string
pub fn apr_to_rate(apr: &str) -> Result<String> {
    RateConverter::default().apr_to_rate(apr).map(String::from)
}

/// [`RateConverter::rate_to_apr`] with protocol defaults
pub fn rate_to_apr(rate: &str) -> Result<String> {
    RateConverter::default().rate_to_apr(rate)
}
