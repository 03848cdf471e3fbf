//! # Interest Rate Curve
//!
//! Each market's borrow rate is a piecewise-linear function of pool
//! utilization, interpolated in fixed-point rate space:
//!
//! | Utilization | Borrow rate |
//! |-------------|-------------|
//! | 0 % | `10^27` (no interest) |
//! | target | `target_utilization_rate` |
//! | 100 % and above | `max_utilization_rate` |
//!
//! Suppliers earn the borrow APR scaled by utilization, minus the reserve cut.

use crate::constants::{BASIS_POINTS, RATE_DECIMALS};
use crate::error::{RateError, Result};
use crate::math::{self, format_fixed};
use crate::rate::{FixedPointRate, RateConverter};
use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Market rate model parameters, as configured on-chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRateModel {
    /// Kink position, basis points
    pub target_utilization_bps: u32,

    /// Per-period rate at the kink
    pub target_utilization_rate: FixedPointRate,

    /// Per-period rate at full utilization
    pub max_utilization_rate: FixedPointRate,

    /// Share of borrow interest kept by the protocol, basis points
    pub reserve_ratio_bps: u32,
}

/// One sample of the utilization curve, percentages to 2 decimals
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub percent: u32,
    pub borrow_rate: String,
    pub supply_rate: String,
}

fn bps(value: u32) -> BigDecimal {
    BigDecimal::from(value) / BigDecimal::from(BASIS_POINTS)
}

impl InterestRateModel {
    /// Check parameter domains
    pub fn validate(&self) -> Result<()> {
        if self.target_utilization_bps == 0 || self.target_utilization_bps >= BASIS_POINTS {
            return Err(RateError::InvalidConfig(format!(
                "target utilization must be within (0, {}) bps, got {}",
                BASIS_POINTS, self.target_utilization_bps
            )));
        }
        if self.reserve_ratio_bps > BASIS_POINTS {
            return Err(RateError::InvalidConfig(format!(
                "reserve ratio must be at most {} bps, got {}",
                BASIS_POINTS, self.reserve_ratio_bps
            )));
        }
        if self.target_utilization_rate < FixedPointRate::one() {
            return Err(RateError::InvalidConfig(format!(
                "target utilization rate {} is below one",
                self.target_utilization_rate
            )));
        }
        if self.max_utilization_rate < self.target_utilization_rate {
            return Err(RateError::InvalidConfig(format!(
                "max utilization rate {} is below target rate {}",
                self.max_utilization_rate, self.target_utilization_rate
            )));
        }
        Ok(())
    }

    /// Per-period borrow rate at `utilization` (a fraction, 1 = 100 %)
    pub fn borrow_rate(&self, utilization: &BigDecimal) -> Result<FixedPointRate> {
        self.validate()?;
        if *utilization < BigDecimal::zero() {
            return Err(RateError::InvalidInput(format!(
                "utilization must not be negative: {}",
                utilization
            )));
        }

        let one = BigDecimal::one();
        let base = FixedPointRate::one().growth_factor();
        let target = bps(self.target_utilization_bps);
        let target_rate = self.target_utilization_rate.growth_factor();
        let max_rate = self.max_utilization_rate.growth_factor();

        let growth = if *utilization >= one {
            max_rate
        } else if *utilization <= target {
            &base + (&target_rate - &base) * utilization / &target
        } else {
            &target_rate + (&max_rate - &target_rate) * (utilization - &target) / (&one - &target)
        };

        FixedPointRate::from_raw(math::to_integer(
            &(growth * math::pow10(RATE_DECIMALS as i64)),
        ))
    }

    /// Borrow APR at `utilization`, unrounded percent
    pub fn borrow_apr(
        &self,
        converter: &RateConverter,
        utilization: &BigDecimal,
    ) -> Result<BigDecimal> {
        converter.annual_percentage(&self.borrow_rate(utilization)?)
    }

    /// Supply APR at `utilization`, unrounded percent
    pub fn supply_apr(
        &self,
        converter: &RateConverter,
        utilization: &BigDecimal,
    ) -> Result<BigDecimal> {
        let borrow = self.borrow_apr(converter, utilization)?;
        Ok(self.supply_from_borrow(&borrow, utilization))
    }

    fn supply_from_borrow(&self, borrow_apr: &BigDecimal, utilization: &BigDecimal) -> BigDecimal {
        let kept = BigDecimal::one() - bps(self.reserve_ratio_bps);
        let capped = if *utilization > BigDecimal::one() {
            BigDecimal::one()
        } else {
            utilization.clone()
        };
        borrow_apr * capped * kept
    }

    /// Sample the curve from 0 % to 100 % every `step_percent`
    pub fn curve(&self, converter: &RateConverter, step_percent: u32) -> Result<Vec<CurvePoint>> {
        if step_percent == 0 || step_percent > 100 {
            return Err(RateError::InvalidInput(format!(
                "curve step must be within 1..=100, got {}",
                step_percent
            )));
        }

        let mut points = Vec::with_capacity((100 / step_percent + 2) as usize);
        let mut percent = 0;
        loop {
            let utilization = BigDecimal::from(percent) / BigDecimal::from(100);
            let borrow = self.borrow_apr(converter, &utilization)?;
            let supply = self.supply_from_borrow(&borrow, &utilization);
            points.push(CurvePoint {
                percent,
                borrow_rate: format_fixed(&borrow, 2),
                supply_rate: format_fixed(&supply, 2),
            });

            if percent == 100 {
                break;
            }
            percent = (percent + step_percent).min(100);
        }

        tracing::debug!(points = points.len(), step_percent, "sampled rate curve");
        Ok(points)
    }
}

/// Borrowed share of supplied liquidity, zero for an empty market
pub fn utilization(total_supplied: &BigDecimal, total_borrowed: &BigDecimal) -> BigDecimal {
    if total_supplied.is_zero() {
        return BigDecimal::zero();
    }
    total_borrowed / total_supplied
}
