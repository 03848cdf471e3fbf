//! # Reward Boosting
//!
//! Staking the protocol's boosting token raises a user's reward multiplier.
//! The curve that maps staked amount to multiplier is protocol policy, so it
//! sits behind [`BoostEngine`] and reward estimators take it as a parameter.
//!
//! ## Engines
//!
//! - [`FarmSnapshotBooster`]: trusts the multiplier and shares already
//!   recorded in the farm state.
//! - [`LogBooster`]: `multiplier = 1 + ln(stake) / ln(log_base)`, never
//!   below 1, with the user's boosted shares re-weighted inside the pool.
//!
//! Any `Fn(&BoostRequest) -> Result<BoostedShares>` is an engine too.

use crate::error::Result;
use crate::math::{self, DEFAULT_WORKING_PRECISION};
use crate::position::{AssetPosition, RewardSide};
use crate::units::shrink_token;
use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Staked amounts of the boosting token, raw units
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StakingBoost {
    #[serde(default)]
    pub base_staked_amount: BigDecimal,

    #[serde(default)]
    pub extra_staked_amount: BigDecimal,
}

impl StakingBoost {
    pub fn new(base_staked_amount: BigDecimal, extra_staked_amount: BigDecimal) -> Self {
        Self {
            base_staked_amount,
            extra_staked_amount,
        }
    }

    /// Linear sum of both stakes; both are already in the same unit
    pub fn effective_boost(&self) -> BigDecimal {
        &self.base_staked_amount + &self.extra_staked_amount
    }
}

/// Snapshot of one reward farm from the user's point of view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardFarmState {
    /// User's current boost multiplier
    pub multiplier: BigDecimal,

    /// Boosted shares across the whole farm
    pub total_boosted_shares: BigDecimal,

    /// User's unboosted shares
    pub user_shares: BigDecimal,

    /// Farm emission per day, raw units of the reward token
    pub daily_reward_amount: BigDecimal,

    /// Decimals of the reward token
    pub reward_decimals: u8,

    /// USD price of one whole reward token
    pub reward_token_price_usd: BigDecimal,
}

impl RewardFarmState {
    /// Farm emission per day in whole reward tokens
    pub fn daily_reward_tokens(&self) -> BigDecimal {
        shrink_token(&self.daily_reward_amount, self.reward_decimals)
    }
}

/// Everything a booster engine may look at
#[derive(Clone, Copy, Debug)]
pub struct BoostRequest<'a> {
    pub side: RewardSide,
    pub position: &'a AssetPosition,
    pub farm: &'a RewardFarmState,
    /// Combined stake, raw units of the boosting token
    pub effective_boost: &'a BigDecimal,
    pub booster_decimals: u8,
}

/// Booster engine result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoostedShares {
    pub multiplier: BigDecimal,
    pub total_boosted_shares: BigDecimal,
    pub shares: BigDecimal,
    /// User's daily reward in whole tokens after apportionment
    pub new_daily_amount: BigDecimal,
}

/// Strategy computing a user's boosted share of a farm
pub trait BoostEngine {
    fn boosted_shares(&self, request: &BoostRequest<'_>) -> Result<BoostedShares>;
}

impl<F> BoostEngine for F
where
    F: Fn(&BoostRequest<'_>) -> Result<BoostedShares>,
{
    fn boosted_shares(&self, request: &BoostRequest<'_>) -> Result<BoostedShares> {
        self(request)
    }
}

/// User's slice of the daily emission, zero for an empty pool
fn apportion(
    daily_tokens: &BigDecimal,
    user_boosted: &BigDecimal,
    total_boosted: &BigDecimal,
) -> BigDecimal {
    if total_boosted.is_zero() {
        return BigDecimal::zero();
    }
    daily_tokens * user_boosted / total_boosted
}

/// Uses the farm state's own multiplier and shares unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct FarmSnapshotBooster;

impl BoostEngine for FarmSnapshotBooster {
    fn boosted_shares(&self, request: &BoostRequest<'_>) -> Result<BoostedShares> {
        let farm = request.farm;
        let user_boosted = &farm.user_shares * &farm.multiplier;
        let new_daily_amount = apportion(
            &farm.daily_reward_tokens(),
            &user_boosted,
            &farm.total_boosted_shares,
        );

        Ok(BoostedShares {
            multiplier: farm.multiplier.clone(),
            total_boosted_shares: farm.total_boosted_shares.clone(),
            shares: farm.user_shares.clone(),
            new_daily_amount: new_daily_amount.with_prec(DEFAULT_WORKING_PRECISION),
        })
    }
}

/// Logarithmic boost curve
#[derive(Clone, Debug, PartialEq)]
pub struct LogBooster {
    /// Log base in raw booster units
    log_base: BigDecimal,
    precision: u64,
}

impl LogBooster {
    pub fn new(log_base: BigDecimal) -> Self {
        Self {
            log_base,
            precision: DEFAULT_WORKING_PRECISION,
        }
    }

    /// Working precision, within the range the rate converter accepts
    pub fn with_precision(mut self, precision: u64) -> Result<Self> {
        self.precision = math::check_precision(precision)?;
        Ok(self)
    }

    /// Multiplier for a raw stake
    pub fn multiplier(
        &self,
        effective_boost: &BigDecimal,
        booster_decimals: u8,
    ) -> Result<BigDecimal> {
        let one = BigDecimal::one();
        let stake = shrink_token(effective_boost, booster_decimals);
        let base = shrink_token(&self.log_base, booster_decimals);

        if stake <= BigDecimal::zero() || base <= one {
            return Ok(one);
        }

        let ratio = (math::ln(&stake, self.precision)? / math::ln(&base, self.precision)?)
            .with_prec(self.precision);
        let boosted = one.clone() + ratio;
        Ok(if boosted < one { one } else { boosted })
    }
}

impl BoostEngine for LogBooster {
    fn boosted_shares(&self, request: &BoostRequest<'_>) -> Result<BoostedShares> {
        let farm = request.farm;
        let multiplier = self.multiplier(request.effective_boost, request.booster_decimals)?;

        let previous = &farm.user_shares * &farm.multiplier;
        let boosted = (&farm.user_shares * &multiplier).with_prec(self.precision);
        let mut total =
            (&farm.total_boosted_shares - previous + &boosted).with_prec(self.precision);
        if total < boosted {
            // stale snapshot: the pool cannot hold less than this user's boost
            total = boosted.clone();
        }

        let new_daily_amount =
            apportion(&farm.daily_reward_tokens(), &boosted, &total).with_prec(self.precision);

        tracing::debug!(
            asset = %request.position.asset_id,
            side = ?request.side,
            multiplier = %multiplier,
            total_boosted_shares = %total,
            "log boost applied"
        );

        Ok(BoostedShares {
            multiplier,
            total_boosted_shares: total,
            shares: farm.user_shares.clone(),
            new_daily_amount,
        })
    }
}
