//! # Reward APY
//!
//! Projects the yearly yield a farm position earns in reward tokens.
//!
//! ## Market APY
//!
//! ```text
//! apy = daily_tokens * price * 365 * multiplier
//!       / (total_deposits_usd * total_boosted_shares / shares) * 100
//! ```
//!
//! ## Staking APY
//!
//! ```text
//! apy = new_daily_amount * 365 * price / total_asset_usd * 100
//! ```
//!
//! A position with no shares, or a market or position worth nothing,
//! yields 0 rather than an error.

use crate::booster::{BoostEngine, BoostRequest, BoostedShares, RewardFarmState, StakingBoost};
use crate::constants::{DAYS_PER_YEAR, DEFAULT_BOOSTER_DECIMALS};
use crate::error::Result;
use crate::math::{self, DEFAULT_WORKING_PRECISION};
use crate::position::{AssetPosition, RewardSide};
use bigdecimal::BigDecimal;
use num_traits::Zero;

/// Inputs describing one user's stake in one farm
#[derive(Clone, Copy, Debug)]
pub struct FarmQuery<'a> {
    pub side: RewardSide,
    /// User's balance on `side`, priced
    pub position: &'a AssetPosition,
    pub farm: &'a RewardFarmState,
    pub boost: &'a StakingBoost,
}

/// Reward APY estimator over an injected booster engine
#[derive(Clone, Debug)]
pub struct RewardEstimator<B> {
    engine: B,
    booster_decimals: u8,
    precision: u64,
}

impl<B: BoostEngine> RewardEstimator<B> {
    pub fn new(engine: B) -> Self {
        Self {
            engine,
            booster_decimals: DEFAULT_BOOSTER_DECIMALS,
            precision: DEFAULT_WORKING_PRECISION,
        }
    }

    pub fn with_booster_decimals(mut self, booster_decimals: u8) -> Self {
        self.booster_decimals = booster_decimals;
        self
    }

    /// Working precision, within the range the rate converter accepts
    pub fn with_precision(mut self, precision: u64) -> Result<Self> {
        self.precision = math::check_precision(precision)?;
        Ok(self)
    }

    /// Run the booster engine for a query
    pub fn boosted_shares(&self, query: &FarmQuery<'_>) -> Result<BoostedShares> {
        let effective_boost = query.boost.effective_boost();
        let request = BoostRequest {
            side: query.side,
            position: query.position,
            farm: query.farm,
            effective_boost: &effective_boost,
            booster_decimals: self.booster_decimals,
        };
        self.engine.boosted_shares(&request)
    }

    /// APY of a farm against the market's aggregate USD deposits on the
    /// query's side (total supplied or total borrowed)
    pub fn compute_reward_apy(
        &self,
        query: &FarmQuery<'_>,
        total_deposits_usd: &BigDecimal,
    ) -> Result<BigDecimal> {
        let shares = self.boosted_shares(query)?;
        Ok(self.reward_apy_for_shares(query, &shares, total_deposits_usd))
    }

    /// [`compute_reward_apy`](Self::compute_reward_apy) over shares the
    /// engine already produced
    pub fn reward_apy_for_shares(
        &self,
        query: &FarmQuery<'_>,
        shares: &BoostedShares,
        total_deposits_usd: &BigDecimal,
    ) -> BigDecimal {
        if shares.shares.is_zero()
            || total_deposits_usd.is_zero()
            || shares.total_boosted_shares.is_zero()
        {
            tracing::debug!(
                asset = %query.position.asset_id,
                side = ?query.side,
                "no shares or deposits, reward APY is zero"
            );
            return BigDecimal::zero();
        }

        let p = self.precision;
        let daily_tokens = query.farm.daily_reward_tokens();
        let yearly_usd = (daily_tokens
            * &query.farm.reward_token_price_usd
            * BigDecimal::from(DAYS_PER_YEAR)
            * &shares.multiplier)
            .with_prec(p);
        let user_deposit_base =
            (total_deposits_usd * &shares.total_boosted_shares / &shares.shares).with_prec(p);

        let apy = (yearly_usd / user_deposit_base * BigDecimal::from(100)).with_prec(p);

        tracing::debug!(
            asset = %query.position.asset_id,
            side = ?query.side,
            multiplier = %shares.multiplier,
            apy = %apy,
            "reward APY"
        );
        apy
    }

    /// APY of the user's own apportioned daily reward against the USD value
    /// of their position
    pub fn compute_staking_reward_apy(&self, query: &FarmQuery<'_>) -> Result<BigDecimal> {
        if query.position.usd_value().is_zero() {
            return Ok(BigDecimal::zero());
        }

        let shares = self.boosted_shares(query)?;
        Ok(self.staking_apy_for_shares(query, &shares))
    }

    /// [`compute_staking_reward_apy`](Self::compute_staking_reward_apy) over
    /// shares the engine already produced
    pub fn staking_apy_for_shares(
        &self,
        query: &FarmQuery<'_>,
        shares: &BoostedShares,
    ) -> BigDecimal {
        staking_apy(
            &shares.new_daily_amount,
            &query.farm.reward_token_price_usd,
            &query.position.usd_value(),
            self.precision,
        )
    }
}

/// `new_daily_amount * 365 * price / total_asset_usd * 100`, zero for an
/// empty position
pub fn staking_apy(
    new_daily_amount: &BigDecimal,
    reward_token_price_usd: &BigDecimal,
    total_asset_usd: &BigDecimal,
    precision: u64,
) -> BigDecimal {
    if total_asset_usd.is_zero() {
        return BigDecimal::zero();
    }

    let yearly_usd = (new_daily_amount * BigDecimal::from(DAYS_PER_YEAR) * reward_token_price_usd)
        .with_prec(precision);
    (yearly_usd / total_asset_usd * BigDecimal::from(100)).with_prec(precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booster::{FarmSnapshotBooster, LogBooster};
    use crate::error::RateError;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn farm() -> RewardFarmState {
        RewardFarmState {
            multiplier: dec("1"),
            total_boosted_shares: dec("1000"),
            user_shares: dec("100"),
            // 10 reward tokens per day
            daily_reward_amount: dec("10000000000000000000"),
            reward_decimals: 18,
            reward_token_price_usd: dec("2"),
        }
    }

    #[test]
    fn test_staking_apy_example() {
        let apy = staking_apy(&dec("10"), &dec("2"), &dec("7300"), 50);
        assert_eq!(apy, dec("100"));
    }

    #[test]
    fn test_staking_apy_zero_position() {
        assert!(staking_apy(&dec("10"), &dec("2"), &BigDecimal::zero(), 50).is_zero());
    }

    #[test]
    fn test_compute_staking_reward_apy() {
        // 100 of 1000 shares -> 1 token/day of the farm's 10
        let farm = farm();
        let position = AssetPosition::new("wrap.near", dec("730"), 0, dec("1"));
        let boost = StakingBoost::default();
        let query = FarmQuery {
            side: RewardSide::Supplied,
            position: &position,
            farm: &farm,
            boost: &boost,
        };

        let estimator = RewardEstimator::new(FarmSnapshotBooster);
        // 1 * 365 * 2 / 730 * 100
        assert_eq!(estimator.compute_staking_reward_apy(&query).unwrap(), dec("100"));
    }

    #[test]
    fn test_compute_staking_reward_apy_empty_position() {
        let farm = farm();
        let position = AssetPosition::new("wrap.near", BigDecimal::zero(), 24, dec("3.2"));
        let boost = StakingBoost::default();
        let query = FarmQuery {
            side: RewardSide::Borrowed,
            position: &position,
            farm: &farm,
            boost: &boost,
        };

        let estimator = RewardEstimator::new(FarmSnapshotBooster);
        assert!(estimator.compute_staking_reward_apy(&query).unwrap().is_zero());
    }

    #[test]
    fn test_compute_reward_apy() {
        let farm = farm();
        let position = AssetPosition::new("wrap.near", dec("100"), 0, dec("1"));
        let boost = StakingBoost::default();
        let query = FarmQuery {
            side: RewardSide::Supplied,
            position: &position,
            farm: &farm,
            boost: &boost,
        };

        let estimator = RewardEstimator::new(FarmSnapshotBooster);
        // 10 * 2 * 365 * 1 / (73000 * 1000 / 100) * 100 = 1
        let apy = estimator.compute_reward_apy(&query, &dec("73000")).unwrap();
        assert_eq!(apy, dec("1"));
    }

    #[test]
    fn test_compute_reward_apy_zero_shares() {
        let mut farm = farm();
        farm.user_shares = BigDecimal::zero();
        let position = AssetPosition::new("wrap.near", BigDecimal::zero(), 0, dec("1"));
        let boost = StakingBoost::default();
        let query = FarmQuery {
            side: RewardSide::Supplied,
            position: &position,
            farm: &farm,
            boost: &boost,
        };

        let estimator = RewardEstimator::new(FarmSnapshotBooster);
        assert!(estimator.compute_reward_apy(&query, &dec("73000")).unwrap().is_zero());
    }

    #[test]
    fn test_compute_reward_apy_zero_deposits() {
        let farm = farm();
        let position = AssetPosition::new("wrap.near", dec("1"), 0, dec("1"));
        let boost = StakingBoost::default();
        let query = FarmQuery {
            side: RewardSide::Borrowed,
            position: &position,
            farm: &farm,
            boost: &boost,
        };

        let estimator = RewardEstimator::new(FarmSnapshotBooster);
        assert!(estimator.compute_reward_apy(&query, &BigDecimal::zero()).unwrap().is_zero());
    }

    #[test]
    fn test_boost_raises_reward_apy() {
        let farm = farm();
        let position = AssetPosition::new("wrap.near", dec("100"), 0, dec("1"));
        let deposits = dec("73000");
        let booster = LogBooster::new(dec("100000000000000000000"));
        let estimator = RewardEstimator::new(booster).with_booster_decimals(18);

        let unboosted = StakingBoost::default();
        let boosted = StakingBoost::new(dec("60000000000000000000"), dec("40000000000000000000"));

        let apy_for = |boost: &StakingBoost| {
            let query = FarmQuery {
                side: RewardSide::Supplied,
                position: &position,
                farm: &farm,
                boost,
            };
            estimator.compute_reward_apy(&query, &deposits).unwrap()
        };

        assert_eq!(apy_for(&unboosted), dec("1"));
        assert!(apy_for(&boosted) > dec("1"));
    }

    #[test]
    fn test_estimator_precision_bounds() {
        assert!(matches!(
            RewardEstimator::new(FarmSnapshotBooster).with_precision(0),
            Err(RateError::InvalidConfig(_))
        ));
        assert!(RewardEstimator::new(FarmSnapshotBooster).with_precision(1).is_err());
        assert!(RewardEstimator::new(FarmSnapshotBooster).with_precision(60).is_ok());
    }

    #[test]
    fn test_apy_from_precomputed_shares() {
        let farm = farm();
        let position = AssetPosition::new("wrap.near", dec("730"), 0, dec("1"));
        let boost = StakingBoost::default();
        let query = FarmQuery {
            side: RewardSide::Supplied,
            position: &position,
            farm: &farm,
            boost: &boost,
        };

        let estimator = RewardEstimator::new(FarmSnapshotBooster);
        let shares = estimator.boosted_shares(&query).unwrap();
        assert_eq!(
            estimator.reward_apy_for_shares(&query, &shares, &dec("73000")),
            estimator.compute_reward_apy(&query, &dec("73000")).unwrap()
        );
        assert_eq!(
            estimator.staking_apy_for_shares(&query, &shares),
            estimator.compute_staking_reward_apy(&query).unwrap()
        );
    }

    #[test]
    fn test_deterministic() {
        let farm = farm();
        let position = AssetPosition::new("wrap.near", dec("333"), 0, dec("1.7"));
        let boost = StakingBoost::new(dec("123456789"), dec("987654321"));
        let query = FarmQuery {
            side: RewardSide::Supplied,
            position: &position,
            farm: &farm,
            boost: &boost,
        };
        let booster = LogBooster::new(dec("100000000000000000000"));
        let estimator = RewardEstimator::new(booster).with_booster_decimals(18);

        let first = estimator.compute_reward_apy(&query, &dec("91234.5")).unwrap();
        let second = estimator.compute_reward_apy(&query, &dec("91234.5")).unwrap();
        assert_eq!(first.as_bigint_and_exponent(), second.as_bigint_and_exponent());

        let first = estimator.compute_staking_reward_apy(&query).unwrap();
        let second = estimator.compute_staking_reward_apy(&query).unwrap();
        assert_eq!(first.as_bigint_and_exponent(), second.as_bigint_and_exponent());
    }
}
