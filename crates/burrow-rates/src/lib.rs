//! # Burrow Rates - Interest & Reward Calculations
//!
//! Pure calculations behind the Burrow lending dashboard: per-period
//! fixed-point interest rates, their annualized percentages, boosted reward
//! APY and the utilization rate curve.
//!
//! ## Key Features
//!
//! - **Rate conversion**: APR to 10^27-scaled per-period rate and back
//! - **Reward APY**: market and staking APY with pluggable boost engines
//! - **Rate curve**: borrow and supply APR across pool utilization
//!
//! ## Precision
//!
//! The per-period growth factor differs from one around the 18th digit, so
//! every path uses [`bigdecimal::BigDecimal`] at a working precision of at
//! least 35 significant digits. Nothing touches `f64`.
//!
//! ```text
//! "5" --apr_to_rate--> "1000000000000000001547125957" --rate_to_apr--> "5.00"
//! ```

pub mod booster;
pub mod config;
pub mod curve;
pub mod error;
pub mod math;
pub mod position;
pub mod rate;
pub mod rewards;
pub mod units;

// Re-exports
pub use booster::{
    BoostEngine, BoostRequest, BoostedShares, FarmSnapshotBooster, LogBooster, RewardFarmState,
    StakingBoost,
};
pub use config::{BoosterSettings, CalculatorConfig, LoggingConfig, RateSettings};
pub use curve::{utilization, CurvePoint, InterestRateModel};
pub use error::{RateError, Result};
pub use position::{AssetPosition, RewardSide, UserAssetBalances};
pub use rate::{apr_to_rate, rate_to_apr, FixedPointRate, RateConverter};
pub use rewards::{staking_apy, FarmQuery, RewardEstimator};
pub use units::{expand_token, shrink_token, total_decimals, usd_price_from_multiplier};

/// Protocol constants
pub mod constants {
    /// Rate compounding periods (nanoseconds) in a 365-day year
    pub const PERIODS_PER_YEAR: u64 = 31_536_000_000_000_000;

    /// Decimal places of a fixed-point rate
    pub const RATE_DECIMALS: u32 = 27;

    /// Days counted in a reward year
    pub const DAYS_PER_YEAR: u32 = 365;

    /// Denominator of basis-point parameters
    pub const BASIS_POINTS: u32 = 10_000;

    /// Decimals of the boosting token
    pub const DEFAULT_BOOSTER_DECIMALS: u8 = 18;
}

pub use constants::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods_per_year() {
        assert_eq!(PERIODS_PER_YEAR, 365 * 24 * 3600 * 1_000_000_000);
    }

    #[test]
    fn test_unit_rate() {
        assert_eq!(FixedPointRate::one().to_string().len(), RATE_DECIMALS as usize + 1);
    }
}
