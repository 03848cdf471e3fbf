//! User asset positions as seen by reward calculations

use crate::units::shrink_token;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Which side of a market a farm rewards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardSide {
    Supplied,
    Borrowed,
}

impl RewardSide {
    /// Whether the side counts the user's debt
    pub fn is_borrow(&self) -> bool {
        matches!(self, Self::Borrowed)
    }
}

/// One asset balance with the price it is valued at
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetPosition {
    /// Asset (token account) ID
    pub asset_id: String,

    /// Balance in raw integer units
    pub principal_balance: BigDecimal,

    /// Decimals of the raw balance
    pub decimals: u8,

    /// USD price of one whole token
    pub price_usd: BigDecimal,
}

impl AssetPosition {
    pub fn new(
        asset_id: impl Into<String>,
        principal_balance: BigDecimal,
        decimals: u8,
        price_usd: BigDecimal,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            principal_balance,
            decimals,
            price_usd,
        }
    }

    /// Balance in whole tokens
    pub fn token_amount(&self) -> BigDecimal {
        shrink_token(&self.principal_balance, self.decimals)
    }

    /// Balance valued in USD
    pub fn usd_value(&self) -> BigDecimal {
        self.token_amount() * &self.price_usd
    }
}

/// Raw balances a portfolio holds in one asset
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAssetBalances {
    #[serde(default)]
    pub supplied: BigDecimal,

    #[serde(default)]
    pub collateral: BigDecimal,

    #[serde(default)]
    pub borrowed: BigDecimal,
}

impl UserAssetBalances {
    /// Balance a farm on `side` counts: borrowed, or supplied plus collateral
    pub fn balance_for(&self, side: RewardSide) -> BigDecimal {
        if side.is_borrow() {
            self.borrowed.clone()
        } else {
            &self.supplied + &self.collateral
        }
    }

    /// Project the side's balance into a priced position
    pub fn position_for(
        &self,
        side: RewardSide,
        asset_id: impl Into<String>,
        decimals: u8,
        price_usd: BigDecimal,
    ) -> AssetPosition {
        AssetPosition::new(asset_id, self.balance_for(side), decimals, price_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_usd_value() {
        let position =
            AssetPosition::new("usdt.tether-token.near", dec("2500000000"), 6, dec("1.0002"));
        assert_eq!(position.token_amount(), dec("2500"));
        assert_eq!(position.usd_value(), dec("2500.5"));
    }

    #[test]
    fn test_balance_for_side() {
        let balances = UserAssetBalances {
            supplied: dec("100"),
            collateral: dec("50"),
            borrowed: dec("30"),
        };
        assert_eq!(balances.balance_for(RewardSide::Supplied), dec("150"));
        assert_eq!(balances.balance_for(RewardSide::Borrowed), dec("30"));

        let position = balances.position_for(RewardSide::Supplied, "wrap.near", 1, dec("4"));
        assert_eq!(position.usd_value(), dec("60"));
    }

    #[test]
    fn test_side_serde_and_kind() {
        assert!(RewardSide::Borrowed.is_borrow());
        assert!(!RewardSide::Supplied.is_borrow());
        let side: RewardSide = serde_json::from_str("\"borrowed\"").unwrap();
        assert_eq!(side, RewardSide::Borrowed);
    }

    #[test]
    fn test_missing_balances_default_to_zero() {
        let balances: UserAssetBalances = serde_json::from_str(r#"{"supplied": "10"}"#).unwrap();
        assert!(balances.borrowed.is_zero());
        assert_eq!(balances.balance_for(RewardSide::Supplied), dec("10"));
    }
}
