//! Calculator configuration

use crate::booster::LogBooster;
use crate::constants::{DEFAULT_BOOSTER_DECIMALS, PERIODS_PER_YEAR};
use crate::error::{RateError, Result};
use crate::math::{self, DEFAULT_WORKING_PRECISION};
use crate::rate::RateConverter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete calculator configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Rate conversion parameters
    #[serde(default)]
    pub rates: RateSettings,

    /// Reward boosting parameters
    #[serde(default)]
    pub booster: BoosterSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rate conversion settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateSettings {
    /// Compounding periods in a 365-day year
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u64,

    /// Significant digits carried through calculations
    #[serde(default = "default_working_precision")]
    pub working_precision: u64,
}

fn default_periods_per_year() -> u64 {
    PERIODS_PER_YEAR
}

fn default_working_precision() -> u64 {
    DEFAULT_WORKING_PRECISION
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            periods_per_year: default_periods_per_year(),
            working_precision: default_working_precision(),
        }
    }
}

/// Booster settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoosterSettings {
    /// Decimals of the boosting token
    #[serde(default = "default_booster_decimals")]
    pub booster_decimals: u8,

    /// Log base of the boost curve, raw booster units
    #[serde(default)]
    pub log_base: Option<String>,
}

fn default_booster_decimals() -> u8 {
    DEFAULT_BOOSTER_DECIMALS
}

impl Default for BoosterSettings {
    fn default() -> Self {
        Self {
            booster_decimals: default_booster_decimals(),
            log_base: None,
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl CalculatorConfig {
    /// Parse from TOML text and validate
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| RateError::InvalidConfig(format!("malformed TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file and validate
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RateError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rates.periods_per_year == 0 {
            return Err(RateError::InvalidConfig("periods_per_year must be positive".into()));
        }
        math::check_precision(self.rates.working_precision)?;
        if let Some(log_base) = &self.booster.log_base {
            math::parse_decimal("booster log_base", log_base)
                .map_err(|e| RateError::InvalidConfig(e.to_string()))?;
        }
        Ok(())
    }

    /// Rate converter for these settings
    pub fn rate_converter(&self) -> Result<RateConverter> {
        RateConverter::new(self.rates.periods_per_year, self.rates.working_precision)
    }

    /// Log booster, when a log base is configured
    pub fn log_booster(&self) -> Result<Option<LogBooster>> {
        self.booster
            .log_base
            .as_deref()
            .map(|raw| {
                let base = math::parse_decimal("booster log_base", raw)
                    .map_err(|e| RateError::InvalidConfig(e.to_string()))?;
                LogBooster::new(base).with_precision(self.rates.working_precision)
            })
            .transpose()
    }
}
