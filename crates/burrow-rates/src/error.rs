//! Error types for Burrow rate and reward calculations

use thiserror::Error;

/// Result type alias for calculator operations
pub type Result<T> = std::result::Result<T, RateError>;

/// Errors that can occur while converting rates or projecting rewards
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// Malformed or out-of-domain numeric input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Calculator or rate model parameters outside their domain
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The booster engine could not apportion shares
    #[error("Boost computation failed: {0}")]
    Boost(String),
}

impl RateError {
    /// Shorthand for an input that could not be parsed as a decimal
    pub(crate) fn not_a_decimal(what: &str, value: &str) -> Self {
        Self::InvalidInput(format!("{} is not a decimal number: {:?}", what, value))
    }

    /// Stable error code for display layers
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidInput(_) => 2001,
            Self::InvalidConfig(_) => 2002,
            Self::Boost(_) => 2003,
        }
    }
}
