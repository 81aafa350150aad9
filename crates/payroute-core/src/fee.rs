use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::amount::{parse_decimal, parse_minor_units};
use crate::error::CoreError;

/// Merchant fee attached to an accepted configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: FeeAmount,
    /// Address receiving the fee, when the merchant splits it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

impl Fee {
    pub fn new(amount: impl Into<FeeAmount>) -> Self {
        Self {
            amount: amount.into(),
            receiver: None,
        }
    }

    /// Validate and classify the fee amount.
    pub fn rule(&self) -> Result<FeeRule, CoreError> {
        self.amount.rule()
    }
}

/// Fee amount as configured: a number of whole tokens, a minor-unit string, or a
/// percentage string such as `"1.5%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeeAmount {
    Number(f64),
    Text(String),
}

impl From<&str> for FeeAmount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for FeeAmount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl FeeAmount {
    fn invalid(&self, reason: impl Into<String>) -> CoreError {
        let amount = match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        };
        CoreError::InvalidFee {
            amount,
            reason: reason.into(),
        }
    }

    pub fn rule(&self) -> Result<FeeRule, CoreError> {
        match self {
            Self::Number(n) => {
                if !n.is_finite() || n.is_sign_negative() {
                    return Err(self.invalid("fee must be a finite, non-negative number"));
                }
                Ok(FeeRule::WholeTokens(n.to_string()))
            }
            Self::Text(text) => match text.trim().strip_suffix('%') {
                Some(percentage) => self.parse_percentage(percentage),
                None => parse_minor_units(text)
                    .map(FeeRule::MinorUnits)
                    .map_err(|_| self.invalid("expected a minor-unit integer or a percentage")),
            },
        }
    }

    fn parse_percentage(&self, percentage: &str) -> Result<FeeRule, CoreError> {
        let (whole, fraction) = percentage.split_once('.').unwrap_or((percentage, ""));
        if fraction.len() > 1 {
            return Err(self.invalid("only up to 1 decimal is supported for fee percentages"));
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(self.invalid("percentage is empty"));
        }
        let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !digits_only(whole) || !digits_only(fraction) {
            return Err(self.invalid("percentage must be a non-negative decimal"));
        }
        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| self.invalid("percentage out of range"))?
        };
        let tenth: u32 = fraction.parse().unwrap_or(0);
        let tenths = whole
            .checked_mul(10)
            .and_then(|t| t.checked_add(tenth))
            .ok_or_else(|| self.invalid("percentage out of range"))?;
        Ok(FeeRule::Percentage { tenths })
    }
}

/// A validated fee amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeRule {
    /// Percentage in tenths of a percent (`"1.5%"` is 15).
    Percentage { tenths: u32 },
    /// Fixed amount already in destination-token minor units.
    MinorUnits(U256),
    /// Fixed amount in whole destination tokens, scaled by the token's decimals.
    WholeTokens(String),
}

impl FeeRule {
    /// Fee owed on `basis` (destination-token minor units).
    ///
    /// Percentages floor: `basis * tenths / 1000`.
    pub fn fee_on(&self, basis: U256, to_decimals: u8) -> Result<U256, CoreError> {
        match self {
            Self::Percentage { tenths } => basis
                .checked_mul(U256::from(*tenths))
                .map(|scaled| scaled / U256::from(1000u64))
                .ok_or(CoreError::Overflow("percentage fee")),
            Self::MinorUnits(amount) => Ok(*amount),
            Self::WholeTokens(amount) => parse_decimal(amount, to_decimals),
        }
    }
}
