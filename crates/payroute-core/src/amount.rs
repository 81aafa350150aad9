use std::fmt;

use alloy_primitives::utils::parse_units;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A human-readable token amount as a merchant writes it (`"10.5"` or `10.5`),
/// before it is scaled into minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecimalAmount {
    Number(f64),
    Text(String),
}

impl DecimalAmount {
    /// The amount as a plain decimal string.
    pub fn as_decimal_string(&self) -> String {
        match self {
            // f64's Display never uses exponent notation.
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }

    /// Scale the amount into minor units of a token with `decimals` places.
    pub fn to_minor_units(&self, decimals: u8) -> Result<U256, CoreError> {
        if let Self::Number(n) = self {
            if !n.is_finite() {
                return Err(CoreError::InvalidAmount {
                    amount: self.to_string(),
                    reason: "amount must be finite".into(),
                });
            }
        }
        parse_decimal(&self.as_decimal_string(), decimals)
    }
}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal_string())
    }
}

impl From<&str> for DecimalAmount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for DecimalAmount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Parse an unsigned decimal string (`"1.25"`) into minor units.
pub fn parse_decimal(value: &str, decimals: u8) -> Result<U256, CoreError> {
    let invalid = |reason: String| CoreError::InvalidAmount {
        amount: value.to_string(),
        reason,
    };
    if value.is_empty() {
        return Err(invalid("amount is empty".into()));
    }
    if value.starts_with('-') {
        return Err(invalid("amount must not be negative".into()));
    }
    if let Some((_, fraction)) = value.split_once('.') {
        if fraction.len() > usize::from(decimals) {
            return Err(invalid(format!(
                "more than {decimals} fractional digits would be truncated"
            )));
        }
    }
    parse_units(value, decimals)
        .map(|parsed| parsed.get_absolute())
        .map_err(|e| invalid(e.to_string()))
}

/// Parse a minor-unit integer string (`"1000000"`).
pub fn parse_minor_units(value: &str) -> Result<U256, CoreError> {
    U256::from_str_radix(value.trim(), 10).map_err(|e| CoreError::InvalidAmount {
        amount: value.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawU256 {
    Number(u64),
    Text(String),
}

impl RawU256 {
    fn into_u256<E: serde::de::Error>(self) -> Result<U256, E> {
        match self {
            Self::Number(n) => Ok(U256::from(n)),
            Self::Text(s) => s.trim().parse::<U256>().map_err(E::custom),
        }
    }
}

/// Serde helper: `U256` as a decimal string. Accepts decimal or `0x` strings and
/// plain integers on input.
pub mod u256_decimal {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::RawU256;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawU256::deserialize(deserializer)?.into_u256()
    }
}

/// Serde helper: `Option<U256>` as an optional decimal string.
pub mod option_u256_decimal {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::RawU256;

    pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawU256>::deserialize(deserializer)?
            .map(RawU256::into_u256)
            .transpose()
    }
}
