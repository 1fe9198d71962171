//! Amount - non-negative money in minor currency units
//!
//! Balances and entry amounts are stored as integer cents. Repeated
//! additions and subtractions therefore never drift, and an Amount can
//! never hold a negative value.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places of the display currency (cents).
pub const SCALE: u32 = 2;

/// Errors that can occur when constructing or parsing amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount cannot be negative: {0}")]
    Negative(i64),

    #[error("not a valid decimal amount: {0}")]
    Unparseable(String),

    #[error("amount has more than {SCALE} decimal places: {0}")]
    TooPrecise(String),

    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// A non-negative amount of money in minor units.
///
/// # Invariant
/// The inner value is always >= 0. This is enforced by the constructor.
///
/// # Example
/// ```
/// use minibank_core::Amount;
///
/// let amount: Amount = "12.34".parse().unwrap();
/// assert_eq!(amount.minor_units(), 1234);
///
/// // Negative amounts are rejected
/// assert!(Amount::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(0);

    /// Create a new Amount from minor units.
    ///
    /// Returns an error if the value is negative.
    pub fn new(minor_units: i64) -> Result<Self, AmountError> {
        if minor_units < 0 {
            Err(AmountError::Negative(minor_units))
        } else {
            Ok(Self(minor_units))
        }
    }

    /// Create an Amount without validation.
    ///
    /// # Safety
    /// The caller MUST ensure the value is non-negative.
    #[inline]
    pub const fn new_unchecked(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Get the inner minor-unit value
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if the result would be negative
    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < 0 {
            None
        } else {
            Some(Amount(result))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Decimal::new(self.0, SCALE))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parse a major-unit decimal string ("12.34") into minor units.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s.trim()).map_err(|_| AmountError::Unparseable(s.to_string()))?;
        if decimal.normalize().scale() > SCALE {
            return Err(AmountError::TooPrecise(s.to_string()));
        }
        let minor = (decimal * Decimal::from(10i64.pow(SCALE)))
            .to_i64()
            .ok_or_else(|| AmountError::OutOfRange(s.to_string()))?;
        Self::new(minor)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}
