//! Discounts

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to discount values.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentages are whole numbers between 0 and 100 inclusive.
    #[error("discount of {0}% is outside 0-100")]
    OutOfRange(i64),
}

/// Whole-number percentage taken off a product's unit price.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// No discount.
    pub const NONE: Self = Self(0);

    /// Create a discount percentage.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::OutOfRange`] when `percent` is above 100.
    pub fn new(percent: u8) -> Result<Self, DiscountError> {
        if percent > 100 {
            return Err(DiscountError::OutOfRange(i64::from(percent)));
        }

        Ok(Self(percent))
    }

    /// Percentage value.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Fraction of the unit price that remains payable, e.g. `0.85` for 15% off.
    pub fn payable_fraction(self) -> Decimal {
        Decimal::from(100 - self.0) / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<u8> for DiscountPercent {
    type Error = DiscountError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i16> for DiscountPercent {
    type Error = DiscountError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_negative| DiscountError::OutOfRange(i64::from(value)))
            .and_then(Self::new)
    }
}

impl From<DiscountPercent> for u8 {
    fn from(discount: DiscountPercent) -> Self {
        discount.get()
    }
}

impl From<DiscountPercent> for i16 {
    fn from(discount: DiscountPercent) -> Self {
        i16::from(discount.get())
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn rejects_above_one_hundred() {
        assert_eq!(DiscountPercent::new(101), Err(DiscountError::OutOfRange(101)));
    }

    #[test]
    fn rejects_negative_storage_values() {
        assert_eq!(
            DiscountPercent::try_from(-1_i16),
            Err(DiscountError::OutOfRange(-1))
        );
    }

    #[test]
    fn payable_fraction_is_exact() -> TestResult {
        assert_eq!(DiscountPercent::new(15)?.payable_fraction(), Decimal::new(85, 2));
        assert_eq!(DiscountPercent::NONE.payable_fraction(), Decimal::ONE);
        assert_eq!(DiscountPercent::new(100)?.payable_fraction(), Decimal::ZERO);

        Ok(())
    }
}
