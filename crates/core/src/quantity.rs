//! Quantities

use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing or adjusting a [`Quantity`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities start at one; removal is a separate operation.
    #[error("quantity must be at least 1")]
    Zero,

    /// The resulting quantity does not fit in a cart line.
    #[error("quantity {0} is out of range")]
    OutOfRange(i64),
}

/// Number of units on a single cart line. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] when `value` is zero.
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(value).map(Self).ok_or(QuantityError::Zero)
    }

    /// Number of units.
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add another quantity to this one.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::OutOfRange`] when the sum overflows.
    pub fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        self.0
            .checked_add(other.get())
            .map(Self)
            .ok_or(QuantityError::OutOfRange(
                i64::from(self.get()) + i64::from(other.get()),
            ))
    }

    /// Apply a signed change in units.
    ///
    /// Returns `Ok(None)` when the change takes the quantity to zero or below, which callers
    /// treat as removal of the line.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::OutOfRange`] when the result exceeds `u32::MAX`.
    pub fn adjust(self, delta: i64) -> Result<Option<Self>, QuantityError> {
        let adjusted = i64::from(self.get()).saturating_add(delta);

        if adjusted <= 0 {
            return Ok(None);
        }

        u32::try_from(adjusted)
            .map_err(|_overflow| QuantityError::OutOfRange(adjusted))
            .map(|value| NonZeroU32::new(value).map(Self))
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(QuantityError::Zero);
        }

        u32::try_from(value)
            .map_err(|_overflow| QuantityError::OutOfRange(value))
            .and_then(Self::new)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        i64::from(quantity.get())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
