//! Product snapshots

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar::{discounts::DiscountPercent, lines::CartLine, quantity::Quantity};

use crate::error::ClientError;

/// The product data a cart line needs: enough to render and total the line without the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Catalog identifier
    pub uuid: Uuid,

    /// Display name
    pub name: String,

    /// Undiscounted price in minor units
    pub unit_price: u64,

    /// Percentage off the unit price, 0 to 100
    pub discount_percent: u8,
}

impl ProductSnapshot {
    pub(crate) fn to_cart_line(
        &self,
        quantity: Quantity,
        currency: &'static Currency,
    ) -> Result<CartLine<'static, Uuid>, ClientError> {
        price_line(
            self.uuid,
            quantity,
            self.unit_price,
            self.discount_percent,
            currency,
        )
    }
}

pub(crate) fn price_line(
    product: Uuid,
    quantity: Quantity,
    unit_price: u64,
    discount_percent: u8,
    currency: &'static Currency,
) -> Result<CartLine<'static, Uuid>, ClientError> {
    let minor = i64::try_from(unit_price).map_err(|_error| ClientError::InvalidPrice(unit_price))?;

    CartLine::new(
        product,
        quantity,
        Money::from_minor(minor, currency),
        DiscountPercent::new(discount_percent)?,
    )
    .ok_or(ClientError::InvalidPrice(unit_price))
}
