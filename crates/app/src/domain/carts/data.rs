//! Cart Data

use bazaar::quantity::Quantity;

use crate::domain::{carts::records::CartItemUuid, products::records::ProductUuid};

/// New Cart Item Data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartItem {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: Quantity,
}

/// A change to the quantity of an existing cart item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Replace the quantity.
    Set(Quantity),

    /// Add a signed number of units. Reaching zero removes the item.
    Adjust(i32),
}
