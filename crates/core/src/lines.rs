//! Cart lines

use rusty_money::{Money, iso::Currency};

use crate::{discounts::DiscountPercent, quantity::Quantity};

/// A product and its quantity within a cart, with the price snapshot used for totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartLine<'a, P> {
    product: P,
    quantity: Quantity,
    unit_price: Money<'a, Currency>,
    discount: DiscountPercent,
}

impl<'a, P> CartLine<'a, P> {
    /// Create a new cart line.
    ///
    /// Returns `None` when `unit_price` is negative.
    pub fn new(
        product: P,
        quantity: Quantity,
        unit_price: Money<'a, Currency>,
        discount: DiscountPercent,
    ) -> Option<Self> {
        if unit_price.to_minor_units() < 0 {
            return None;
        }

        Some(Self {
            product,
            quantity,
            unit_price,
            discount,
        })
    }

    /// Return the product key
    pub fn product(&self) -> &P {
        &self.product
    }

    /// Return the quantity
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Return the undiscounted unit price
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Return the discount
    pub fn discount(&self) -> DiscountPercent {
        self.discount
    }

    /// Return the currency the line is priced in
    pub fn currency(&self) -> &'a Currency {
        self.unit_price.currency()
    }

    pub(crate) fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
    }

    pub(crate) fn reprice(&mut self, unit_price: Money<'a, Currency>, discount: DiscountPercent) {
        self.unit_price = unit_price;
        self.discount = discount;
    }
}
