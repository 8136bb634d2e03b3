//! Cart views
//!
//! What the UI renders. Local and remote carts produce the same shape, and both compute totals
//! with [`compute_totals`].

use rusty_money::iso::Currency;
use serde::Serialize;
use uuid::Uuid;

use bazaar::{
    quantity::Quantity,
    totals::{CartTotals, TotalsSummary, compute_totals},
};

use crate::{error::ClientError, product::price_line};

/// A rendered cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartViewLine {
    /// Product this line is for
    pub product_uuid: Uuid,

    /// Server line identifier, `None` for anonymous lines
    pub item_uuid: Option<Uuid>,

    /// Product name at the time it was added
    pub name: String,

    /// Undiscounted price per unit in minor units
    pub unit_price: u64,

    /// Percentage taken off the unit price
    pub discount_percent: u8,

    /// Units in the cart, at least one
    pub quantity: u32,
}

/// A rendered cart with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// Lines in insertion order
    pub lines: Vec<CartViewLine>,

    /// Totals computed from `lines`
    pub totals: TotalsSummary,
}

impl CartView {
    /// A cart with no lines.
    pub fn empty(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            totals: CartTotals::empty(currency).summary(),
        }
    }

    /// Build a view and compute its totals.
    ///
    /// # Errors
    ///
    /// Returns an error if a line carries a zero quantity, an out of range price or discount, or
    /// the totals overflow.
    pub fn from_lines(
        lines: Vec<CartViewLine>,
        currency: &'static Currency,
    ) -> Result<Self, ClientError> {
        let priced = lines
            .iter()
            .map(|line| {
                price_line(
                    line.product_uuid,
                    Quantity::new(line.quantity)?,
                    line.unit_price,
                    line.discount_percent,
                    currency,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let totals = compute_totals(&priced, currency)?.summary();

        Ok(Self { lines, totals })
    }

    /// The line for a product, if any.
    pub fn line(&self, product: Uuid) -> Option<&CartViewLine> {
        self.lines.iter().find(|line| line.product_uuid == product)
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
