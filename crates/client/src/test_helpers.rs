//! Test helpers.

use rusty_money::iso::GBP;
use uuid::Uuid;

use bazaar::quantity::{Quantity, QuantityError};

use crate::{
    error::ClientError,
    product::ProductSnapshot,
    view::{CartView, CartViewLine},
};

pub(crate) fn quantity(value: u32) -> Result<Quantity, QuantityError> {
    Quantity::new(value)
}

pub(crate) fn teapot() -> ProductSnapshot {
    ProductSnapshot {
        uuid: Uuid::now_v7(),
        name: "Teapot".to_string(),
        unit_price: 12_50,
        discount_percent: 0,
    }
}

pub(crate) fn line(product: &ProductSnapshot, quantity: u32) -> CartViewLine {
    CartViewLine {
        product_uuid: product.uuid,
        item_uuid: None,
        name: product.name.clone(),
        unit_price: product.unit_price,
        discount_percent: product.discount_percent,
        quantity,
    }
}

/// A server-side view: lines carry item identifiers.
pub(crate) fn remote_view(lines: Vec<CartViewLine>) -> Result<CartView, ClientError> {
    CartView::from_lines(
        lines
            .into_iter()
            .map(|line| CartViewLine {
                item_uuid: Some(Uuid::now_v7()),
                ..line
            })
            .collect(),
        GBP,
    )
}
