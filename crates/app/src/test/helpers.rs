//! Test Helpers

use bazaar::{
    discounts::{DiscountError, DiscountPercent},
    quantity::{Quantity, QuantityError},
};

use crate::domain::products::{data::NewProduct, records::ProductUuid};

pub(crate) fn new_product(price: u64, discount: u8) -> Result<NewProduct, DiscountError> {
    let uuid = ProductUuid::new();

    Ok(NewProduct {
        uuid,
        name: format!("Product {uuid}"),
        description: "A thing you can buy.".to_string(),
        price,
        discount: DiscountPercent::new(discount)?,
    })
}

pub(crate) fn quantity(units: u32) -> Result<Quantity, QuantityError> {
    Quantity::new(units)
}
