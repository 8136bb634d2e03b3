//! Cart Records

use bazaar::{discounts::DiscountPercent, quantity::Quantity, totals::TotalsSummary};
use jiff::Timestamp;

use crate::{auth::UserUuid, domain::products::records::ProductUuid, uuids::TypedUuid};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone, PartialEq)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub items: Vec<CartItemRecord>,
    pub totals: TotalsSummary,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart row without its items.
#[derive(Debug, Clone)]
pub(crate) struct CartRow {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Item Record, joined with the product it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub name: String,

    /// Current unit price of the product, in minor units
    pub unit_price: u64,

    pub discount: DiscountPercent,
    pub quantity: Quantity,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
