//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar::totals::TotalsSummary;
use bazaar_app::domain::carts::records::{CartItemRecord, CartRecord};

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The items in the cart, oldest first
    pub items: Vec<CartItemResponse>,

    pub totals: TotalsResponse,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        CartResponse {
            uuid: cart.uuid.into(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            totals: cart.totals.into(),
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    /// The unique identifier of the product in the cart item
    pub product_uuid: Uuid,

    pub name: String,

    /// Current unit price of the product in minor units
    pub unit_price: u64,

    pub discount_percent: u8,

    pub quantity: u32,

    /// The date and time the item was added
    pub created_at: String,

    /// The date and time the item was last updated
    pub updated_at: String,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            uuid: item.uuid.into(),
            product_uuid: item.product_uuid.into(),
            name: item.name,
            unit_price: item.unit_price,
            discount_percent: item.discount.get(),
            quantity: item.quantity.get(),
            created_at: item.created_at.to_string(),
            updated_at: item.updated_at.to_string(),
        }
    }
}

/// Cart totals in minor units of `currency`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TotalsResponse {
    pub currency: String,

    /// Sum of unit price times quantity
    pub gross: i64,

    /// Gross less line discounts, rounded once to the minor unit
    pub net: i64,

    pub line_count: usize,
    pub unit_count: u64,
}

impl From<TotalsSummary> for TotalsResponse {
    fn from(totals: TotalsSummary) -> Self {
        Self {
            currency: totals.currency.to_string(),
            gross: totals.gross,
            net: totals.net,
            line_count: totals.line_count,
            unit_count: totals.unit_count,
        }
    }
}

/// Get Cart Handler
///
/// Returns the caller's cart with product details and totals.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Caller has no cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(user.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
