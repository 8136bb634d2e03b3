//! Merge Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar::quantity::{Quantity, QuantityError};
use bazaar_app::domain::carts::{data::NewCartItem, records::CartItemUuid};

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    observability::{CartMutation, record_cart_mutation},
    state::State,
};

/// A line carried over from an anonymous cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MergeLineRequest {
    pub product_uuid: Uuid,
    pub quantity: u32,
}

impl TryFrom<MergeLineRequest> for NewCartItem {
    type Error = QuantityError;

    fn try_from(line: MergeLineRequest) -> Result<Self, Self::Error> {
        Ok(NewCartItem {
            uuid: CartItemUuid::new(),
            product_uuid: line.product_uuid.into(),
            quantity: Quantity::new(line.quantity)?,
        })
    }
}

/// Merge Cart Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MergeCartRequest {
    pub items: Vec<MergeLineRequest>,
}

/// Merge Cart Handler
///
/// Adds every line to the caller's cart in one transaction. Products already in the cart have
/// their quantities increased. Nothing is applied if any line is rejected.
#[endpoint(
    tags("cart"),
    summary = "Merge Anonymous Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Merged cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.merge",
    skip(json, depot),
    fields(user_uuid = tracing::field::Empty, line_count = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<MergeCartRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    let items = json
        .into_inner()
        .items
        .into_iter()
        .map(NewCartItem::try_from)
        .collect::<Result<Vec<_>, _>>()
        .or_400("Quantity must be at least 1")?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user.user_uuid));
    span.record("line_count", items.len());

    let cart = state
        .app
        .carts
        .merge_items(user.user_uuid, items)
        .await
        .map_err(into_status_error)?;

    record_cart_mutation(CartMutation::Merge);

    tracing::info!(
        user_uuid = %user.user_uuid,
        unit_count = cart.totals.unit_count,
        "merged anonymous cart"
    );

    Ok(Json(cart.into()))
}
