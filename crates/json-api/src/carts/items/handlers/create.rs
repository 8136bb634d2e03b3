//! Create Cart Item Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar::quantity::Quantity;
use bazaar_app::domain::carts::{data::NewCartItem, records::CartItemUuid};

use crate::{
    carts::{errors::into_status_error, get::CartItemResponse},
    extensions::*,
    observability::{CartMutation, record_cart_mutation},
    state::State,
};

/// Create Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCartItemRequest {
    pub product_uuid: Uuid,

    /// Units to add; added to the existing quantity when the product is already in the cart
    pub quantity: u32,
}

/// Create Cart Item Handler
///
/// Creates the caller's cart on first use.
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Cart item created or incremented"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.items.create",
    skip(json, depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user.user_uuid));
    span.record("product_uuid", tracing::field::display(request.product_uuid));
    span.record("quantity", request.quantity);

    let item = NewCartItem {
        uuid: CartItemUuid::new(),
        product_uuid: request.product_uuid.into(),
        quantity: Quantity::new(request.quantity).or_400("Quantity must be at least 1")?,
    };

    let item = state
        .app
        .carts
        .add_item(user.user_uuid, item)
        .await
        .map_err(into_status_error)?;

    record_cart_mutation(CartMutation::Add);

    res.add_header(LOCATION, format!("/cart/{}", item.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(item.into()))
}
