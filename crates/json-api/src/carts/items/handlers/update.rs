//! Update Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar::quantity::Quantity;
use bazaar_app::domain::carts::data::QuantityChange;

use crate::{
    carts::{errors::into_status_error, get::CartItemResponse},
    extensions::*,
    observability::{CartMutation, record_cart_mutation},
    state::State,
};

/// Update Cart Item Request
///
/// Exactly one of `quantity` (absolute) or `delta` (relative) must be given.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    pub quantity: Option<u32>,
    pub delta: Option<i32>,
}

impl UpdateCartItemRequest {
    fn into_change(self) -> Result<QuantityChange, StatusError> {
        match (self.quantity, self.delta) {
            (Some(quantity), None) => Ok(QuantityChange::Set(
                Quantity::new(quantity).or_400("Quantity must be at least 1")?,
            )),
            (None, Some(delta)) => Ok(QuantityChange::Adjust(delta)),
            _ => Err(StatusError::bad_request().brief("Provide exactly one of quantity or delta")),
        }
    }
}

/// Update Cart Item Handler
///
/// Responds with the updated item, or `204 No Content` when a delta removed it.
#[endpoint(
    tags("cart"),
    summary = "Change Cart Item Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart item updated", body = CartItemResponse),
        (status_code = StatusCode::NO_CONTENT, description = "Cart item removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.items.update",
    skip(item, json, depot, res),
    fields(user_uuid = tracing::field::Empty, cart_item_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;
    let item = item.into_inner();
    let change = json.into_inner().into_change()?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user.user_uuid));
    span.record("cart_item_uuid", tracing::field::display(item));

    let updated = state
        .app
        .carts
        .update_item(user.user_uuid, item.into(), change)
        .await
        .map_err(into_status_error)?;

    record_cart_mutation(CartMutation::Update);

    match updated {
        Some(updated) => res.render(Json(CartItemResponse::from(updated))),
        None => {
            res.status_code(StatusCode::NO_CONTENT);
        }
    }

    Ok(())
}
