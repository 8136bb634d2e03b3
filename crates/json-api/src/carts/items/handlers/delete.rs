//! Delete Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::errors::into_status_error,
    extensions::*,
    observability::{CartMutation, record_cart_mutation},
    state::State,
};

/// Delete Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Delete Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart item deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;

    state
        .app
        .carts
        .remove_item(user.user_uuid, item.into_inner().into())
        .await
        .map_err(into_status_error)?;

    record_cart_mutation(CartMutation::Remove);

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use bazaar_app::domain::carts::{CartsServiceError, MockCartsService, records::CartItemUuid};

    use crate::test_helpers::{TEST_USER_UUID, carts_service};

    use super::*;

    fn make_service(repo: MockCartsService) -> Service {
        carts_service(repo, Router::with_path("cart/{item}").delete(handler))
    }

    #[tokio::test]
    async fn test_delete_cart_item_success() -> TestResult {
        let item = CartItemUuid::new();

        let mut repo = MockCartsService::new();

        repo.expect_remove_item()
            .once()
            .withf(move |user, i| *user == TEST_USER_UUID && *i == item)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/cart/{item}"))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cart_item_invalid_uuid_returns_400() -> TestResult {
        let mut repo = MockCartsService::new();

        repo.expect_remove_item().never();

        let res = TestClient::delete("http://example.com/cart/not-a-uuid")
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cart_item_not_found_returns_404() -> TestResult {
        let mut repo = MockCartsService::new();

        repo.expect_remove_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/cart/{}", CartItemUuid::new()))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
