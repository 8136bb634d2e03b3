//! Create Review Handler

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

use bazaar_app::domain::reviews::{
    data::NewReview,
    records::{Rating, ReviewUuid},
};

use crate::{
    extensions::*,
    reviews::{errors::into_status_error, index::ReviewResponse},
    state::State,
};

/// Create Review Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateReviewRequest {
    /// Star rating from 1 to 5
    pub rating: u8,

    #[serde(default)]
    pub body: String,
}

/// Create Review Handler
#[endpoint(
    tags("reviews"),
    summary = "Review Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Review created"),
        (status_code = StatusCode::CONFLICT, description = "Product already reviewed"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "reviews.create",
    skip(product, json, depot, res),
    fields(user_uuid = tracing::field::Empty, product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<CreateReviewRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ReviewResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_401()?;
    let product = product.into_inner();
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user.user_uuid));
    span.record("product_uuid", tracing::field::display(product));

    let review = NewReview {
        uuid: ReviewUuid::new(),
        product_uuid: product.into(),
        rating: Rating::new(request.rating).or_400("Rating must be between 1 and 5")?,
        body: request.body,
    };

    let created = state
        .app
        .reviews
        .create_review(user.user_uuid, review)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(created.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use bazaar_app::domain::{
        products::records::ProductUuid,
        reviews::{MockReviewsService, ReviewsServiceError, records::ReviewRecord},
    };

    use crate::test_helpers::{TEST_USER_UUID, reviews_service};

    use super::*;

    fn make_service(repo: MockReviewsService) -> Service {
        reviews_service(
            repo,
            Router::with_path("products/{product}/reviews").post(handler),
        )
    }

    #[tokio::test]
    async fn test_create_review_success() -> TestResult {
        let product = ProductUuid::new();

        let mut repo = MockReviewsService::new();

        repo.expect_create_review()
            .once()
            .withf(move |user, review| {
                *user == TEST_USER_UUID
                    && review.product_uuid == product
                    && review.rating.get() == 4
                    && review.body == "Pours well"
            })
            .return_once(|user, review| {
                Ok(ReviewRecord {
                    uuid: review.uuid,
                    product_uuid: review.product_uuid,
                    user_uuid: user,
                    rating: review.rating,
                    body: review.body,
                    created_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::post(format!("http://example.com/products/{product}/reviews"))
            .json(&json!({ "rating": 4, "body": "Pours well" }))
            .send(&make_service(repo))
            .await;

        let body: ReviewResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.rating, 4);
        assert_eq!(body.user_uuid, TEST_USER_UUID.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_review_rating_out_of_range_returns_400() -> TestResult {
        let mut repo = MockReviewsService::new();

        repo.expect_create_review().never();

        let res = TestClient::post(format!(
            "http://example.com/products/{}/reviews",
            ProductUuid::new()
        ))
        .json(&json!({ "rating": 6 }))
        .send(&make_service(repo))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_second_review_returns_409() -> TestResult {
        let mut repo = MockReviewsService::new();

        repo.expect_create_review()
            .once()
            .return_once(|_, _| Err(ReviewsServiceError::AlreadyExists));

        let res = TestClient::post(format!(
            "http://example.com/products/{}/reviews",
            ProductUuid::new()
        ))
        .json(&json!({ "rating": 3 }))
        .send(&make_service(repo))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
