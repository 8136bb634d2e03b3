//! Reviews service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        products::{records::ProductUuid, repository::PgProductsRepository},
        reviews::{
            data::NewReview, errors::ReviewsServiceError, records::ReviewRecord,
            repository::PgReviewsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgReviewsService {
    db: Db,
    repository: PgReviewsRepository,
    products_repository: PgProductsRepository,
}

impl PgReviewsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReviewsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ReviewsService for PgReviewsService {
    async fn create_review(
        &self,
        user: UserUuid,
        review: NewReview,
    ) -> Result<ReviewRecord, ReviewsServiceError> {
        let mut tx = self.db.begin().await?;

        // Deleted products still satisfy the foreign key.
        self.products_repository
            .get_product(&mut tx, review.product_uuid)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => ReviewsServiceError::InvalidReference,
                other => other.into(),
            })?;

        let created = self
            .repository
            .create_review(&mut tx, user, &review)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn list_reviews(
        &self,
        product: ProductUuid,
    ) -> Result<Vec<ReviewRecord>, ReviewsServiceError> {
        let mut tx = self.db.begin().await?;

        self.products_repository.get_product(&mut tx, product).await?;

        let reviews = self.repository.list_reviews(&mut tx, product).await?;

        tx.commit().await?;

        Ok(reviews)
    }
}

#[automock]
#[async_trait]
pub trait ReviewsService: Send + Sync {
    /// Review a product. Each user may review a product once.
    async fn create_review(
        &self,
        user: UserUuid,
        review: NewReview,
    ) -> Result<ReviewRecord, ReviewsServiceError>;

    /// Reviews of a product, newest first.
    async fn list_reviews(
        &self,
        product: ProductUuid,
    ) -> Result<Vec<ReviewRecord>, ReviewsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::reviews::records::{Rating, ReviewUuid},
        test::TestContext,
    };

    use super::*;

    fn new_review(product: ProductUuid, stars: u8) -> TestResult<NewReview> {
        Ok(NewReview {
            uuid: ReviewUuid::new(),
            product_uuid: product,
            rating: Rating::new(stars)?,
            body: "Does what it says.".to_string(),
        })
    }

    #[tokio::test]
    async fn create_review_then_list() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("critic@example.com").await?;
        let product = ctx.create_product(2_50, 0).await?;

        let review = ctx
            .reviews
            .create_review(user, new_review(product.uuid, 4)?)
            .await?;

        assert_eq!(review.user_uuid, user);
        assert_eq!(review.rating.get(), 4);

        let reviews = ctx.reviews.list_reviews(product.uuid).await?;

        assert_eq!(reviews, vec![review]);

        Ok(())
    }

    #[tokio::test]
    async fn second_review_by_same_user_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("repeat@example.com").await?;
        let product = ctx.create_product(2_50, 0).await?;

        ctx.reviews
            .create_review(user, new_review(product.uuid, 5)?)
            .await?;

        let result = ctx
            .reviews
            .create_review(user, new_review(product.uuid, 1)?)
            .await;

        assert!(
            matches!(result, Err(ReviewsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn review_of_unknown_product_returns_invalid_reference() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("lost@example.com").await?;

        let result = ctx
            .reviews
            .create_review(user, new_review(ProductUuid::new(), 3)?)
            .await;

        assert!(
            matches!(result, Err(ReviewsServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_reviews_of_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.reviews.list_reviews(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(ReviewsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
