//! Review Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::reviews::ReviewsServiceError;

pub(crate) fn into_status_error(error: ReviewsServiceError) -> StatusError {
    match error {
        ReviewsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Product already reviewed")
        }
        ReviewsServiceError::NotFound | ReviewsServiceError::InvalidReference => {
            StatusError::not_found().brief("Product not found")
        }
        ReviewsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid review payload")
        }
        ReviewsServiceError::Sql(source) => {
            error!("review storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
