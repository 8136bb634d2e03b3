//! Auth Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::auth::AuthServiceError;

pub(crate) fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::AlreadyExists => {
            StatusError::conflict().brief("Email address is already registered")
        }
        AuthServiceError::NotFound => StatusError::not_found(),
        AuthServiceError::InvalidCredentials => {
            StatusError::unauthorized().brief("Invalid email or password")
        }
        AuthServiceError::Unauthenticated => {
            StatusError::unauthorized().brief("Token is invalid, expired or revoked")
        }
        AuthServiceError::InvalidData(reason) => StatusError::bad_request().brief(reason),
        AuthServiceError::PasswordHash(reason) => {
            error!("failed to hash password: {reason}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Time(source) => {
            error!("failed to compute token expiry: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Sql(source) => {
            error!("auth storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
