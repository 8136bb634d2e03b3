//! Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::Deserialize;

use bazaar_app::auth::AuthServiceError;

use crate::{
    auth::{errors::into_status_error, handlers::TokenResponse},
    extensions::*,
    state::State,
};

/// Login Request
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login Handler
#[endpoint(
    tags("auth"),
    summary = "Login",
    responses(
        (status_code = StatusCode::OK, description = "Session tokens"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid credentials"),
    ),
)]
#[tracing::instrument(name = "auth.login", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<TokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    // Unknown emails and wrong passwords are indistinguishable to the caller.
    let tokens = state
        .app
        .auth
        .login(&request.email, &request.password)
        .await
        .map_err(|error| match error {
            AuthServiceError::NotFound => {
                StatusError::unauthorized().brief("Invalid email or password")
            }
            other => into_status_error(other),
        })?;

    Ok(Json(tokens.into()))
}
