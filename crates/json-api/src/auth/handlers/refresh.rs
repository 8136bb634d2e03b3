//! Refresh Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::Deserialize;

use crate::{
    auth::{errors::into_status_error, handlers::TokenResponse},
    extensions::*,
    state::State,
};

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh Handler
///
/// Rotates the session. The presented refresh token stops working.
#[endpoint(
    tags("auth"),
    summary = "Refresh Session",
    responses(
        (status_code = StatusCode::OK, description = "New session tokens"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Refresh token rejected"),
    ),
)]
#[tracing::instrument(name = "auth.refresh", skip(json, depot), err)]
pub(crate) async fn handler(
    json: JsonBody<RefreshRequest>,
    depot: &mut Depot,
) -> Result<Json<TokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let tokens = state
        .app
        .auth
        .refresh(&json.into_inner().refresh_token)
        .await
        .map_err(into_status_error)?;

    Ok(Json(tokens.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use bazaar_app::auth::{AuthServiceError, MockAuthService};

    use crate::test_helpers::{TestServices, anonymous_service};

    use super::{super::tests::make_token_pair, *};

    fn make_service(auth: MockAuthService) -> Service {
        anonymous_service(
            TestServices {
                auth,
                ..TestServices::default()
            },
            Router::with_path("auth/refresh").post(handler),
        )
    }

    #[tokio::test]
    async fn test_refresh_returns_rotated_tokens() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_refresh()
            .once()
            .withf(|token| token == "old-refresh")
            .return_once(|_| Ok(make_token_pair("new-access", "new-refresh")));

        let mut res = TestClient::post("http://example.com/auth/refresh")
            .json(&json!({ "refresh_token": "old-refresh" }))
            .send(&make_service(auth))
            .await;

        let body: TokenResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.refresh_token, "new-refresh");

        Ok(())
    }

    #[tokio::test]
    async fn test_revoked_refresh_token_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_refresh()
            .once()
            .return_once(|_| Err(AuthServiceError::Unauthenticated));

        let res = TestClient::post("http://example.com/auth/refresh")
            .json(&json!({ "refresh_token": "old-refresh" }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
