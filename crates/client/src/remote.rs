//! Server cart
//!
//! Talks to the `/cart` endpoints with an explicit bearer token. Each mutation is a single request
//! followed by a fresh `GET /cart`; the view is never patched locally.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use bazaar::quantity::Quantity;

use crate::{
    config::ClientConfig,
    error::ClientError,
    product::ProductSnapshot,
    repository::CartRepository,
    view::{CartView, CartViewLine},
};

#[derive(Debug, Deserialize)]
struct CartResponse {
    items: Vec<CartItemResponse>,
}

#[derive(Debug, Deserialize)]
struct CartItemResponse {
    uuid: Uuid,
    product_uuid: Uuid,
    name: String,
    unit_price: u64,
    discount_percent: u8,
    quantity: u32,
}

impl From<CartItemResponse> for CartViewLine {
    fn from(item: CartItemResponse) -> Self {
        Self {
            product_uuid: item.product_uuid,
            item_uuid: Some(item.uuid),
            name: item.name,
            unit_price: item.unit_price,
            discount_percent: item.discount_percent,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
struct LineRequest {
    product_uuid: Uuid,
    quantity: u32,
}

/// Cart repository backed by the REST API.
#[derive(Clone)]
pub struct RemoteCartRepository {
    http: Client,
    base_url: String,
    access_token: String,
    currency: &'static Currency,
}

impl fmt::Debug for RemoteCartRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCartRepository")
            .field("base_url", &self.base_url)
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

impl RemoteCartRepository {
    /// Create a repository that authenticates every request with `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, access_token: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            access_token: access_token.into(),
            currency: config.currency,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .inspect_err(|error| error!(%error, "cart request failed"))?;

        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        Err(classify(status, body))
    }

    /// Read the cart back after a mutation the server has accepted.
    async fn reload(&self) -> Result<CartView, ClientError> {
        self.fetch()
            .await
            .map_err(|error| ClientError::Reload(Box::new(error)))
    }

    async fn item_for(&self, product: Uuid) -> Result<Uuid, ClientError> {
        self.fetch()
            .await?
            .line(product)
            .and_then(|line| line.item_uuid)
            .ok_or(ClientError::NotFound)
    }
}

/// Map a non-success status onto the client error taxonomy.
fn classify(status: StatusCode, body: String) -> ClientError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::InvalidInput(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClientError::Unauthorized(status.as_u16())
        }
        StatusCode::NOT_FOUND => ClientError::NotFound,
        _ => {
            error!(status = status.as_u16(), %body, "cart request rejected");

            ClientError::Server {
                status: status.as_u16(),
                body,
            }
        }
    }
}

#[async_trait]
impl CartRepository for RemoteCartRepository {
    async fn fetch(&self) -> Result<CartView, ClientError> {
        let response = match self.send(self.http.get(self.url("/cart"))).await {
            Ok(response) => response,
            Err(ClientError::NotFound) => return Ok(CartView::empty(self.currency)),
            Err(error) => return Err(error),
        };

        let cart: CartResponse = response.json().await?;

        CartView::from_lines(
            cart.items.into_iter().map(CartViewLine::from).collect(),
            self.currency,
        )
    }

    async fn add_item(
        &self,
        product: ProductSnapshot,
        quantity: Quantity,
    ) -> Result<CartView, ClientError> {
        self.send(self.http.post(self.url("/cart")).json(&LineRequest {
            product_uuid: product.uuid,
            quantity: quantity.get(),
        }))
        .await?;

        self.reload().await
    }

    async fn set_quantity(
        &self,
        product: Uuid,
        quantity: Quantity,
    ) -> Result<CartView, ClientError> {
        let item = self.item_for(product).await?;

        self.send(
            self.http
                .patch(self.url(&format!("/cart/{item}")))
                .json(&json!({ "quantity": quantity.get() })),
        )
        .await?;

        self.reload().await
    }

    async fn adjust_quantity(&self, product: Uuid, delta: i32) -> Result<CartView, ClientError> {
        let item = self.item_for(product).await?;

        self.send(
            self.http
                .patch(self.url(&format!("/cart/{item}")))
                .json(&json!({ "delta": delta })),
        )
        .await?;

        self.reload().await
    }

    async fn remove_item(&self, product: Uuid) -> Result<CartView, ClientError> {
        let item = self.item_for(product).await?;

        self.send(self.http.delete(self.url(&format!("/cart/{item}"))))
            .await?;

        self.reload().await
    }

    async fn clear(&self) -> Result<CartView, ClientError> {
        match self.send(self.http.delete(self.url("/cart"))).await {
            Ok(_) | Err(ClientError::NotFound) => {}
            Err(error) => return Err(error),
        }

        self.reload().await
    }

    async fn merge(&self, lines: Vec<CartViewLine>) -> Result<CartView, ClientError> {
        let items = lines
            .into_iter()
            .map(|line| LineRequest {
                product_uuid: line.product_uuid,
                quantity: line.quantity,
            })
            .collect::<Vec<_>>();

        self.send(
            self.http
                .post(self.url("/cart/merge"))
                .json(&json!({ "items": items })),
        )
        .await?;

        self.reload().await
    }
}
