//! Cart repository seam.

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use bazaar::quantity::Quantity;

use crate::{
    error::ClientError,
    product::ProductSnapshot,
    view::{CartView, CartViewLine},
};

/// One cart, wherever it lives. Every mutation returns the cart as it stands afterwards.
#[automock]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The current cart. A cart that does not exist yet is empty.
    async fn fetch(&self) -> Result<CartView, ClientError>;

    /// Add a product, or add to its quantity if it is already in the cart.
    async fn add_item(
        &self,
        product: ProductSnapshot,
        quantity: Quantity,
    ) -> Result<CartView, ClientError>;

    /// Set the quantity of a product already in the cart.
    async fn set_quantity(&self, product: Uuid, quantity: Quantity)
    -> Result<CartView, ClientError>;

    /// Change a line's quantity by `delta`. Reaching zero removes the line.
    async fn adjust_quantity(&self, product: Uuid, delta: i32) -> Result<CartView, ClientError>;

    /// Remove a product's line.
    async fn remove_item(&self, product: Uuid) -> Result<CartView, ClientError>;

    /// Remove every line.
    async fn clear(&self) -> Result<CartView, ClientError>;

    /// Add every line in one step, summing quantities for products already present.
    async fn merge(&self, lines: Vec<CartViewLine>) -> Result<CartView, ClientError>;
}
