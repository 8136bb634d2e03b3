//! Anonymous cart
//!
//! The cart is one JSON array under [`CART_STORAGE_KEY`]. Each operation reads it, applies the
//! change through [`Cart`] and writes it back, so two handles over the same storage agree.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use bazaar::{cart::Cart, quantity::Quantity};

use crate::{
    error::ClientError,
    product::{ProductSnapshot, price_line},
    repository::CartRepository,
    storage::{CartStorage, StorageError},
    view::{CartView, CartViewLine},
};

/// Storage key holding the anonymous cart.
pub const CART_STORAGE_KEY: &str = "bazaar.cart";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredLine {
    product_uuid: Uuid,
    quantity: u32,
    product: StoredProduct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredProduct {
    name: String,
    unit_price: u64,
    currency: String,
    discount_percent: u8,
}

/// A cart plus the display names the core cart does not carry.
#[derive(Debug)]
struct LocalCart {
    cart: Cart<'static, Uuid>,
    names: FxHashMap<Uuid, String>,
}

/// Cart repository over client-side storage.
#[derive(Debug)]
pub struct LocalCartRepository<S> {
    storage: S,
    currency: &'static Currency,
}

impl<S: CartStorage> LocalCartRepository<S> {
    /// An anonymous cart kept in `storage`, priced in `currency`.
    pub fn new(storage: S, currency: &'static Currency) -> Self {
        Self { storage, currency }
    }

    /// The backing store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn load(&self) -> Result<LocalCart, ClientError> {
        let Some(json) = self.storage.load(CART_STORAGE_KEY)? else {
            return Ok(LocalCart {
                cart: Cart::new(self.currency),
                names: FxHashMap::default(),
            });
        };

        let stored: Vec<StoredLine> = serde_json::from_str(&json).map_err(StorageError::from)?;
        let mut names = FxHashMap::default();
        let mut lines = Vec::with_capacity(stored.len());

        for line in stored {
            let corrupt = |reason: String| StorageError::Corrupt {
                product: line.product_uuid,
                reason,
            };

            let currency = iso::find(&line.product.currency)
                .ok_or_else(|| corrupt(format!("unknown currency {}", line.product.currency)))?;

            let quantity =
                Quantity::new(line.quantity).map_err(|error| corrupt(error.to_string()))?;

            let priced = price_line(
                line.product_uuid,
                quantity,
                line.product.unit_price,
                line.product.discount_percent,
                currency,
            )
            .map_err(|error| corrupt(error.to_string()))?;

            names.insert(line.product_uuid, line.product.name);
            lines.push(priced);
        }

        Ok(LocalCart {
            cart: Cart::with_lines(self.currency, lines)?,
            names,
        })
    }

    fn render(&self, local: &LocalCart) -> Result<CartView, ClientError> {
        let lines = local
            .cart
            .lines()
            .iter()
            .map(|line| {
                let unit_price = u64::try_from(line.unit_price().to_minor_units()).map_err(
                    |error| StorageError::Corrupt {
                        product: *line.product(),
                        reason: error.to_string(),
                    },
                )?;

                Ok(CartViewLine {
                    product_uuid: *line.product(),
                    item_uuid: None,
                    name: local.names.get(line.product()).cloned().unwrap_or_default(),
                    unit_price,
                    discount_percent: line.discount().get(),
                    quantity: line.quantity().get(),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        Ok(CartView {
            lines,
            totals: local.cart.totals()?.summary(),
        })
    }

    fn save(&self, local: &LocalCart) -> Result<CartView, ClientError> {
        let view = self.render(local)?;

        if view.is_empty() {
            self.storage.remove(CART_STORAGE_KEY)?;
        } else {
            let stored = view
                .lines
                .iter()
                .map(|line| StoredLine {
                    product_uuid: line.product_uuid,
                    quantity: line.quantity,
                    product: StoredProduct {
                        name: line.name.clone(),
                        unit_price: line.unit_price,
                        currency: self.currency.iso_alpha_code.to_string(),
                        discount_percent: line.discount_percent,
                    },
                })
                .collect::<Vec<_>>();

            let json = serde_json::to_string(&stored).map_err(StorageError::from)?;

            self.storage.save(CART_STORAGE_KEY, &json)?;
        }

        debug!(line_count = view.lines.len(), "saved anonymous cart");

        Ok(view)
    }

    fn mutate<F>(&self, change: F) -> Result<CartView, ClientError>
    where
        F: FnOnce(&mut LocalCart) -> Result<(), ClientError>,
    {
        let mut local = self.load()?;

        change(&mut local)?;

        self.save(&local)
    }
}

#[async_trait]
impl<S: CartStorage> CartRepository for LocalCartRepository<S> {
    async fn fetch(&self) -> Result<CartView, ClientError> {
        self.render(&self.load()?)
    }

    async fn add_item(
        &self,
        product: ProductSnapshot,
        quantity: Quantity,
    ) -> Result<CartView, ClientError> {
        let line = product.to_cart_line(quantity, self.currency)?;

        self.mutate(|local| {
            local.cart.add_line(line)?;
            local.names.insert(product.uuid, product.name);

            Ok(())
        })
    }

    async fn set_quantity(
        &self,
        product: Uuid,
        quantity: Quantity,
    ) -> Result<CartView, ClientError> {
        self.mutate(|local| {
            local.cart.set_quantity(product, quantity)?;

            Ok(())
        })
    }

    async fn adjust_quantity(&self, product: Uuid, delta: i32) -> Result<CartView, ClientError> {
        self.mutate(|local| {
            local.cart.adjust_quantity(product, i64::from(delta))?;

            Ok(())
        })
    }

    async fn remove_item(&self, product: Uuid) -> Result<CartView, ClientError> {
        self.mutate(|local| {
            local.cart.remove_line(product)?;
            local.names.remove(&product);

            Ok(())
        })
    }

    async fn clear(&self) -> Result<CartView, ClientError> {
        self.storage.remove(CART_STORAGE_KEY)?;

        Ok(CartView::empty(self.currency))
    }

    async fn merge(&self, lines: Vec<CartViewLine>) -> Result<CartView, ClientError> {
        let mut priced = Vec::with_capacity(lines.len());

        for line in &lines {
            priced.push(price_line(
                line.product_uuid,
                Quantity::new(line.quantity)?,
                line.unit_price,
                line.discount_percent,
                self.currency,
            )?);
        }

        self.mutate(|local| {
            local.cart.merge_lines(priced)?;

            for line in lines {
                local.names.insert(line.product_uuid, line.name);
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        storage::{FileStorage, MemoryStorage},
        test_helpers::{quantity, teapot},
    };

    use super::*;

    fn repository() -> LocalCartRepository<MemoryStorage> {
        LocalCartRepository::new(MemoryStorage::new(), GBP)
    }

    #[tokio::test]
    async fn add_item_creates_then_increments() -> TestResult {
        let repo = repository();
        let product = teapot();

        repo.add_item(product.clone(), quantity(2)?).await?;

        let view = repo.add_item(product.clone(), quantity(3)?).await?;

        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.line(product.uuid).map(|line| line.quantity), Some(5));
        assert_eq!(view.totals.unit_count, 5);
        assert_eq!(view.totals.gross, 62_50);

        Ok(())
    }

    #[tokio::test]
    async fn set_quantity_is_idempotent() -> TestResult {
        let repo = repository();
        let product = teapot();

        repo.add_item(product.clone(), Quantity::ONE).await?;

        let once = repo.set_quantity(product.uuid, quantity(4)?).await?;
        let twice = repo.set_quantity(product.uuid, quantity(4)?).await?;

        assert_eq!(once, twice);

        Ok(())
    }

    #[tokio::test]
    async fn set_quantity_of_missing_line_returns_not_found() -> TestResult {
        let result = repository().set_quantity(Uuid::now_v7(), quantity(2)?).await;

        assert!(
            matches!(result, Err(ClientError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn decrement_at_one_removes_the_line() -> TestResult {
        let repo = repository();
        let product = teapot();

        repo.add_item(product.clone(), Quantity::ONE).await?;

        let view = repo.adjust_quantity(product.uuid, -1).await?;

        assert!(view.is_empty());
        assert_eq!(repo.storage().load(CART_STORAGE_KEY)?, None);

        Ok(())
    }

    #[tokio::test]
    async fn merge_adds_quantities_for_existing_products() -> TestResult {
        let repo = repository();
        let product = teapot();

        repo.add_item(product.clone(), quantity(3)?).await?;

        let incoming = repository()
            .add_item(product.clone(), quantity(2)?)
            .await?
            .lines;

        let view = repo.merge(incoming).await?;

        assert_eq!(view.line(product.uuid).map(|line| line.quantity), Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn stored_cart_survives_a_new_repository() -> TestResult {
        let dir = tempfile::tempdir()?;
        let product = teapot();
        let other = ProductSnapshot {
            uuid: Uuid::now_v7(),
            name: "Cosy".to_string(),
            unit_price: 7_99,
            discount_percent: 50,
        };

        let written = {
            let repo = LocalCartRepository::new(FileStorage::new(dir.path()), GBP);

            repo.add_item(product.clone(), quantity(2)?).await?;
            repo.add_item(other.clone(), Quantity::ONE).await?
        };

        let reopened = LocalCartRepository::new(FileStorage::new(dir.path()), GBP);
        let read = reopened.fetch().await?;

        assert_eq!(read, written);
        assert_eq!(read.line(other.uuid).map(|line| line.name.as_str()), Some("Cosy"));

        Ok(())
    }

    #[tokio::test]
    async fn stored_json_uses_the_documented_shape() -> TestResult {
        let repo = repository();
        let product = teapot();

        repo.add_item(product.clone(), quantity(2)?).await?;

        let json = repo.storage().load(CART_STORAGE_KEY)?.unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&json)?;

        assert_eq!(
            value,
            serde_json::json!([{
                "product_uuid": product.uuid,
                "quantity": 2,
                "product": {
                    "name": "Teapot",
                    "unit_price": 12_50,
                    "currency": "GBP",
                    "discount_percent": 0,
                },
            }])
        );

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_storage_is_reported() -> TestResult {
        let repo = repository();

        repo.storage().save(
            CART_STORAGE_KEY,
            &serde_json::json!([{
                "product_uuid": Uuid::now_v7(),
                "quantity": 0,
                "product": { "name": "Teapot", "unit_price": 1, "currency": "GBP", "discount_percent": 0 },
            }])
            .to_string(),
        )?;

        let result = repo.fetch().await;

        assert!(
            matches!(
                result,
                Err(ClientError::Storage(StorageError::Corrupt { .. }))
            ),
            "expected Corrupt, got {result:?}"
        );

        Ok(())
    }
}
