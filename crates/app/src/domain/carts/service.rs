//! Carts service.

use async_trait::async_trait;
use bazaar::{
    lines::CartLine,
    quantity::Quantity,
    totals::{TotalsSummary, compute_totals},
};
use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        carts::{
            data::{NewCartItem, QuantityChange},
            errors::CartsServiceError,
            records::{CartItemRecord, CartItemUuid, CartRecord, CartRow, CartUuid},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        products::{records::ProductUuid, repository::PgProductsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    currency: &'static Currency,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency) -> Self {
        Self {
            db,
            currency,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }

    /// Fails with `NotFound` when the product does not exist or has been deleted.
    async fn ensure_product_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<(), CartsServiceError> {
        self.products_repository.get_product(tx, product).await?;

        Ok(())
    }

    async fn load_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartRow,
    ) -> Result<CartRecord, CartsServiceError> {
        let items = self
            .items_repository
            .get_cart_items(tx, cart.user_uuid)
            .await?;

        let totals = cart_totals(&items, self.currency)?;

        Ok(CartRecord {
            uuid: cart.uuid,
            user_uuid: cart.user_uuid,
            items,
            totals,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        })
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self
            .carts_repository
            .find_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let cart = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        ensure_storable(item.quantity)?;

        let mut tx = self.db.begin_user_transaction(user).await?;

        self.ensure_product_available(&mut tx, item.product_uuid)
            .await?;

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user, CartUuid::new())
            .await?;

        let stored = self
            .items_repository
            .upsert_cart_item(&mut tx, cart.uuid, &item)
            .await?;

        let item = self
            .items_repository
            .get_cart_item(&mut tx, user, stored)
            .await?;

        tx.commit().await?;

        Ok(item)
    }

    async fn merge_items(
        &self,
        user: UserUuid,
        items: Vec<NewCartItem>,
    ) -> Result<CartRecord, CartsServiceError> {
        let items = coalesce_items(items)?;

        for item in &items {
            ensure_storable(item.quantity)?;
        }

        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user, CartUuid::new())
            .await?;

        for item in &items {
            self.ensure_product_available(&mut tx, item.product_uuid)
                .await?;

            self.items_repository
                .upsert_cart_item(&mut tx, cart.uuid, item)
                .await?;
        }

        let cart = self.load_cart(&mut tx, cart).await?;

        tx.commit().await?;

        debug!(
            user_uuid = %user,
            merged_lines = items.len(),
            line_count = cart.totals.line_count,
            "merged items into cart"
        );

        Ok(cart)
    }

    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        change: QuantityChange,
    ) -> Result<Option<CartItemRecord>, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let current = self
            .items_repository
            .lock_cart_item(&mut tx, user, item)
            .await?;

        let updated = match change {
            QuantityChange::Set(quantity) => Some(quantity),
            QuantityChange::Adjust(delta) => current.adjust(i64::from(delta))?,
        };

        let record = match updated {
            Some(quantity) => {
                ensure_storable(quantity)?;

                self.items_repository
                    .update_cart_item_quantity(&mut tx, item, quantity)
                    .await?;

                Some(
                    self.items_repository
                        .get_cart_item(&mut tx, user, item)
                        .await?,
                )
            }
            None => {
                self.items_repository
                    .delete_cart_item(&mut tx, user, item)
                    .await?;

                None
            }
        };

        tx.commit().await?;

        Ok(record)
    }

    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, user, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let rows_affected = self.carts_repository.delete_cart(&mut tx, user).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart with product details and totals.
    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add a product to the user's cart, creating the cart on first use. Adding a product that
    /// is already in the cart increases its quantity.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Add a batch of items to the user's cart in one transaction. Nothing is applied if any
    /// item fails.
    async fn merge_items(
        &self,
        user: UserUuid,
        items: Vec<NewCartItem>,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Change the quantity of an item. Returns `None` when the change removed the item.
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        change: QuantityChange,
    ) -> Result<Option<CartItemRecord>, CartsServiceError>;

    /// Remove an item from the user's cart.
    async fn remove_item(&self, user: UserUuid, item: CartItemUuid)
    -> Result<(), CartsServiceError>;

    /// Delete the user's cart and everything in it.
    async fn clear_cart(&self, user: UserUuid) -> Result<(), CartsServiceError>;
}

/// Total a set of cart items in the store currency.
pub(crate) fn cart_totals(
    items: &[CartItemRecord],
    currency: &'static Currency,
) -> Result<TotalsSummary, CartsServiceError> {
    let lines = items
        .iter()
        .map(|item| {
            let unit_price = Money::from_minor(i64::try_from(item.unit_price)?, currency);

            CartLine::new(item.product_uuid, item.quantity, unit_price, item.discount)
                .ok_or(CartsServiceError::InvalidData)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(compute_totals(&lines, currency)?.summary())
}

/// Quantities are stored in an `INTEGER` column.
fn ensure_storable(quantity: Quantity) -> Result<(), CartsServiceError> {
    if i32::try_from(quantity.get()).is_err() {
        return Err(CartsServiceError::InvalidQuantity);
    }

    Ok(())
}

/// Collapse repeated products into one item each, keeping first-seen order and UUID.
fn coalesce_items(items: Vec<NewCartItem>) -> Result<Vec<NewCartItem>, CartsServiceError> {
    let mut positions: FxHashMap<ProductUuid, usize> = FxHashMap::default();
    let mut coalesced: Vec<NewCartItem> = Vec::with_capacity(items.len());

    for item in items {
        if let Some(&position) = positions.get(&item.product_uuid) {
            if let Some(existing) = coalesced.get_mut(position) {
                existing.quantity = existing.quantity.checked_add(item.quantity)?;
            }
        } else {
            positions.insert(item.product_uuid, coalesced.len());
            coalesced.push(item);
        }
    }

    Ok(coalesced)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        domain::products::ProductsService,
        test::{TestContext, helpers::quantity},
    };

    use super::*;

    fn new_item(product: ProductUuid, units: u32) -> TestResult<NewCartItem> {
        Ok(NewCartItem {
            uuid: CartItemUuid::new(),
            product_uuid: product,
            quantity: quantity(units)?,
        })
    }

    #[test]
    fn coalesce_items_sums_repeated_products() -> TestResult {
        let a = ProductUuid::new();
        let b = ProductUuid::new();
        let first = new_item(a, 2)?;

        let coalesced = coalesce_items(vec![first, new_item(b, 1)?, new_item(a, 3)?])?;

        assert_eq!(coalesced.len(), 2);
        assert_eq!(coalesced[0].uuid, first.uuid);
        assert_eq!(coalesced[0].quantity.get(), 5);
        assert_eq!(coalesced[1].product_uuid, b);

        Ok(())
    }

    #[test]
    fn quantities_beyond_integer_column_are_invalid() -> TestResult {
        let largest = i32::MAX.unsigned_abs();

        assert!(ensure_storable(quantity(largest)?).is_ok());
        assert!(matches!(
            ensure_storable(quantity(largest + 1)?),
            Err(CartsServiceError::InvalidQuantity)
        ));

        Ok(())
    }

    #[test]
    fn cart_totals_rounds_once_at_the_aggregate() -> TestResult {
        let now = jiff::Timestamp::now();
        let item = |price: u64, discount: u8, units: u32| -> TestResult<CartItemRecord> {
            Ok(CartItemRecord {
                uuid: CartItemUuid::new(),
                product_uuid: ProductUuid::new(),
                name: "Item".to_string(),
                unit_price: price,
                discount: bazaar::discounts::DiscountPercent::new(discount)?,
                quantity: quantity(units)?,
                created_at: now,
                updated_at: now,
            })
        };

        // 0.5p and 0.5p of discount remainder add up before rounding.
        let totals = cart_totals(&[item(5, 10, 1)?, item(5, 10, 1)?], GBP)?;

        assert_eq!(totals.gross, 10);
        assert_eq!(totals.net, 9);
        assert_eq!(totals.unit_count, 2);
        assert_eq!(totals.currency, "GBP");

        Ok(())
    }

    #[tokio::test]
    async fn get_cart_without_cart_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("nocart@example.com").await?;

        let result = ctx.carts.get_cart(user).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_creates_cart_and_line() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("add@example.com").await?;
        let product = ctx.create_product(10_00, 0).await?;

        let new = new_item(product.uuid, 2)?;
        let item = ctx.carts.add_item(user, new).await?;

        assert_eq!(item.uuid, new.uuid);
        assert_eq!(item.product_uuid, product.uuid);
        assert_eq!(item.name, product.name);
        assert_eq!(item.unit_price, 10_00);
        assert_eq!(item.quantity.get(), 2);

        let cart = ctx.carts.get_cart(user).await?;

        assert_eq!(cart.user_uuid, user);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.totals.gross, 20_00);
        assert_eq!(cart.totals.net, 20_00);

        Ok(())
    }

    #[tokio::test]
    async fn adding_oversized_quantity_returns_invalid_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("oversized@example.com").await?;
        let product = ctx.create_product(1_00, 0).await?;

        let result = ctx
            .carts
            .add_item(user, new_item(product.uuid, 3_000_000_000)?)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );

        let result = ctx
            .carts
            .merge_items(user, vec![new_item(product.uuid, 3_000_000_000)?])
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity from merge, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn adjusting_past_integer_column_returns_invalid_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("ceiling@example.com").await?;
        let product = ctx.create_product(1_00, 0).await?;

        let item = ctx.carts.add_item(user, new_item(product.uuid, 1)?).await?;

        ctx.carts
            .update_item(
                user,
                item.uuid,
                QuantityChange::Set(quantity(i32::MAX.unsigned_abs())?),
            )
            .await?;

        let result = ctx
            .carts
            .update_item(user, item.uuid, QuantityChange::Adjust(1))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidQuantity)),
            "expected InvalidQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn adding_same_product_twice_increments_one_line() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("twice@example.com").await?;
        let product = ctx.create_product(5_00, 0).await?;

        let first = ctx.carts.add_item(user, new_item(product.uuid, 1)?).await?;
        let second = ctx.carts.add_item(user, new_item(product.uuid, 2)?).await?;

        assert_eq!(second.uuid, first.uuid);
        assert_eq!(second.quantity.get(), 3);

        let cart = ctx.carts.get_cart(user).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.totals.unit_count, 3);

        Ok(())
    }

    #[tokio::test]
    async fn adding_unknown_product_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("unknown@example.com").await?;

        let result = ctx
            .carts
            .add_item(user, new_item(ProductUuid::new(), 1)?)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound for unknown product, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn adding_deleted_product_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("deleted@example.com").await?;
        let product = ctx.create_product(5_00, 0).await?;

        ctx.products.delete_product(product.uuid).await?;

        let result = ctx.carts.add_item(user, new_item(product.uuid, 1)?).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound for deleted product, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn merge_into_empty_remote_creates_lines() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("merge-empty@example.com").await?;
        let product = ctx.create_product(3_00, 0).await?;

        let cart = ctx
            .carts
            .merge_items(user, vec![new_item(product.uuid, 2)?])
            .await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_uuid, product.uuid);
        assert_eq!(cart.items[0].quantity.get(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn merge_adds_to_existing_remote_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("merge-add@example.com").await?;
        let product = ctx.create_product(3_00, 0).await?;

        ctx.carts.add_item(user, new_item(product.uuid, 3)?).await?;

        let cart = ctx
            .carts
            .merge_items(user, vec![new_item(product.uuid, 2)?])
            .await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity.get(), 5);
        assert_eq!(cart.totals.gross, 15_00);

        Ok(())
    }

    #[tokio::test]
    async fn merge_with_unknown_product_applies_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("merge-fail@example.com").await?;
        let product = ctx.create_product(3_00, 0).await?;

        ctx.carts.add_item(user, new_item(product.uuid, 1)?).await?;

        let result = ctx
            .carts
            .merge_items(
                user,
                vec![new_item(product.uuid, 4)?, new_item(ProductUuid::new(), 1)?],
            )
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let cart = ctx.carts.get_cart(user).await?;

        assert_eq!(cart.items[0].quantity.get(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn set_quantity_replaces_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("set@example.com").await?;
        let product = ctx.create_product(1_00, 0).await?;

        let item = ctx.carts.add_item(user, new_item(product.uuid, 1)?).await?;

        let updated = ctx
            .carts
            .update_item(user, item.uuid, QuantityChange::Set(quantity(7)?))
            .await?;

        let again = ctx
            .carts
            .update_item(user, item.uuid, QuantityChange::Set(quantity(7)?))
            .await?;

        assert_eq!(updated.map(|i| i.quantity.get()), Some(7));
        assert_eq!(again.map(|i| i.quantity.get()), Some(7));

        Ok(())
    }

    #[tokio::test]
    async fn adjusting_to_zero_deletes_the_line() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("adjust@example.com").await?;
        let product = ctx.create_product(1_00, 0).await?;

        let item = ctx.carts.add_item(user, new_item(product.uuid, 1)?).await?;

        let updated = ctx
            .carts
            .update_item(user, item.uuid, QuantityChange::Adjust(-1))
            .await?;

        assert!(updated.is_none());

        let cart = ctx.carts.get_cart(user).await?;

        assert!(cart.items.is_empty());
        assert_eq!(cart.totals.gross, 0);

        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_item_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("update-missing@example.com").await?;

        let result = ctx
            .carts
            .update_item(user, CartItemUuid::new(), QuantityChange::Adjust(1))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_twice_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("remove@example.com").await?;
        let product = ctx.create_product(1_00, 0).await?;

        let item = ctx.carts.add_item(user, new_item(product.uuid, 1)?).await?;

        ctx.carts.remove_item(user, item.uuid).await?;

        let result = ctx.carts.remove_item(user, item.uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_only_affects_the_caller() -> TestResult {
        let ctx = TestContext::new().await;
        let alice = ctx.create_user("alice@example.com").await?;
        let bob = ctx.create_user("bob@example.com").await?;
        let product = ctx.create_product(2_00, 0).await?;

        ctx.carts.add_item(alice, new_item(product.uuid, 1)?).await?;
        ctx.carts.add_item(bob, new_item(product.uuid, 2)?).await?;

        ctx.carts.clear_cart(alice).await?;

        assert!(matches!(
            ctx.carts.get_cart(alice).await,
            Err(CartsServiceError::NotFound)
        ));

        let bobs = ctx.carts.get_cart(bob).await?;

        assert_eq!(bobs.items.len(), 1);
        assert_eq!(bobs.items[0].quantity.get(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn items_are_not_visible_to_other_users() -> TestResult {
        let ctx = TestContext::new().await;
        let alice = ctx.create_user("owner@example.com").await?;
        let mallory = ctx.create_user("mallory@example.com").await?;
        let product = ctx.create_product(2_00, 0).await?;

        let item = ctx.carts.add_item(alice, new_item(product.uuid, 1)?).await?;

        let result = ctx
            .carts
            .update_item(mallory, item.uuid, QuantityChange::Adjust(5))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound for another user's item, got {result:?}"
        );

        let result = ctx.carts.remove_item(mallory, item.uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound for another user's item, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn totals_apply_product_discounts() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("discount@example.com").await?;
        let full = ctx.create_product(7_99, 0).await?;
        let half = ctx.create_product(3_33, 50).await?;

        ctx.carts.add_item(user, new_item(full.uuid, 1)?).await?;
        ctx.carts.add_item(user, new_item(half.uuid, 3)?).await?;

        let cart = ctx.carts.get_cart(user).await?;

        // 799 + 999 gross; 799 + 499.5 net, rounded once.
        assert_eq!(cart.totals.gross, 17_98);
        assert_eq!(cart.totals.net, 12_99);
        assert_eq!(cart.totals.line_count, 2);
        assert_eq!(cart.totals.unit_count, 4);

        Ok(())
    }
}
