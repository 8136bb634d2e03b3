//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use tracing::info;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        carts::{
            repositories::{PgCartItemsRepository, PgCartsRepository},
            service::cart_totals,
        },
        orders::{
            errors::OrdersServiceError,
            records::{OrderItemRecord, OrderRecord, OrderStatus, OrderUuid},
            repository::{OrderAmounts, PgOrdersRepository},
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    currency: &'static Currency,
    repository: PgOrdersRepository,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency) -> Self {
        Self {
            db,
            currency,
            repository: PgOrdersRepository::new(),
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn place_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        if self.carts_repository.find_cart(&mut tx, user).await?.is_none() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let lines = self.items_repository.get_cart_items(&mut tx, user).await?;

        if lines.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let totals = cart_totals(&lines, self.currency)?;

        let mut placed = self
            .repository
            .create_order(
                &mut tx,
                order,
                user,
                OrderAmounts {
                    currency: totals.currency,
                    gross: u64::try_from(totals.gross)?,
                    net: u64::try_from(totals.net)?,
                    unit_count: totals.unit_count,
                },
            )
            .await?;

        for (position, line) in lines.iter().enumerate() {
            let item = self
                .repository
                .create_order_item(&mut tx, placed.uuid, i32::try_from(position)?, line)
                .await?;

            placed.items.push(item);
        }

        self.carts_repository.delete_cart(&mut tx, user).await?;

        tx.commit().await?;

        info!(
            user_uuid = %user,
            order_uuid = %placed.uuid,
            net = placed.net,
            "placed order"
        );

        Ok(placed)
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let mut orders = self.repository.list_orders(&mut tx, user).await?;
        let items = self.repository.list_order_items(&mut tx, user).await?;

        tx.commit().await?;

        let mut by_order: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for item in items {
            by_order.entry(item.order_uuid).or_default().push(item);
        }

        for order in &mut orders {
            order.items = by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }

    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let mut record = self.repository.get_order(&mut tx, user, order).await?;

        record.items = self.repository.get_order_items(&mut tx, user, order).await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let current = self.repository.lock_order(&mut tx, user, order).await?;

        if current.status != OrderStatus::Placed {
            return Err(OrdersServiceError::InvalidState);
        }

        let mut cancelled = self
            .repository
            .update_order_status(&mut tx, order, OrderStatus::Cancelled)
            .await?;

        cancelled.items = self.repository.get_order_items(&mut tx, user, order).await?;

        tx.commit().await?;

        Ok(cancelled)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Convert the user's cart into an order and delete the cart.
    async fn place_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Retrieve one of the user's orders.
    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel a placed order.
    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
