//! Order Handlers

pub(crate) mod cancel;
pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod index;

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use bazaar::{discounts::DiscountPercent, quantity::Quantity};
    use bazaar_app::domain::{
        orders::records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderStatus, OrderUuid},
        products::records::ProductUuid,
    };

    use crate::test_helpers::TEST_USER_UUID;

    pub(super) fn make_order(uuid: OrderUuid, status: OrderStatus) -> TestResult<OrderRecord> {
        Ok(OrderRecord {
            uuid,
            user_uuid: TEST_USER_UUID,
            status,
            currency: "GBP".to_string(),
            gross: 2_500,
            net: 2_500,
            unit_count: 2,
            items: vec![OrderItemRecord {
                uuid: OrderItemUuid::new(),
                order_uuid: uuid,
                product_uuid: ProductUuid::new(),
                name: "Teapot".to_string(),
                unit_price: 1_250,
                discount: DiscountPercent::NONE,
                quantity: Quantity::new(2)?,
            }],
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        })
    }
}
