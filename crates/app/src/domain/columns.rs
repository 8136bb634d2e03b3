//! Column decoding shared by the repositories.

use bazaar::{discounts::DiscountPercent, quantity::Quantity};
use sqlx::{Row, postgres::PgRow};

/// Read a non-negative `BIGINT` minor-unit amount.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|error| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(error),
    })
}

/// Read a `SMALLINT` discount percentage.
pub(crate) fn try_get_discount(row: &PgRow, col: &str) -> Result<DiscountPercent, sqlx::Error> {
    let percent: i16 = row.try_get(col)?;

    DiscountPercent::try_from(percent).map_err(|error| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(error),
    })
}

/// Read an `INTEGER` line quantity.
pub(crate) fn try_get_quantity(row: &PgRow, col: &str) -> Result<Quantity, sqlx::Error> {
    let quantity: i32 = row.try_get(col)?;

    Quantity::try_from(i64::from(quantity)).map_err(|error| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(error),
    })
}

/// Convert an amount for binding to a `BIGINT` column.
pub(crate) fn amount_to_i64(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|error| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(error),
    })
}

/// Convert a quantity for binding to an `INTEGER` column.
pub(crate) fn quantity_to_i32(quantity: Quantity) -> Result<i32, sqlx::Error> {
    i32::try_from(quantity.get()).map_err(|error| sqlx::Error::ColumnDecode {
        index: "quantity".to_string(),
        source: Box::new(error),
    })
}
