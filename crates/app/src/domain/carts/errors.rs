//! Carts service errors.

use std::num::TryFromIntError;

use bazaar::{quantity::QuantityError, totals::TotalsError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// `numeric_value_out_of_range`, raised when an additive upsert overflows `INTEGER`.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart item already exists")]
    AlreadyExists,

    #[error("cart or cart item not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("invalid quantity")]
    InvalidQuantity,

    #[error("invalid price value")]
    InvalidPrice(#[from] TryFromIntError),

    #[error("unable to total cart")]
    Totals(#[from] TotalsError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<QuantityError> for CartsServiceError {
    fn from(_error: QuantityError) -> Self {
        Self::InvalidQuantity
    }
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let database_error = error.as_database_error();

        if database_error
            .and_then(|database_error| database_error.code())
            .is_some_and(|code| code == NUMERIC_VALUE_OUT_OF_RANGE)
        {
            return Self::InvalidQuantity;
        }

        match database_error.map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            CartsServiceError::from(Error::RowNotFound),
            CartsServiceError::NotFound
        ));
    }

    #[test]
    fn quantity_errors_map_to_invalid_quantity() {
        assert!(matches!(
            CartsServiceError::from(QuantityError::Zero),
            CartsServiceError::InvalidQuantity
        ));
    }
}
