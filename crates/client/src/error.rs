//! Client errors

use bazaar::{
    cart::CartError, discounts::DiscountError, quantity::QuantityError, totals::TotalsError,
};
use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by cart operations in either mode.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the request body.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Quantities must be at least one.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Discounts run from 0 to 100 percent.
    #[error("invalid discount: {0}")]
    InvalidDiscount(#[from] DiscountError),

    /// Price does not fit in signed minor units.
    #[error("price {0} is out of range")]
    InvalidPrice(u64),

    /// The cart or line does not exist.
    #[error("cart or line not found")]
    NotFound,

    /// The server refused the credentials (401 or 403).
    #[error("request not authorised (status {0})")]
    Unauthorized(u16),

    /// The request never got a response.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Any other non-success response.
    #[error("server responded with {status}: {body}")]
    Server {
        /// HTTP status code
        status: u16,

        /// Response body as text
        body: String,
    },

    /// The local cart could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A cart rule was broken, such as mixing currencies.
    #[error(transparent)]
    Cart(CartError),

    /// The server applied the change but the cart could not be read back.
    #[error("change applied but the cart could not be reloaded: {0}")]
    Reload(#[source] Box<ClientError>),

    /// Totals could not be computed.
    #[error(transparent)]
    Totals(#[from] TotalsError),
}

impl ClientError {
    /// Whether the session should be dropped in favour of the local cart.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthorized(_) => true,
            Self::Reload(source) => source.is_unauthorized(),
            _ => false,
        }
    }

    /// Whether the server accepted the change before the error occurred.
    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Reload(_))
    }
}

impl From<CartError> for ClientError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::LineNotFound => Self::NotFound,
            CartError::Quantity(error) => Self::InvalidQuantity(error),
            CartError::Totals(error) => Self::Totals(error),
            other => Self::Cart(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lines_surface_as_not_found() {
        assert!(matches!(
            ClientError::from(CartError::LineNotFound),
            ClientError::NotFound
        ));
    }

    #[test]
    fn only_401_and_403_are_unauthorized() {
        assert!(ClientError::Unauthorized(401).is_unauthorized());
        assert!(ClientError::Unauthorized(403).is_unauthorized());
        assert!(!ClientError::NotFound.is_unauthorized());
        assert!(
            !ClientError::Server {
                status: 500,
                body: String::new()
            }
            .is_unauthorized()
        );
    }

    #[test]
    fn reload_failures_keep_the_cause_and_count_as_applied() {
        let error = ClientError::Reload(Box::new(ClientError::Unauthorized(401)));

        assert!(error.is_unauthorized());
        assert!(error.was_applied());
        assert!(!ClientError::Unauthorized(401).was_applied());
    }
}
