//! Client configuration

use std::time::Duration;

use rusty_money::iso::{self, Currency};

/// Settings shared by the cart repositories.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://shop.example.com/api`
    pub base_url: String,

    /// Per-request timeout for API calls
    pub timeout: Duration,

    /// Store currency; every price is in its minor units
    pub currency: &'static Currency,
}

impl ClientConfig {
    /// Request timeout used unless overridden.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Configuration for `base_url` with the default timeout, priced in GBP.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            currency: iso::GBP,
        }
    }

    /// Per-request timeout for the remote cart.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Currency used to price anonymous carts and render totals.
    #[must_use]
    pub fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = currency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults_and_strips_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8698/");

        assert_eq!(config.base_url, "http://localhost:8698");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.currency.iso_alpha_code, "GBP");
    }

    #[test]
    fn builders_override_defaults() {
        let config = ClientConfig::new("http://localhost")
            .with_timeout(Duration::from_secs(3))
            .with_currency(iso::EUR);

        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.currency.iso_alpha_code, "EUR");
    }
}
