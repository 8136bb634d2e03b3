//! Store Config

use clap::Args;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

/// Unsupported store currency code.
#[derive(Debug, Error)]
#[error("unknown ISO 4217 currency code {0:?}")]
pub struct UnknownCurrency(pub String);

/// Storefront settings.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// ISO 4217 code of the currency all prices are held in
    #[arg(long = "store-currency", env = "STORE_CURRENCY", default_value = "GBP")]
    pub currency_code: String,
}

impl StoreConfig {
    /// Resolve the configured currency code.
    ///
    /// # Errors
    ///
    /// Returns an error when the code is not a known ISO 4217 currency.
    pub fn currency(&self) -> Result<&'static Currency, UnknownCurrency> {
        iso::find(&self.currency_code.to_ascii_uppercase())
            .ok_or_else(|| UnknownCurrency(self.currency_code.clone()))
    }
}
