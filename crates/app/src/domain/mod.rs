//! Storefront Domain Concerns

pub mod carts;
mod columns;
pub mod orders;
pub mod products;
pub mod reviews;
