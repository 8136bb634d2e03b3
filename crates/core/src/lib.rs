//! Bazaar
//!
//! Cart domain shared by the storefront server and its clients: quantities, discounts,
//! cart lines, quantity mutation and totals.

pub mod cart;
pub mod discounts;
pub mod lines;
pub mod quantity;
pub mod totals;
