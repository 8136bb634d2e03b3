//! Bazaar Client
//!
//! The storefront's cart state layer. Anonymous visitors keep their cart in local storage; signed
//! in customers use the server cart. On login the anonymous cart is merged into the server cart
//! once, and any 401 or 403 from the server drops the session back to the local cart.

pub mod config;
pub mod error;
pub mod local;
pub mod merge;
pub mod product;
pub mod remote;
pub mod repository;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;

#[cfg(test)]
mod test_helpers;

pub use config::ClientConfig;
pub use error::ClientError;
pub use store::CartStore;
