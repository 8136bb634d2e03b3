//! Carts
//!
//! Every route acts on the caller's own cart, addressed as `/cart`.

pub(crate) mod errors;
mod handlers;
pub(crate) mod items;

pub(crate) use handlers::*;
