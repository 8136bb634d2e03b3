//! Authentication
//!
//! Users, password verification and bearer sessions. A session carries an access token and a
//! refresh token; only their SHA-256 digests are stored.

mod errors;
mod models;
mod password;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use models::*;
pub use password::{hash_password, verify_password};
pub use service::*;
pub use token::*;
