//! Storefront API
//!
//! REST backend for a small online store.
//!
//! ## Features
//! - Signup and login with signed access/refresh tokens
//! - Product catalog with name search
//! - Favorites and product comments
//! - Home and work addresses
//! - Cart, checkout and instant buy (cash on delivery)

pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{EcommerceError, Result, StoreError};
pub use routes::router;
pub use state::AppState;
