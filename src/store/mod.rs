//! Document store abstraction.
//!
//! Users and products are stored as whole documents. Every mutation of a
//! single document goes through [`UserUpdate`] / [`ProductUpdate`] and is
//! applied atomically: implementations load, mutate and write back under a
//! lock, so concurrent requests never observe a half-applied checkout or push
//! past the address cap.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Email, Product, ProductUpdate, User, UserUpdate};
use crate::error::Result;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the email or phone is taken.
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn email_exists(&self, email: &Email) -> Result<bool>;

    async fn phone_exists(&self, phone: &str) -> Result<bool>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>>;

    /// Apply `update` to the user atomically and return the resulting document.
    /// Fails with `NotFound` if the user does not exist.
    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> Result<User>;

    /// Returns `false` if there was no such user.
    async fn delete_user(&self, user_id: Uuid) -> Result<bool>;

    /// Insert all products or none.
    async fn insert_products(&self, products: &[Product]) -> Result<()>;

    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Case-insensitive substring match on product name.
    async fn search_products(&self, needle: &str) -> Result<Vec<Product>>;

    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>>;

    async fn update_product(&self, product_id: Uuid, update: ProductUpdate) -> Result<Product>;

    /// Delete the product and pull it from every user's favorites in one
    /// step. Carts and orders keep their snapshots. Returns `false` if there
    /// was no such product.
    async fn delete_product(&self, product_id: Uuid) -> Result<bool>;
}
