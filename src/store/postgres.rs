//! `PostgreSQL` document store.
//!
//! # Tables
//!
//! - `users` - one JSONB document per user; `email` and `phone` are lifted
//!   into unique columns
//! - `products` - one JSONB document per product, `seq` gives listing order
//!
//! Document mutations run in a transaction holding the row lock
//! (`SELECT ... FOR UPDATE`). Every operation is bounded by the configured
//! timeout and fails with `StoreError::Timeout` when it expires.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::domain::{Email, Product, ProductUpdate, User, UserUpdate};
use crate::error::{EcommerceError, Result, StoreError};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Create a connection pool and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(database_url: &SecretString, max_connections: u32, timeout: Duration) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self::new(pool, timeout))
    }

    /// Apply pending migrations from `migrations/`.
    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.timeout, "store operation timed out");
                Err(StoreError::Timeout { operation, timeout: self.timeout }.into())
            }
        }
    }
}

fn user_conflict(err: sqlx::Error) -> EcommerceError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_phone_key") => EcommerceError::conflict("Phone is already in use"),
                _ => EcommerceError::conflict("User already exists"),
            };
        }
    }
    err.into()
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        self.bounded("insert_user", async {
            sqlx::query("INSERT INTO users (user_id, email, phone, document) VALUES ($1, $2, $3, $4)")
                .bind(user.user_id)
                .bind(user.email.as_str())
                .bind(&user.phone)
                .bind(Json(user))
                .execute(&self.pool)
                .await
                .map_err(user_conflict)?;
            Ok(())
        })
        .await
    }

    async fn email_exists(&self, email: &Email) -> Result<bool> {
        self.bounded("email_exists", async {
            let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;
            Ok(exists)
        })
        .await
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool> {
        self.bounded("phone_exists", async {
            let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE phone = $1)")
                .bind(phone)
                .fetch_one(&self.pool)
                .await?;
            Ok(exists)
        })
        .await
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        self.bounded("find_user", async {
            let doc = sqlx::query_scalar::<_, Json<User>>("SELECT document FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(doc.map(|Json(user)| user))
        })
        .await
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>> {
        self.bounded("find_user_by_email", async {
            let doc = sqlx::query_scalar::<_, Json<User>>("SELECT document FROM users WHERE email = $1")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;
            Ok(doc.map(|Json(user)| user))
        })
        .await
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> Result<User> {
        self.bounded("update_user", async {
            let mut tx = self.pool.begin().await?;
            let doc = sqlx::query_scalar::<_, Json<User>>("SELECT document FROM users WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
            let Json(mut user) = doc.ok_or_else(|| EcommerceError::not_found("user"))?;

            // Dropping `tx` on a rejected update rolls back and releases the lock.
            update.apply(&mut user)?;

            sqlx::query("UPDATE users SET document = $2 WHERE user_id = $1")
                .bind(user_id)
                .bind(Json(&user))
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(user)
        })
        .await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        self.bounded("delete_user", async {
            let result = sqlx::query("DELETE FROM users WHERE user_id = $1").bind(user_id).execute(&self.pool).await?;
            Ok(result.rows_affected() > 0)
        })
        .await
    }

    async fn insert_products(&self, products: &[Product]) -> Result<()> {
        self.bounded("insert_products", async {
            let mut tx = self.pool.begin().await?;
            for product in products {
                sqlx::query("INSERT INTO products (product_id, product_name, document) VALUES ($1, $2, $3)")
                    .bind(product.product_id)
                    .bind(&product.product_name)
                    .bind(Json(product))
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        self.bounded("list_products", async {
            let docs = sqlx::query_scalar::<_, Json<Product>>("SELECT document FROM products ORDER BY seq")
                .fetch_all(&self.pool)
                .await?;
            Ok(docs.into_iter().map(|Json(p)| p).collect())
        })
        .await
    }

    async fn search_products(&self, needle: &str) -> Result<Vec<Product>> {
        self.bounded("search_products", async {
            // strpos keeps LIKE wildcards in the needle literal.
            let docs = sqlx::query_scalar::<_, Json<Product>>(
                "SELECT document FROM products WHERE strpos(lower(product_name), lower($1)) > 0 ORDER BY seq",
            )
            .bind(needle)
            .fetch_all(&self.pool)
            .await?;
            Ok(docs.into_iter().map(|Json(p)| p).collect())
        })
        .await
    }

    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>> {
        self.bounded("find_product", async {
            let doc = sqlx::query_scalar::<_, Json<Product>>("SELECT document FROM products WHERE product_id = $1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(doc.map(|Json(p)| p))
        })
        .await
    }

    async fn update_product(&self, product_id: Uuid, update: ProductUpdate) -> Result<Product> {
        self.bounded("update_product", async {
            let mut tx = self.pool.begin().await?;
            let doc = sqlx::query_scalar::<_, Json<Product>>("SELECT document FROM products WHERE product_id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
            let Json(mut product) = doc.ok_or_else(|| EcommerceError::not_found("product"))?;
            update.apply(&mut product)?;
            sqlx::query("UPDATE products SET document = $2 WHERE product_id = $1")
                .bind(product_id)
                .bind(Json(&product))
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(product)
        })
        .await
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<bool> {
        self.bounded("delete_product", async {
            let mut tx = self.pool.begin().await?;
            let deleted = sqlx::query("DELETE FROM products WHERE product_id = $1")
                .bind(product_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if deleted == 0 {
                return Ok(false);
            }

            let pulled = sqlx::query(
                r#"
                UPDATE users
                SET document = jsonb_set(
                    document,
                    '{favorites}',
                    COALESCE(
                        (SELECT jsonb_agg(f.value ORDER BY f.ord)
                         FROM jsonb_array_elements(document -> 'favorites') WITH ORDINALITY AS f(value, ord)
                         WHERE f.value ->> 'product_id' <> $1),
                        '[]'::jsonb))
                WHERE document -> 'favorites' @> jsonb_build_array(jsonb_build_object('product_id', $1::text))
                "#,
            )
            .bind(product_id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();
            tx.commit().await?;

            tracing::debug!(%product_id, users = pulled, "pulled deleted product from favorites");
            Ok(true)
        })
        .await
    }
}
