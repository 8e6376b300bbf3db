//! In-process store for tests and local development.
//!
//! A single `RwLock` serialises writers, which makes every operation atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::domain::{Email, Product, ProductUpdate, User, UserUpdate};
use crate::error::{EcommerceError, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    // Insertion order is the listing order.
    products: Vec<Product>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(EcommerceError::conflict("User already exists"));
        }
        if inner.users.values().any(|u| u.phone == user.phone) {
            return Err(EcommerceError::conflict("Phone is already in use"));
        }
        inner.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn email_exists(&self, email: &Email) -> Result<bool> {
        Ok(self.inner.read().await.users.values().any(|u| &u.email == email))
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool> {
        Ok(self.inner.read().await.users.values().any(|u| u.phone == phone))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.values().find(|u| &u.email == email).cloned())
    }

    async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> Result<User> {
        let mut inner = self.inner.write().await;
        let stored = inner.users.get_mut(&user_id).ok_or_else(|| EcommerceError::not_found("user"))?;
        // Mutate a copy so a rejected update leaves the document untouched.
        let mut user = stored.clone();
        update.apply(&mut user)?;
        *stored = user.clone();
        Ok(user)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.inner.write().await.users.remove(&user_id).is_some())
    }

    async fn insert_products(&self, products: &[Product]) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(dup) = products.iter().find(|p| inner.products.iter().any(|q| q.product_id == p.product_id)) {
            return Err(EcommerceError::conflict(format!("product {} already exists", dup.product_id)));
        }
        inner.products.extend_from_slice(products);
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.inner.read().await.products.clone())
    }

    async fn search_products(&self, needle: &str) -> Result<Vec<Product>> {
        Ok(self.inner.read().await.products.iter().filter(|p| p.name_matches(needle)).cloned().collect())
    }

    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>> {
        Ok(self.inner.read().await.products.iter().find(|p| p.product_id == product_id).cloned())
    }

    async fn update_product(&self, product_id: Uuid, update: ProductUpdate) -> Result<Product> {
        let mut inner = self.inner.write().await;
        let stored = inner.products.iter_mut().find(|p| p.product_id == product_id).ok_or_else(|| EcommerceError::not_found("product"))?;
        let mut product = stored.clone();
        update.apply(&mut product)?;
        *stored = product.clone();
        Ok(product)
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|p| p.product_id != product_id);
        if inner.products.len() == before {
            return Ok(false);
        }
        for user in inner.users.values_mut() {
            user.remove_favorite(product_id);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewProduct, Price};

    fn user(email: &str, phone: &str) -> User {
        User::new(Uuid::now_v7(), "Alice", "Liddell", Email::parse(email).unwrap(), phone, "hash")
    }

    fn product(name: &str, price: u64) -> Product {
        Product::create(NewProduct { product_name: name.into(), price: Price::new(price), rating: 0, image: String::new() })
    }

    #[tokio::test]
    async fn test_unique_email_and_phone() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@example.com", "111111")).await.unwrap();
        let err = store.insert_user(&user("A@example.com", "222222")).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Conflict(_)));
        let err = store.insert_user(&user("b@example.com", "111111")).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Conflict(_)));
        assert!(store.email_exists(&Email::parse("a@example.com").unwrap()).await.unwrap());
        assert!(!store.phone_exists("222222").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_document() {
        let store = MemoryStore::new();
        let u = user("a@example.com", "111111");
        store.insert_user(&u).await.unwrap();
        let err = store.update_user(u.user_id, UserUpdate::CheckoutCart).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Validation(_)));
        assert_eq!(store.find_user(u.user_id).await.unwrap().unwrap(), u);
        let missing = store.update_user(Uuid::now_v7(), UserUpdate::ClearAddresses).await.unwrap_err();
        assert!(matches!(missing, EcommerceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_product_cascades_to_favorites_only() {
        let store = MemoryStore::new();
        let widget = product("Widget", 20);
        let gadget = product("Gadget", 5);
        store.insert_products(&[widget.clone(), gadget.clone()]).await.unwrap();
        let a = user("a@example.com", "111111");
        let b = user("b@example.com", "222222");
        store.insert_user(&a).await.unwrap();
        store.insert_user(&b).await.unwrap();
        store.update_user(a.user_id, UserUpdate::AddFavorite(widget.snapshot())).await.unwrap();
        store.update_user(a.user_id, UserUpdate::AddFavorite(gadget.snapshot())).await.unwrap();
        store.update_user(b.user_id, UserUpdate::AddFavorite(widget.snapshot())).await.unwrap();
        store.update_user(b.user_id, UserUpdate::AddToCart(widget.snapshot())).await.unwrap();

        assert!(store.delete_product(widget.product_id).await.unwrap());
        assert!(!store.delete_product(widget.product_id).await.unwrap());

        assert!(store.find_product(widget.product_id).await.unwrap().is_none());
        let a = store.find_user(a.user_id).await.unwrap().unwrap();
        let b = store.find_user(b.user_id).await.unwrap().unwrap();
        assert_eq!(a.favorites, vec![gadget.snapshot()]);
        assert!(b.favorites.is_empty());
        assert_eq!(b.cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_search_and_listing_order() {
        let store = MemoryStore::new();
        store.insert_products(&[product("Blue Widget", 1), product("Gadget", 2), product("widget XL", 3)]).await.unwrap();
        let names: Vec<_> = store.list_products().await.unwrap().into_iter().map(|p| p.product_name).collect();
        assert_eq!(names, ["Blue Widget", "Gadget", "widget XL"]);
        let found: Vec<_> = store.search_products("WIDGET").await.unwrap().into_iter().map(|p| p.product_name).collect();
        assert_eq!(found, ["Blue Widget", "widget XL"]);
    }
}
