//! Product catalog: admin inserts, listing, name search and deletion.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::domain::{NewProduct, Product};
use crate::error::{EcommerceError, Result};
use crate::store::Store;

pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        new.validate()?;
        let product = Product::create(new);
        self.store.insert_products(std::slice::from_ref(&product)).await?;
        tracing::info!(product_id = %product.product_id, name = %product.product_name, "product created");
        Ok(product)
    }

    /// Insert a batch of products; either all are stored or none.
    pub async fn create_products(&self, batch: Vec<NewProduct>) -> Result<Vec<Product>> {
        if batch.is_empty() {
            return Err(EcommerceError::validation("no products supplied"));
        }
        for new in &batch {
            new.validate()?;
        }
        let products: Vec<Product> = batch.into_iter().map(Product::create).collect();
        self.store.insert_products(&products).await?;
        tracing::info!(count = products.len(), "products created");
        Ok(products)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.store.list_products().await
    }

    /// Case-insensitive substring search. A blank query is an error rather
    /// than "match everything".
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EcommerceError::validation("search query is empty"));
        }
        self.store.search_products(query).await
    }

    /// Delete the product and pull it from all favorites. Carts and placed
    /// orders keep their snapshots.
    pub async fn delete_product(&self, product_id: Uuid) -> Result<()> {
        if !self.store.delete_product(product_id).await? {
            return Err(EcommerceError::not_found("product"));
        }
        tracing::info!(%product_id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Price, UserUpdate};
    use crate::services::testing::{seed_user, store};

    fn new_product(name: &str, price: u64) -> NewProduct {
        NewProduct { product_name: name.into(), price: Price::new(price), rating: 4, image: String::new() }
    }

    #[tokio::test]
    async fn test_create_and_search() {
        let catalog = CatalogService::new(store());
        let widget = catalog.create_product(new_product("Widget", 20)).await.unwrap();
        assert!(widget.comments.is_empty());
        catalog.create_products(vec![new_product("Gadget", 5), new_product("Mega WIDGET", 50)]).await.unwrap();

        assert_eq!(catalog.list_products().await.unwrap().len(), 3);
        let found: Vec<_> = catalog.search_products("widget").await.unwrap().into_iter().map(|p| p.product_name).collect();
        assert_eq!(found, ["Widget", "Mega WIDGET"]);
        assert!(catalog.search_products("sprocket").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_is_error() {
        let catalog = CatalogService::new(store());
        assert!(matches!(catalog.search_products("  ").await, Err(EcommerceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_invalid_batch_inserts_nothing() {
        let catalog = CatalogService::new(store());
        let err = catalog.create_products(vec![new_product("Gadget", 5), new_product("", 1)]).await.unwrap_err();
        assert!(matches!(err, EcommerceError::Validation(_)));
        assert!(catalog.list_products().await.unwrap().is_empty());
        assert!(matches!(catalog.create_products(vec![]).await, Err(EcommerceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_product_cascades_favorites() {
        let store = store();
        let catalog = CatalogService::new(Arc::clone(&store));
        let widget = catalog.create_product(new_product("Widget", 20)).await.unwrap();
        let alice = seed_user(&store, "alice@example.com", "5550100").await;
        let bob = seed_user(&store, "bob@example.com", "5550101").await;
        for user in [&alice, &bob] {
            store.update_user(user.user_id, UserUpdate::AddFavorite(widget.snapshot())).await.unwrap();
        }

        catalog.delete_product(widget.product_id).await.unwrap();

        assert!(catalog.list_products().await.unwrap().is_empty());
        for user in [&alice, &bob] {
            assert!(store.find_user(user.user_id).await.unwrap().unwrap().favorites.is_empty());
        }
        assert!(matches!(catalog.delete_product(widget.product_id).await, Err(EcommerceError::NotFound(_))));
    }
}
