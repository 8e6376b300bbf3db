//! Favorites: snapshots of products a user wants to remember.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{ProductSnapshot, UserUpdate};
use crate::error::{EcommerceError, Result};
use crate::store::Store;

pub struct FavoriteService {
    store: Arc<dyn Store>,
}

impl FavoriteService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn add_favorite(&self, user_id: Uuid, product_id: Uuid) -> Result<Vec<ProductSnapshot>> {
        let product = self.store.find_product(product_id).await?.ok_or_else(|| EcommerceError::not_found("product"))?;
        let user = self.store.update_user(user_id, UserUpdate::AddFavorite(product.snapshot())).await?;
        Ok(user.favorites)
    }

    pub async fn remove_favorite(&self, user_id: Uuid, product_id: Uuid) -> Result<Vec<ProductSnapshot>> {
        let user = self.store.update_user(user_id, UserUpdate::RemoveFavorite(product_id)).await?;
        Ok(user.favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{seed_product, seed_user, store};

    #[tokio::test]
    async fn test_add_and_remove() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let widget = seed_product(&store, "Widget", 20).await;
        let service = FavoriteService::new(Arc::clone(&store));

        let favorites = service.add_favorite(user.user_id, widget.product_id).await.unwrap();
        assert_eq!(favorites, vec![widget.snapshot()]);
        assert!(service.remove_favorite(user.user_id, widget.product_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let widget = seed_product(&store, "Widget", 20).await;
        let service = FavoriteService::new(store);
        assert!(matches!(service.add_favorite(user.user_id, Uuid::now_v7()).await, Err(EcommerceError::NotFound(_))));
        assert!(matches!(service.add_favorite(Uuid::now_v7(), widget.product_id).await, Err(EcommerceError::NotFound(_))));
    }
}
