//! Product comments. Each comment embeds the commenter's public profile as
//! it was when the comment was written.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Comment, ProductUpdate};
use crate::error::{EcommerceError, Result};
use crate::store::Store;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentBody {
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn add_comment(&self, product_id: Uuid, user_id: Uuid, body: CommentBody) -> Result<Comment> {
        body.validate()?;
        let user = self.store.find_user(user_id).await?.ok_or_else(|| EcommerceError::not_found("user"))?;
        let comment = Comment::new(body.comment.trim(), user.profile());
        self.store.update_product(product_id, ProductUpdate::AddComment(comment.clone())).await?;
        tracing::info!(%product_id, comment_id = %comment.comment_id, "comment added");
        Ok(comment)
    }

    /// Remove one comment from a product; the product itself is untouched.
    pub async fn delete_comment(&self, product_id: Uuid, comment_id: Uuid) -> Result<()> {
        self.store.update_product(product_id, ProductUpdate::RemoveComment(comment_id)).await?;
        tracing::info!(%product_id, %comment_id, "comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{seed_product, seed_user, store};

    #[tokio::test]
    async fn test_add_and_delete_comment() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let widget = seed_product(&store, "Widget", 20).await;
        let service = CommentService::new(Arc::clone(&store));

        let comment = service.add_comment(widget.product_id, user.user_id, CommentBody { comment: " Lovely ".into() }).await.unwrap();
        assert_eq!(comment.comment, "Lovely");
        assert_eq!(comment.user, user.profile());
        assert_eq!(comment.created_at, comment.updated_at);

        let stored = store.find_product(widget.product_id).await.unwrap().unwrap();
        assert_eq!(stored.comments, vec![comment.clone()]);

        service.delete_comment(widget.product_id, comment.comment_id).await.unwrap();
        let stored = store.find_product(widget.product_id).await.unwrap().unwrap();
        assert!(stored.comments.is_empty());
        assert_eq!(stored.product_name, "Widget");

        let err = service.delete_comment(widget.product_id, comment.comment_id).await.unwrap_err();
        assert!(matches!(err, EcommerceError::NotFound(ref what) if what == "comment"));
    }

    #[tokio::test]
    async fn test_rejects_empty_and_unknown() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let widget = seed_product(&store, "Widget", 20).await;
        let service = CommentService::new(store);
        let empty = service.add_comment(widget.product_id, user.user_id, CommentBody { comment: String::new() }).await;
        assert!(matches!(empty, Err(EcommerceError::Validation(_))));
        let missing = service.add_comment(Uuid::now_v7(), user.user_id, CommentBody { comment: "hi".into() }).await;
        assert!(matches!(missing, Err(EcommerceError::NotFound(ref what)) if what == "product"));
    }
}
