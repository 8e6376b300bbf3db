//! Product Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::domain::aggregates::user::UserProfile;
use crate::domain::value_objects::Price;

/// Catalog entry. Comments live inside the product document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Uuid,
    pub product_name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Point-in-time copy of a product, embedded in carts, favorites and orders.
///
/// A snapshot never follows later edits to (or deletion of) its source product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: Uuid,
    pub product_name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub image: String,
}

/// Admin payload for creating a product.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    pub price: Price,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: Uuid,
    pub comment: String,
    pub user: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(body: impl Into<String>, user: UserProfile) -> Self {
        let now = Utc::now();
        Self { comment_id: Uuid::now_v7(), comment: body.into(), user, created_at: now, updated_at: now }
    }
}

impl Product {
    pub fn create(new: NewProduct) -> Self {
        Self {
            product_id: Uuid::now_v7(), product_name: new.product_name.trim().to_string(),
            price: new.price, rating: new.rating, image: new.image, comments: vec![],
        }
    }

    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.product_id, product_name: self.product_name.clone(),
            price: self.price, rating: self.rating, image: self.image.clone(),
        }
    }

    /// Case-insensitive substring match on the product name.
    pub fn name_matches(&self, needle: &str) -> bool {
        self.product_name.to_lowercase().contains(&needle.to_lowercase())
    }

    pub fn add_comment(&mut self, comment: Comment) { self.comments.push(comment); }

    pub fn remove_comment(&mut self, comment_id: Uuid) -> Result<Comment, ProductError> {
        let pos = self.comments.iter().position(|c| c.comment_id == comment_id).ok_or(ProductError::CommentNotFound)?;
        Ok(self.comments.remove(pos))
    }
}

/// Mutations a store applies to a single product document atomically.
#[derive(Clone, Debug)]
pub enum ProductUpdate {
    AddComment(Comment),
    RemoveComment(Uuid),
}

impl ProductUpdate {
    pub fn apply(self, product: &mut Product) -> Result<(), ProductError> {
        match self {
            Self::AddComment(comment) => { product.add_comment(comment); Ok(()) }
            Self::RemoveComment(id) => product.remove_comment(id).map(|_| ()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { CommentNotFound }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "comment not found") }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product::create(NewProduct { product_name: " Widget ".into(), price: Price::new(20), rating: 4, image: "widget.png".into() })
    }

    fn profile() -> UserProfile {
        UserProfile { user_id: Uuid::new_v4(), first_name: "Alice".into(), last_name: "Liddell".into(), email: "alice@example.com".into() }
    }

    #[test]
    fn test_product_create() {
        let p = widget();
        assert_eq!(p.product_name, "Widget");
        assert!(p.comments.is_empty());
        assert_eq!(p.snapshot().price, Price::new(20));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut p = widget();
        let snap = p.snapshot();
        p.price = Price::new(99);
        p.product_name = "Gadget".into();
        assert_eq!(snap.price, Price::new(20));
        assert_eq!(snap.product_name, "Widget");
    }

    #[test]
    fn test_name_matches() {
        let p = widget();
        assert!(p.name_matches("widg"));
        assert!(p.name_matches("GET"));
        assert!(!p.name_matches("gadget"));
    }

    #[test]
    fn test_comments() {
        let mut p = widget();
        let c = Comment::new("great", profile());
        assert_eq!(c.created_at, c.updated_at);
        let id = c.comment_id;
        ProductUpdate::AddComment(c).apply(&mut p).unwrap();
        ProductUpdate::AddComment(Comment::new("meh", profile())).apply(&mut p).unwrap();
        assert_eq!(p.comments.len(), 2);
        ProductUpdate::RemoveComment(id).apply(&mut p).unwrap();
        assert_eq!(p.comments.len(), 1);
        assert_eq!(p.comments[0].comment, "meh");
        assert_eq!(ProductUpdate::RemoveComment(id).apply(&mut p), Err(ProductError::CommentNotFound));
    }
}
