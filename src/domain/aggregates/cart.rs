//! Cart Aggregate

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::product::ProductSnapshot;
use crate::domain::value_objects::Price;

/// A user's cart. Adding the same product twice yields two entries; the
/// number of entries is the quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<ProductSnapshot>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[ProductSnapshot] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn total(&self) -> Price { self.items.iter().map(|i| &i.price).sum() }

    pub fn add_item(&mut self, item: ProductSnapshot) { self.items.push(item); }

    /// Removes every entry for `product_id` and returns how many were dropped.
    pub fn remove_product(&mut self, product_id: Uuid) -> usize {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        before - self.items.len()
    }

    /// Empties the cart, handing back what was in it.
    pub fn take(&mut self) -> Vec<ProductSnapshot> { std::mem::take(&mut self.items) }
}
