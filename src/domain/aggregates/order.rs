//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::product::ProductSnapshot;
use crate::domain::value_objects::Price;

/// A placed order. Header and items are always created together; there is
/// no later lifecycle (shipping, cancellation, refunds).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub ordered_at: DateTime<Utc>,
    pub price: Price,
    pub payment_method: PaymentMethod,
    pub order_list: Vec<ProductSnapshot>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub digital: bool,
    pub cod: bool,
}

impl PaymentMethod {
    pub fn cash_on_delivery() -> Self { Self { digital: false, cod: true } }
}

impl Order {
    /// Builds a cash-on-delivery order priced at the sum of its items.
    pub fn cash_on_delivery(items: Vec<ProductSnapshot>) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        Ok(Self {
            order_id: Uuid::now_v7(),
            ordered_at: Utc::now(),
            price: items.iter().map(|i| &i.price).sum(),
            payment_method: PaymentMethod::cash_on_delivery(),
            order_list: items,
        })
    }

    pub fn item_count(&self) -> usize { self.order_list.len() }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "order has no items") }
}
