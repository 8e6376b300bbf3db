//! Cart and checkout.
//!
//! Checkout and instant buy are each a single atomic store update: the order
//! is created with its items already attached, and for a cart checkout the
//! cart is emptied in the same write. A failure leaves the user untouched.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Cart, Order, Price, ProductSnapshot, UserUpdate};
use crate::error::{EcommerceError, Result};
use crate::store::Store;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub total: Price,
    pub items: Vec<ProductSnapshot>,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self { total: cart.total(), items: cart.items().to_vec() }
    }
}

pub struct CartService {
    store: Arc<dyn Store>,
}

impl CartService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Append a snapshot of the product; adding twice gives two entries.
    pub async fn add_to_cart(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView> {
        let product = self.store.find_product(product_id).await?.ok_or_else(|| EcommerceError::not_found("product"))?;
        let user = self.store.update_user(user_id, UserUpdate::AddToCart(product.snapshot())).await?;
        Ok(CartView::from(&user.cart))
    }

    /// Remove every entry of the product from the cart.
    pub async fn remove_from_cart(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView> {
        let user = self.store.update_user(user_id, UserUpdate::RemoveFromCart(product_id)).await?;
        Ok(CartView::from(&user.cart))
    }

    pub async fn list_cart(&self, user_id: Uuid) -> Result<CartView> {
        let user = self.store.find_user(user_id).await?.ok_or_else(|| EcommerceError::not_found("user"))?;
        Ok(CartView::from(&user.cart))
    }

    /// Turn the whole cart into a cash-on-delivery order and empty it.
    pub async fn buy_from_cart(&self, user_id: Uuid) -> Result<Order> {
        let user = self.store.update_user(user_id, UserUpdate::CheckoutCart).await?;
        let order = user.orders.last().cloned().ok_or_else(|| EcommerceError::not_found("order"))?;
        tracing::info!(%user_id, order_id = %order.order_id, total = %order.price, items = order.item_count(), "cart checked out");
        Ok(order)
    }

    /// Order a single product without touching the cart.
    pub async fn instant_buy(&self, user_id: Uuid, product_id: Uuid) -> Result<Order> {
        let product = self.store.find_product(product_id).await?.ok_or_else(|| EcommerceError::not_found("product"))?;
        let order = Order::cash_on_delivery(vec![product.snapshot()]).map_err(|e| EcommerceError::validation(e.to_string()))?;
        self.store.update_user(user_id, UserUpdate::PlaceOrder(order.clone())).await?;
        tracing::info!(%user_id, order_id = %order.order_id, total = %order.price, "instant buy");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{seed_product, seed_user, store};

    #[tokio::test]
    async fn test_add_twice_remove_all() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let widget = seed_product(&store, "Widget", 20).await;
        let cart = CartService::new(store);

        let view = cart.add_to_cart(user.user_id, widget.product_id).await.unwrap();
        assert_eq!(view.items, vec![widget.snapshot()]);
        let view = cart.add_to_cart(user.user_id, widget.product_id).await.unwrap();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.total, Price::new(40));
        assert_eq!(cart.list_cart(user.user_id).await.unwrap(), view);

        let view = cart.remove_from_cart(user.user_id, widget.product_id).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.total, Price::ZERO);
    }

    #[tokio::test]
    async fn test_buy_from_cart() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let a = seed_product(&store, "A", 10).await;
        let b = seed_product(&store, "B", 15).await;
        let cart = CartService::new(Arc::clone(&store));
        cart.add_to_cart(user.user_id, a.product_id).await.unwrap();
        cart.add_to_cart(user.user_id, b.product_id).await.unwrap();

        let order = cart.buy_from_cart(user.user_id).await.unwrap();
        assert_eq!(order.price, Price::new(25));
        assert_eq!(order.order_list, vec![a.snapshot(), b.snapshot()]);
        assert!(order.payment_method.cod);
        assert!(cart.list_cart(user.user_id).await.unwrap().items.is_empty());

        let stored = store.find_user(user.user_id).await.unwrap().unwrap();
        assert_eq!(stored.orders, vec![order]);
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_rejected() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let cart = CartService::new(Arc::clone(&store));
        assert!(matches!(cart.buy_from_cart(user.user_id).await, Err(EcommerceError::Validation(_))));
        assert!(store.find_user(user.user_id).await.unwrap().unwrap().orders.is_empty());
    }

    #[tokio::test]
    async fn test_orders_keep_snapshot_after_product_deleted() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let widget = seed_product(&store, "Widget", 20).await;
        let cart = CartService::new(Arc::clone(&store));
        cart.add_to_cart(user.user_id, widget.product_id).await.unwrap();
        cart.buy_from_cart(user.user_id).await.unwrap();
        store.delete_product(widget.product_id).await.unwrap();

        let stored = store.find_user(user.user_id).await.unwrap().unwrap();
        assert_eq!(stored.orders[0].order_list[0].product_name, "Widget");
    }

    #[tokio::test]
    async fn test_instant_buy_bypasses_cart() {
        let store = store();
        let user = seed_user(&store, "alice@example.com", "5550100").await;
        let widget = seed_product(&store, "Widget", 20).await;
        let gadget = seed_product(&store, "Gadget", 7).await;
        let cart = CartService::new(Arc::clone(&store));
        cart.add_to_cart(user.user_id, gadget.product_id).await.unwrap();

        let order = cart.instant_buy(user.user_id, widget.product_id).await.unwrap();
        assert_eq!(order.price, Price::new(20));
        assert_eq!(order.order_list, vec![widget.snapshot()]);
        assert_eq!(cart.list_cart(user.user_id).await.unwrap().items, vec![gadget.snapshot()]);

        assert!(matches!(cart.instant_buy(user.user_id, Uuid::now_v7()).await, Err(EcommerceError::NotFound(_))));
    }
}
