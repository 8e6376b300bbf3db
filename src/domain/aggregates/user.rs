//! User Aggregate
//!
//! A user document owns everything except products: addresses, cart,
//! favorites and orders are embedded and have no lifecycle of their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::domain::aggregates::cart::Cart;
use crate::domain::aggregates::order::{Order, OrderError};
use crate::domain::aggregates::product::ProductSnapshot;
use crate::domain::value_objects::Email;

pub const MAX_ADDRESSES: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub password_hash: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub favorites: Vec<ProductSnapshot>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Public part of a user, embedded in comments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRole { Home, Work }

impl AddressRole {
    pub const ALL: [AddressRole; MAX_ADDRESSES] = [AddressRole::Home, AddressRole::Work];
}

impl std::fmt::Display for AddressRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::Home => write!(f, "home"), Self::Work => write!(f, "work") }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub role: AddressRole,
    pub house: String,
    pub street: String,
    pub city: String,
    pub pin_code: String,
}

/// Address payload. `role` is only honoured when adding; editing takes the
/// role from the route.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AddressFields {
    #[validate(length(min = 1, max = 100))]
    pub house: String,
    #[validate(length(min = 1, max = 100))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub pin_code: String,
    #[serde(default)]
    pub role: Option<AddressRole>,
}

impl Address {
    fn new(role: AddressRole, fields: AddressFields) -> Self {
        Self { role, house: fields.house, street: fields.street, city: fields.city, pin_code: fields.pin_code }
    }
}

impl User {
    pub fn new(user_id: Uuid, first_name: impl Into<String>, last_name: impl Into<String>, email: Email, phone: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id, first_name: first_name.into(), last_name: last_name.into(), email, phone: phone.into(),
            password_hash: password_hash.into(), token: String::new(), refresh_token: String::new(),
            created_at: now, updated_at: now,
            addresses: vec![], cart: Cart::new(), favorites: vec![], orders: vec![],
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile { user_id: self.user_id, first_name: self.first_name.clone(), last_name: self.last_name.clone(), email: self.email.to_string() }
    }

    pub fn set_tokens(&mut self, token: impl Into<String>, refresh_token: impl Into<String>) {
        self.token = token.into();
        self.refresh_token = refresh_token.into();
    }

    pub fn address(&self, role: AddressRole) -> Option<&Address> { self.addresses.iter().find(|a| a.role == role) }

    /// Adds an address in the requested role, or the first free one.
    pub fn add_address(&mut self, fields: AddressFields) -> Result<Address, UserError> {
        if self.addresses.len() >= MAX_ADDRESSES { return Err(UserError::AddressLimitReached); }
        let role = match fields.role {
            Some(role) if self.address(role).is_some() => return Err(UserError::AddressRoleTaken(role)),
            Some(role) => role,
            None => AddressRole::ALL.into_iter().find(|r| self.address(*r).is_none()).ok_or(UserError::AddressLimitReached)?,
        };
        let address = Address::new(role, fields);
        self.addresses.push(address.clone());
        Ok(address)
    }

    pub fn set_address(&mut self, role: AddressRole, fields: AddressFields) -> Result<Address, UserError> {
        let slot = self.addresses.iter_mut().find(|a| a.role == role).ok_or(UserError::AddressNotFound(role))?;
        *slot = Address::new(role, fields);
        Ok(slot.clone())
    }

    pub fn clear_addresses(&mut self) { self.addresses.clear(); }

    /// Favorites hold at most one snapshot per product; re-adding refreshes it.
    pub fn add_favorite(&mut self, snapshot: ProductSnapshot) {
        self.favorites.retain(|f| f.product_id != snapshot.product_id);
        self.favorites.push(snapshot);
    }

    pub fn remove_favorite(&mut self, product_id: Uuid) -> usize {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.product_id != product_id);
        before - self.favorites.len()
    }

    /// Turns the whole cart into one cash-on-delivery order and empties it.
    pub fn checkout_cart(&mut self) -> Result<&Order, UserError> {
        if self.cart.is_empty() { return Err(UserError::EmptyCart); }
        let order = Order::cash_on_delivery(self.cart.take())?;
        Ok(self.place_order(order))
    }

    pub fn place_order(&mut self, order: Order) -> &Order {
        self.orders.push(order);
        &self.orders[self.orders.len() - 1]
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Mutations a store applies to a single user document atomically.
#[derive(Clone, Debug)]
pub enum UserUpdate {
    AddAddress(AddressFields),
    SetAddress(AddressRole, AddressFields),
    ClearAddresses,
    AddFavorite(ProductSnapshot),
    RemoveFavorite(Uuid),
    AddToCart(ProductSnapshot),
    RemoveFromCart(Uuid),
    CheckoutCart,
    PlaceOrder(Order),
    SetTokens { token: String, refresh_token: String },
}

impl UserUpdate {
    pub fn apply(self, user: &mut User) -> Result<(), UserError> {
        match self {
            Self::AddAddress(fields) => { user.add_address(fields)?; }
            Self::SetAddress(role, fields) => { user.set_address(role, fields)?; }
            Self::ClearAddresses => user.clear_addresses(),
            Self::AddFavorite(snapshot) => user.add_favorite(snapshot),
            Self::RemoveFavorite(id) => { user.remove_favorite(id); }
            Self::AddToCart(snapshot) => user.cart.add_item(snapshot),
            Self::RemoveFromCart(id) => { user.cart.remove_product(id); }
            Self::CheckoutCart => { user.checkout_cart()?; }
            Self::PlaceOrder(order) => { user.place_order(order); }
            Self::SetTokens { token, refresh_token } => user.set_tokens(token, refresh_token),
        }
        user.touch();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserError { AddressLimitReached, AddressRoleTaken(AddressRole), AddressNotFound(AddressRole), EmptyCart }

impl From<OrderError> for UserError {
    fn from(_: OrderError) -> Self { Self::EmptyCart }
}

impl std::error::Error for UserError {}
impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddressLimitReached => write!(f, "at most {MAX_ADDRESSES} addresses are allowed"),
            Self::AddressRoleTaken(role) => write!(f, "a {role} address already exists"),
            Self::AddressNotFound(role) => write!(f, "no {role} address"),
            Self::EmptyCart => write!(f, "cart is empty"),
        }
    }
}
