//! Aggregates module
pub mod user;
pub mod product;
pub mod order;
pub mod cart;

pub use user::{Address, AddressFields, AddressRole, User, UserError, UserProfile, UserUpdate, MAX_ADDRESSES};
pub use product::{Comment, NewProduct, Product, ProductError, ProductSnapshot, ProductUpdate};
pub use order::{Order, OrderError, PaymentMethod};
pub use cart::Cart;
