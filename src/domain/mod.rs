//! Storefront domain: documents and the mutations applied to them.
pub mod aggregates;
pub mod value_objects;

pub use aggregates::*;
pub use value_objects::{Email, EmailError, Price};
