//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// E-mail address, normalised so that uniqueness checks are case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(value: impl Into<String>) -> Result<Self, EmailError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() { return Err(EmailError::Empty); }
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Self(value)),
            _ => Err(EmailError::Malformed),
        }
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Email {
    type Error = EmailError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(value) }
}

impl From<Email> for String {
    fn from(email: Email) -> Self { email.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum EmailError { Empty, Malformed }
impl std::error::Error for EmailError {}
impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "email empty"), Self::Malformed => write!(f, "email malformed") }
    }
}

/// Price in minor currency units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);
    pub fn new(amount: u64) -> Self { Self(amount) }
    pub fn amount(&self) -> u64 { self.0 }
    pub fn add(&self, other: Price) -> Price { Price(self.0.saturating_add(other.0)) }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self { iter.fold(Price::ZERO, |acc, p| acc.add(p)) }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Self { iter.copied().sum() }
}
