//! Application state shared across handlers.

use std::sync::Arc;

use crate::services::{CartService, CatalogService, CommentService, FavoriteService, TokenIssuer, UserService};
use crate::store::Store;

/// Cheaply cloneable handle to the injected store and token issuer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self { inner: Arc::new(AppStateInner { store, tokens }) }
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.inner.store)
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store(), self.inner.tokens.clone())
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.store())
    }

    pub fn favorites(&self) -> FavoriteService {
        FavoriteService::new(self.store())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.store())
    }

    pub fn cart(&self) -> CartService {
        CartService::new(self.store())
    }
}
