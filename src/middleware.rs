//! Bearer-token gate for protected routes.
//!
//! The token is read from the `token` header, or from
//! `Authorization: Bearer <token>`. On success the caller's identity is
//! placed in request extensions as [`AuthUser`].

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::EcommerceError;
use crate::services::AuthError;
use crate::state::AppState;

pub const TOKEN_HEADER: &str = "token";

/// Identity of the authenticated caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, EcommerceError> {
    let claims = {
        let token = bearer_token(request.headers()).ok_or(AuthError::MissingToken)?;
        state.tokens().validate_access(token).map_err(|err| {
            tracing::debug!(error = %err, path = %request.uri().path(), "rejected token");
            err
        })?
    };
    request.extensions_mut().insert(AuthUser { user_id: claims.uid });
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let non_empty = |v: &str| !v.is_empty();
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| non_empty(v)) {
        return Some(token);
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| non_empty(v))
}
