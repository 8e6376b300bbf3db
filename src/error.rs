//! Error types shared by services, stores and handlers.
//!
//! Every handler returns `Result<T, EcommerceError>`; the `IntoResponse` impl
//! turns an error into a JSON body with the matching status code. Store
//! failures are logged and reported as a generic server error.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::domain::{EmailError, ProductError, UserError};
use crate::services::auth::AuthError;

#[derive(Error, Debug)]
pub enum EcommerceError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Unknown id.
    #[error("{0} not found")]
    NotFound(String),

    /// Duplicate email/phone, address cap reached.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the underlying document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store operation `{operation}` exceeded {timeout:?}")]
    Timeout { operation: &'static str, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, EcommerceError>;

impl EcommerceError {
    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
    pub fn not_found(what: impl Into<String>) -> Self { Self::NotFound(what.into()) }
    pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Auth(err) if err.is_client_error() => StatusCode::UNAUTHORIZED,
            Self::Auth(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for EcommerceError {
    fn from(err: sqlx::Error) -> Self { Self::Store(StoreError::Database(err)) }
}

impl From<validator::ValidationErrors> for EcommerceError {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

impl From<EmailError> for EcommerceError {
    fn from(err: EmailError) -> Self { Self::Validation(err.to_string()) }
}

impl From<UserError> for EcommerceError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::AddressLimitReached | UserError::AddressRoleTaken(_) => Self::Conflict(err.to_string()),
            UserError::AddressNotFound(role) => Self::NotFound(format!("{role} address")),
            UserError::EmptyCart => Self::Validation(err.to_string()),
        }
    }
}

impl From<ProductError> for EcommerceError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::CommentNotFound => Self::NotFound("comment".to_string()),
        }
    }
}

impl IntoResponse for EcommerceError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AddressRole;

    #[test]
    fn test_status_mapping() {
        assert_eq!(EcommerceError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(EcommerceError::not_found("user").status(), StatusCode::NOT_FOUND);
        assert_eq!(EcommerceError::from(UserError::AddressLimitReached).status(), StatusCode::CONFLICT);
        assert_eq!(EcommerceError::from(UserError::AddressNotFound(AddressRole::Work)).status(), StatusCode::NOT_FOUND);
        assert_eq!(EcommerceError::from(UserError::EmptyCart).status(), StatusCode::BAD_REQUEST);
        assert_eq!(EcommerceError::from(AuthError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(EcommerceError::from(AuthError::PasswordHash).status(), StatusCode::INTERNAL_SERVER_ERROR);
        let timeout = StoreError::Timeout { operation: "find_user", timeout: Duration::from_secs(1) };
        assert_eq!(EcommerceError::from(timeout).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(EcommerceError::not_found("product").to_string(), "product not found");
    }
}
