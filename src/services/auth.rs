//! Identity & auth: signed bearer tokens and password hashing.
//!
//! Tokens are HS256 JWTs carrying the user's email, names and id. Access
//! tokens live 24 hours, refresh tokens 168 hours. There is no revocation
//! list; a token is valid until it expires.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const ACCESS_TOKEN_TTL_HOURS: i64 = 24;
const REFRESH_TOKEN_TTL_HOURS: i64 = 168;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authorization token provided")]
    MissingToken,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token is expired")]
    Expired,

    #[error("login or password is incorrect")]
    InvalidCredentials,

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the caller is at fault (401) rather than the server (500).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Malformed(_) | Self::Expired | Self::InvalidCredentials)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind { Access, Refresh }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: Uuid,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Issues and validates tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            access_ttl: Duration::hours(ACCESS_TOKEN_TTL_HOURS),
            refresh_ttl: Duration::hours(REFRESH_TOKEN_TTL_HOURS),
        }
    }

    #[must_use]
    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Signs a fresh access/refresh pair for the given identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the key cannot sign, which means the
    /// secret is misconfigured.
    pub fn issue(&self, email: &str, first_name: &str, last_name: &str, uid: Uuid) -> Result<TokenPair, AuthError> {
        let token = self.sign(email, first_name, last_name, uid, TokenKind::Access, self.access_ttl)?;
        let refresh_token = self.sign(email, first_name, last_name, uid, TokenKind::Refresh, self.refresh_ttl)?;
        Ok(TokenPair { token, refresh_token })
    }

    fn sign(&self, email: &str, first_name: &str, last_name: &str, uid: Uuid, kind: TokenKind, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            uid,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Verifies signature and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed(err.to_string()),
            })
    }

    /// Like [`validate`](Self::validate) but refuses refresh tokens.
    pub fn validate_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::Malformed("refresh token cannot authorize requests".to_string()));
        }
        Ok(claims)
    }
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}
