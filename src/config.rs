//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SECRET_KEY` - Token signing secret (min 16 chars)
//! - `DATABASE_URL` - `PostgreSQL` connection string (when `STORE_BACKEND=postgres`)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8000)
//! - `STORE_BACKEND` - `postgres` or `memory` (default: postgres)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `STORE_TIMEOUT_SECS` - Deadline for each store operation (default: 10)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SECRET_KEY_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub backend: StoreBackend,
    /// Present whenever `backend` is `Postgres`.
    pub database_url: Option<SecretString>,
    pub database_max_connections: u32,
    pub secret_key: SecretString,
    pub store_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment. The binary loads
    /// `.env` before calling this.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = parse_or(&get, "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or(&get, "PORT", 8000u16)?;
        let backend = parse_or(&get, "STORE_BACKEND", StoreBackend::Postgres)?;
        let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10u32)?;
        let store_timeout = Duration::from_secs(parse_or(&get, "STORE_TIMEOUT_SECS", 10u64)?);

        let database_url = match backend {
            StoreBackend::Postgres => Some(SecretString::from(
                get("DATABASE_URL").ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            )),
            StoreBackend::Memory => get("DATABASE_URL").map(SecretString::from),
        };

        let secret_key = SecretString::from(get("SECRET_KEY").ok_or_else(|| ConfigError::MissingEnvVar("SECRET_KEY".to_string()))?);
        if secret_key.expose_secret().len() < MIN_SECRET_KEY_LENGTH {
            return Err(ConfigError::InvalidEnvVar(
                "SECRET_KEY".to_string(),
                format!("must be at least {MIN_SECRET_KEY_LENGTH} characters"),
            ));
        }

        if store_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar("STORE_TIMEOUT_SECS".to_string(), "must be positive".to_string()));
        }

        Ok(Self { host, port, backend, database_url, database_max_connections, secret_key, store_timeout })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
