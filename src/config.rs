//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;

use crate::services::dashboard_cache::MAX_TTL_SECS;

/// Minimum JWT signing key length in bytes (HS256).
const MIN_JWT_KEY_LEN: usize = 32;
const DEFAULT_DASHBOARD_CACHE_TTL_SECS: u64 = 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// SQLite database file (":memory:" for an ephemeral store)
    pub database_path: String,
    /// How long a computed dashboard stays cached, in seconds
    pub dashboard_cache_ttl_secs: u64,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests: in-memory database and a fixed signing key.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            database_path: ":memory:".to_string(),
            dashboard_cache_ttl_secs: 60,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .trim()
            .as_bytes()
            .to_vec();
        if jwt_signing_key.len() < MIN_JWT_KEY_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SIGNING_KEY",
                reason: format!("must be at least {} bytes", MIN_JWT_KEY_LEN),
            });
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: "PORT",
                    reason: "must be a port number".to_string(),
                })?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "gym-tracker.db".to_string()),
            dashboard_cache_ttl_secs: dashboard_cache_ttl_from_env()?,
            jwt_signing_key,
        })
    }
}

fn dashboard_cache_ttl_from_env() -> Result<u64, ConfigError> {
    let Ok(raw) = env::var("DASHBOARD_CACHE_TTL_SECS") else {
        return Ok(DEFAULT_DASHBOARD_CACHE_TTL_SECS);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs <= MAX_TTL_SECS => Ok(secs),
        _ => Err(ConfigError::Invalid {
            name: "DASHBOARD_CACHE_TTL_SECS",
            reason: format!("must be a number of seconds up to {}", MAX_TTL_SECS),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
