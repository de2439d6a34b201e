//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub preview_service_url: String,
    pub preview_api_key: Option<String>,
    pub preview_timeout: Duration,
    pub cors_origin: String,
    pub session_ttl_days: i64,
    pub wizard_idle_timeout: Duration,
    pub max_wizards_per_user: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Preview Generation Service ---
        let preview_service_url = lookup("PREVIEW_SERVICE_URL")
            .ok_or_else(|| ConfigError::MissingVar("PREVIEW_SERVICE_URL".to_string()))?;
        let preview_api_key = lookup("PREVIEW_API_KEY").filter(|k| !k.is_empty());
        let preview_timeout_secs = parse_number::<u64>(&lookup, "PREVIEW_TIMEOUT_SECS", 120)?;

        // --- Web Settings ---
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());
        let session_ttl_days = parse_number::<i64>(&lookup, "SESSION_TTL_DAYS", 30)?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be positive".to_string(),
            ));
        }

        // --- Open Wizards ---
        let wizard_idle_secs = parse_number::<u64>(&lookup, "WIZARD_IDLE_TIMEOUT_SECS", 1800)?;
        let max_wizards_per_user = parse_number::<usize>(&lookup, "MAX_WIZARDS_PER_USER", 5)?;
        if wizard_idle_secs == 0 || max_wizards_per_user == 0 {
            return Err(ConfigError::InvalidValue(
                "WIZARD_IDLE_TIMEOUT_SECS/MAX_WIZARDS_PER_USER".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            preview_service_url,
            preview_api_key,
            preview_timeout: Duration::from_secs(preview_timeout_secs),
            cors_origin,
            session_ttl_days,
            wizard_idle_timeout: Duration::from_secs(wizard_idle_secs),
            max_wizards_per_user,
        })
    }
}

fn parse_number<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
