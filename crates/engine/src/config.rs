//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TALLY_API_BASE_URL` - Base URL of the remote catalog/sales service
//!   (e.g., `http://localhost:8000/api`)
//!
//! ## Optional
//! - `TALLY_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `TALLY_PAGE_SIZE` - Catalog page size (default: 4)

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Reference page size for the catalog view.
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the remote catalog/sales service
    pub base_url: Url,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Catalog page size for derived views
    pub page_size: usize,
}

impl EngineConfig {
    /// Build a configuration from an explicit base URL with defaults for
    /// everything else.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = required("TALLY_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("TALLY_API_BASE_URL".to_string(), e.to_string())
        })?;

        let timeout = optional_parse("TALLY_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let page_size = optional_parse("TALLY_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout),
            page_size,
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = EngineConfig::new(Url::parse("http://localhost:8000/api").unwrap());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 4);
    }
}
