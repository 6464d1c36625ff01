//! Remote store configuration.
//!
//! Configuration is loaded from environment variables with defaults that
//! point at a local development stack.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default store URL for local development.
pub const DEFAULT_STORE_URL: &str = "http://127.0.0.1:54321";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Remote store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store (e.g., "https://project.example.co").
    pub base_url: String,

    /// Public anon key, sent as `apikey` on every request.
    pub anon_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum attempts for a failed resolution.
    pub max_retries: u32,
}

impl Default for StoreConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_string(),
            anon_key: None,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl StoreConfig {
    /// Create a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the anon key.
    pub fn with_anon_key(mut self, anon_key: impl Into<String>) -> Self {
        self.anon_key = Some(anon_key.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GOVERN_STORE_URL`: store URL (default: http://127.0.0.1:54321)
    /// - `GOVERN_STORE_ANON_KEY`: public anon key
    /// - `GOVERN_STORE_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    /// - `GOVERN_STORE_MAX_RETRIES`: maximum resolution attempts (default: 3)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: std::env::var("GOVERN_STORE_URL").unwrap_or(default.base_url),
            anon_key: std::env::var("GOVERN_STORE_ANON_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            timeout_secs: std::env::var("GOVERN_STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            max_retries: std::env::var("GOVERN_STORE_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_retries),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Validate that the configuration is usable outside local development.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.anon_key.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "GOVERN_STORE_ANON_KEY".to_string(),
            ));
        }
        if !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "GOVERN_STORE_URL".to_string(),
                message: "must use https".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "GOVERN_STORE_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
