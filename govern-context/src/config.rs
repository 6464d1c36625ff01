//! Context configuration.

use govern_store::{RetryConfig, StoreConfig};
use serde::{Deserialize, Serialize};

/// Active-organization context configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Backoff applied to transient resolution failures
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ContextConfig {
    /// Derive the configuration from the store settings.
    ///
    /// Uses the standard backoff with the store's attempt limit.
    pub fn from_store_config(store: &StoreConfig) -> Self {
        Self {
            retry: RetryConfig::standard().with_max_attempts(store.max_retries),
        }
    }

    /// Replace the retry behavior.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_store_config() {
        let mut store = StoreConfig::default();
        store.max_retries = 5;

        let config = ContextConfig::from_store_config(&store);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_delay, RetryConfig::standard().initial_delay);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ContextConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ContextConfig::default());
    }
}
