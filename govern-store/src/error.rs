//! Remote store errors

use thiserror::Error;

/// Remote store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed (connection refused, timeout, TLS, ...).
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The store returned an error response.
    #[error("Store error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the store.
        message: String,
    },

    /// The response body could not be decoded into rows.
    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    /// The store rejected the credentials.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The store is not reachable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for remote store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::RequestFailed(e) => e.is_timeout() || e.is_connect(),
            StoreError::ApiError { status, .. } => *status >= 500 || *status == 429,
            StoreError::Unavailable(_) => true,
            StoreError::InvalidResponse(_) | StoreError::AuthenticationFailed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Unavailable("down".into()).is_transient());
        assert!(StoreError::ApiError {
            status: 503,
            message: "busy".into()
        }
        .is_transient());
        assert!(StoreError::ApiError {
            status: 429,
            message: "slow down".into()
        }
        .is_transient());
        assert!(!StoreError::ApiError {
            status: 400,
            message: "bad filter".into()
        }
        .is_transient());
        assert!(!StoreError::InvalidResponse("not json".into()).is_transient());
        assert!(!StoreError::AuthenticationFailed.is_transient());
    }
}
