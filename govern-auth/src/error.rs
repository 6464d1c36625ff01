//! Error types for session operations
//!
//! This module defines the errors that can occur while establishing a
//! session, validating an access token, or reading the current principal.

use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No authenticated principal is available
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Access token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Access token is invalid (malformed, bad signature, etc.)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is missing a required claim
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// The session was revoked by the provider
    #[error("Session revoked")]
    SessionRevoked,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Expired or missing sessions are routine and only warrant a redirect
    /// to sign-in.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::ConfigError(_))
    }

    /// Whether the user has to sign in again to recover.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated
                | AuthError::TokenExpired
                | AuthError::InvalidToken(_)
                | AuthError::MissingClaim(_)
                | AuthError::SessionRevoked
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::MissingClaim(_) => "MISSING_CLAIM",
            AuthError::SessionRevoked => "SESSION_REVOKED",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
        }
    }
}
