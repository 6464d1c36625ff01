//! Access token claims
//!
//! The hosted auth service issues JWT access tokens whose subject is the
//! user ID. This module defines those claims and maps them to a
//! [`Principal`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::principal::Principal;

/// Audience the auth service stamps on signed-in users' tokens.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Claims carried by a session access token.
///
/// # Example
///
/// ```rust,no_run
/// use govern_auth::claims::SessionClaims;
/// use uuid::Uuid;
///
/// let claims = SessionClaims::new(
///     Uuid::now_v7(),
///     "user@example.com",
///     chrono::Duration::hours(1),
/// );
/// let principal = claims.to_principal().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    // Standard JWT claims (RFC 7519)
    /// Subject (user ID)
    pub sub: String,

    /// Audience
    #[serde(default)]
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    // Session claims
    /// User email
    #[serde(default)]
    pub email: Option<String>,

    /// Database role the token maps to
    #[serde(default)]
    pub role: Option<String>,

    /// Session ID for session management
    #[serde(default)]
    pub session_id: Option<String>,

    /// Custom claims for extensibility
    #[serde(default, flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl SessionClaims {
    /// Create claims for a signed-in user.
    pub fn new(user_id: Uuid, email: impl Into<String>, duration: chrono::Duration) -> Self {
        let now = Utc::now();
        let exp = now + duration;

        Self {
            sub: user_id.to_string(),
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            email: Some(email.into()),
            role: Some(AUTHENTICATED_AUDIENCE.to_string()),
            session_id: Some(Uuid::new_v4().to_string()),
            custom: HashMap::new(),
        }
    }

    /// Get the user ID as UUID.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Get expiration as DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Map the claims to the session principal.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingClaim`] when `sub` is not a UUID or `email` is
    /// absent or blank.
    pub fn to_principal(&self) -> AuthResult<Principal> {
        let id = self
            .user_id()
            .ok_or_else(|| AuthError::MissingClaim("sub".to_string()))?;
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AuthError::MissingClaim("email".to_string()))?;

        Ok(Principal::new(id, email))
    }
}
