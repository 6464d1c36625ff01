//! Access token validation
//!
//! This module validates session access tokens with the jsonwebtoken crate
//! and turns them into a [`Principal`]. Tokens are issued elsewhere; the
//! dashboard only verifies them.

use crate::claims::{SessionClaims, AUTHENTICATED_AUDIENCE};
use crate::error::{AuthError, AuthResult};
use crate::principal::Principal;
use serde::{Deserialize, Serialize};

use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};

/// JWT configuration for token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC algorithms (HS256, HS384, HS512)
    pub secret: Option<String>,

    /// Public key (PEM) for RSA algorithms
    pub public_key: Option<String>,

    /// Algorithm to use
    pub algorithm: JwtAlgorithm,

    /// Expected token issuer, unchecked when absent
    pub issuer: Option<String>,

    /// Accepted audiences
    pub audience: Vec<String>,

    /// Clock skew tolerance in seconds
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            public_key: None,
            algorithm: JwtAlgorithm::HS256,
            issuer: None,
            audience: vec![AUTHENTICATED_AUDIENCE.to_string()],
            leeway_secs: 30,
        }
    }
}

/// Supported JWT algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
            JwtAlgorithm::RS256 => Algorithm::RS256,
        }
    }
}

/// Validates access tokens.
pub struct TokenVerifier {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.config.algorithm)
            .field("audience", &self.config.audience)
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl TokenVerifier {
    /// Create a verifier with the given configuration.
    ///
    /// # Errors
    ///
    /// [`AuthError::ConfigError`] if the key required by the algorithm is
    /// missing or unreadable.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        let decoding_key = Self::create_decoding_key(&config)?;
        Ok(Self {
            config,
            decoding_key,
        })
    }

    /// Create with a shared secret (HS256).
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        let config = JwtConfig {
            secret: Some(secret.into()),
            algorithm: JwtAlgorithm::HS256,
            ..Default::default()
        };
        Self::new(config)
    }

    fn create_decoding_key(config: &JwtConfig) -> AuthResult<DecodingKey> {
        match config.algorithm {
            JwtAlgorithm::HS256 | JwtAlgorithm::HS384 | JwtAlgorithm::HS512 => {
                let secret = config
                    .secret
                    .as_ref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| AuthError::ConfigError("Secret required for HMAC".to_string()))?;
                Ok(DecodingKey::from_secret(secret.as_bytes()))
            }
            JwtAlgorithm::RS256 => {
                let key = config
                    .public_key
                    .as_ref()
                    .ok_or_else(|| AuthError::ConfigError("Public key required for RSA".to_string()))?;
                DecodingKey::from_rsa_pem(key.as_bytes())
                    .map_err(|e| AuthError::ConfigError(format!("Invalid RSA public key: {}", e)))
            }
        }
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> AuthResult<SessionClaims> {
        let mut validation = Validation::new(self.config.algorithm.into());
        validation.leeway = self.config.leeway_secs;
        validation.set_audience(&self.config.audience);
        if let Some(ref issuer) = self.config.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data: TokenData<SessionClaims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidToken("Invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AuthError::InvalidToken("Invalid audience".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Validate a token and return its principal.
    pub fn principal_from_token(&self, token: &str) -> AuthResult<Principal> {
        let claims = self.validate_token(token)?;
        claims.to_principal()
    }

    /// Get the configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}
