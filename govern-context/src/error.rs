//! Error types for the active-organization context
//!
//! Errors are recorded in the published snapshot as well as returned, so the
//! type is `Clone`. Lower-level errors from the store, the hierarchy index and
//! the session boundary are mapped here.

use govern_auth::AuthError;
use govern_org::HierarchyError;
use govern_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Context error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// No principal is signed in
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Memberships or organizations could not be loaded or validated.
    /// `transient` marks store failures that may clear on a later attempt.
    #[error("Failed to resolve memberships: {message}")]
    ResolutionFailed {
        /// What went wrong
        message: String,
        /// Whether a retry could succeed
        transient: bool,
    },

    /// The organization data does not form a forest
    #[error("Invalid organization hierarchy: {0}")]
    InvalidHierarchy(String),

    /// The principal has no memberships
    #[error("No accessible organization")]
    NoAccessibleOrganization,

    /// The requested organization is outside the principal's access
    #[error("Organization not accessible: {0}")]
    OrganizationNotAccessible(Uuid),

    /// A newer request replaced this one before it completed
    #[error("Superseded by a newer request")]
    Superseded,
}

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;

impl ContextError {
    /// A resolution failure that retrying will not fix.
    pub fn resolution(message: impl Into<String>) -> Self {
        ContextError::ResolutionFailed {
            message: message.into(),
            transient: false,
        }
    }

    /// A resolution failure the store may recover from.
    pub fn transient(message: impl Into<String>) -> Self {
        ContextError::ResolutionFailed {
            message: message.into(),
            transient: true,
        }
    }

    /// Whether the operation may succeed if attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ContextError::ResolutionFailed {
                transient: true,
                ..
            }
        )
    }

    /// Whether the user has to sign in again before the context can load.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, ContextError::NotAuthenticated)
    }

    /// Whether the error points at bad organization data rather than a
    /// runtime condition.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ContextError::InvalidHierarchy(_))
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ContextError::NotAuthenticated => "NOT_AUTHENTICATED",
            ContextError::ResolutionFailed { .. } => "RESOLUTION_FAILED",
            ContextError::InvalidHierarchy(_) => "INVALID_HIERARCHY",
            ContextError::NoAccessibleOrganization => "NO_ACCESSIBLE_ORGANIZATION",
            ContextError::OrganizationNotAccessible(_) => "ORGANIZATION_NOT_ACCESSIBLE",
            ContextError::Superseded => "SUPERSEDED",
        }
    }
}

impl From<StoreError> for ContextError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AuthenticationFailed => ContextError::NotAuthenticated,
            err if err.is_transient() => ContextError::transient(err.to_string()),
            err => ContextError::resolution(err.to_string()),
        }
    }
}

impl From<HierarchyError> for ContextError {
    fn from(err: HierarchyError) -> Self {
        ContextError::InvalidHierarchy(err.to_string())
    }
}

impl From<AuthError> for ContextError {
    fn from(err: AuthError) -> Self {
        if err.requires_reauthentication() {
            ContextError::NotAuthenticated
        } else {
            ContextError::resolution(err.to_string())
        }
    }
}
