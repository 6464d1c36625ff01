//! The authenticated principal

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user a session belongs to.
///
/// Immutable for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// User ID
    pub id: Uuid,

    /// User email
    pub email: String,
}

impl Principal {
    /// Create a principal.
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}
