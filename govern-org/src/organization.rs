//! Organization domain models
//!
//! This module provides the Organization entity. Organizations are the tenant
//! entities of the compliance dashboard; they form a forest through an
//! optional `parent_id` so that business units can sit below a group entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metadata::Metadata;

/// An organization represents a tenant in the compliance dashboard.
///
/// Users can belong to multiple organizations with different roles. An
/// organization may have a parent, which places it inside a hierarchy:
///
/// ```text
/// Group (root)
///   ├─ Subsidiary A
///   │     └─ Business Unit A1
///   └─ Subsidiary B
/// ```
///
/// # Examples
///
/// ```
/// use govern_org::Organization;
///
/// let group = Organization::new("Acme Group");
/// let subsidiary = Organization::new("Acme Europe").with_parent(group.id);
/// assert_eq!(subsidiary.parent_id, Some(group.id));
/// assert!(group.is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Parent organization, absent for root-level organizations
    #[serde(default)]
    pub parent_id: Option<Uuid>,

    /// Human-readable name
    pub name: String,

    /// Free-form organization type tag (e.g. "enterprise", "business_unit")
    #[serde(default)]
    pub org_type: Option<String>,

    /// Custom metadata for extensibility
    #[serde(default)]
    pub metadata: Metadata,

    /// When the organization was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Organization {
    /// Creates a new root-level organization.
    ///
    /// The organization is created with:
    /// - A newly generated UUID v7 ID
    /// - No parent, no type tag, empty metadata
    /// - Current timestamp for created_at
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            parent_id: None,
            name: name.into(),
            org_type: None,
            metadata: Metadata::new(),
            created_at: Some(Utc::now()),
        }
    }

    /// Place this organization below `parent_id`.
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the organization type tag.
    pub fn with_type(mut self, org_type: impl Into<String>) -> Self {
        self.org_type = Some(org_type.into());
        self
    }

    /// Replace the metadata map.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether this organization has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
