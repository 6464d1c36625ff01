//! Row shapes returned by the remote store
//!
//! Organization rows decode straight into [`OrganizationRow`], whose metadata is
//! validated during decoding. Membership rows keep every column optional so
//! the resolver can tell a malformed row apart from a transport failure.

use chrono::{DateTime, Utc};
use govern_org::{Membership, MembershipRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use govern_org::Organization as OrganizationRow;

/// Columns selected from the organizations table.
pub const ORGANIZATION_COLUMNS: &str = "id,parent_id,name,org_type,metadata,created_at";

/// Columns selected from the organization members table.
pub const MEMBERSHIP_COLUMNS: &str = "org_id,user_id,role,created_at";

/// A raw organization membership row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRow {
    /// Organization ID
    #[serde(default)]
    pub org_id: Option<Uuid>,

    /// User ID
    #[serde(default)]
    pub user_id: Option<Uuid>,

    /// Role name as stored
    #[serde(default)]
    pub role: Option<String>,

    /// When the membership was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Why a membership row could not be turned into a [`Membership`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDefect {
    /// A required column was null or absent
    MissingColumn(&'static str),
    /// The role column held an unknown value
    UnknownRole(String),
}

impl std::fmt::Display for RowDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowDefect::MissingColumn(column) => write!(f, "missing column `{}`", column),
            RowDefect::UnknownRole(role) => write!(f, "unknown role `{}`", role),
        }
    }
}

impl MembershipRow {
    /// Validate the row.
    pub fn into_membership(self) -> Result<Membership, RowDefect> {
        let org_id = self.org_id.ok_or(RowDefect::MissingColumn("org_id"))?;
        let user_id = self.user_id.ok_or(RowDefect::MissingColumn("user_id"))?;
        let role = self.role.ok_or(RowDefect::MissingColumn("role"))?;
        let role = MembershipRole::parse(&role).ok_or(RowDefect::UnknownRole(role))?;

        Ok(Membership {
            org_id,
            user_id,
            role,
            created_at: self.created_at,
        })
    }
}

impl From<Membership> for MembershipRow {
    fn from(membership: Membership) -> Self {
        Self {
            org_id: Some(membership.org_id),
            user_id: Some(membership.user_id),
            role: Some(membership.role.as_str().to_string()),
            created_at: membership.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_row() {
        let membership = Membership::new(Uuid::now_v7(), Uuid::now_v7(), MembershipRole::Admin);
        let row = MembershipRow::from(membership.clone());

        assert_eq!(row.into_membership(), Ok(membership));
    }

    #[test]
    fn test_missing_columns() {
        let row: MembershipRow = serde_json::from_value(serde_json::json!({
            "user_id": Uuid::now_v7(),
            "role": "admin",
        }))
        .unwrap();
        assert_eq!(row.into_membership(), Err(RowDefect::MissingColumn("org_id")));

        let row: MembershipRow = serde_json::from_value(serde_json::json!({
            "org_id": Uuid::now_v7(),
            "user_id": Uuid::now_v7(),
            "role": null,
        }))
        .unwrap();
        assert_eq!(row.into_membership(), Err(RowDefect::MissingColumn("role")));
    }

    #[test]
    fn test_unknown_role() {
        let row = MembershipRow {
            org_id: Some(Uuid::now_v7()),
            user_id: Some(Uuid::now_v7()),
            role: Some("owner".to_string()),
            created_at: None,
        };
        assert_eq!(
            row.into_membership(),
            Err(RowDefect::UnknownRole("owner".to_string()))
        );
    }
}
