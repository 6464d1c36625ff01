//! Membership roles
//!
//! This module defines the closed set of roles a user can hold in an
//! organization, and the effective role that results from combining direct
//! membership with hierarchical inheritance.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role within an organization.
///
/// Roles are ordered: Manager < Admin.
///
/// # Permission Model
///
/// - **Manager**: Works with policies, framework mappings and regulatory events
/// - **Admin**: Everything a manager can do, plus member and organization
///   management; admin rights also grant visibility into descendant
///   organizations
///
/// # Examples
///
/// ```
/// use govern_org::MembershipRole;
///
/// assert!(MembershipRole::Admin > MembershipRole::Manager);
/// assert!(MembershipRole::Admin.is_admin());
/// assert!(!MembershipRole::Manager.is_admin());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    /// Day-to-day compliance work
    Manager = 1,

    /// Full organization control
    Admin = 2,
}

impl MembershipRole {
    /// Check if this role has admin privileges.
    pub fn is_admin(&self) -> bool {
        *self >= MembershipRole::Admin
    }

    /// Check if this role satisfies a required minimum role.
    pub fn satisfies(&self, required: MembershipRole) -> bool {
        *self >= required
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, surrounding whitespace ignored)
    ///
    /// # Examples
    ///
    /// ```
    /// use govern_org::MembershipRole;
    ///
    /// assert_eq!(MembershipRole::parse("admin"), Some(MembershipRole::Admin));
    /// assert_eq!(MembershipRole::parse("MANAGER"), Some(MembershipRole::Manager));
    /// assert_eq!(MembershipRole::parse("owner"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an effective role comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleSource {
    /// The user is a member of the organization itself
    Direct,

    /// The user administers an ancestor organization
    Inherited {
        /// The nearest administered ancestor
        via: Uuid,
    },
}

/// The role applied when evaluating an action against an organization.
///
/// # Examples
///
/// ```
/// use govern_org::{EffectiveRole, MembershipRole};
/// use uuid::Uuid;
///
/// let direct = EffectiveRole::direct(MembershipRole::Manager);
/// assert!(direct.is_direct());
///
/// let inherited = EffectiveRole::inherited(Uuid::now_v7());
/// assert_eq!(inherited.role, MembershipRole::Admin);
/// assert!(!inherited.is_direct());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EffectiveRole {
    /// The applied role
    pub role: MembershipRole,

    /// How the role was obtained
    pub source: RoleSource,
}

impl EffectiveRole {
    /// Role held through direct membership.
    pub fn direct(role: MembershipRole) -> Self {
        Self {
            role,
            source: RoleSource::Direct,
        }
    }

    /// Admin role inherited from an administered ancestor.
    ///
    /// Only admin is ever inherited.
    pub fn inherited(via: Uuid) -> Self {
        Self {
            role: MembershipRole::Admin,
            source: RoleSource::Inherited { via },
        }
    }

    /// Whether the role comes from direct membership.
    pub fn is_direct(&self) -> bool {
        matches!(self.source, RoleSource::Direct)
    }
}
