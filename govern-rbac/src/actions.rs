//! # Actions
//!
//! Defines the closed set of actions the dashboard gates on.
//! Each action carries the minimum role it needs and whether an admin of an
//! ancestor organization may perform it on a descendant.

use govern_org::MembershipRole;
use serde::{Deserialize, Serialize};

/// Actions that can be performed within an organization.
///
/// - **View**: Read dashboards, policies, frameworks and crosswalks
/// - **EditPolicy**: Create and edit the organization's policies
/// - **ManageFrameworkMappings**: Map policies to framework controls
/// - **TrackRegulatoryEvents**: Record and update regulatory events
/// - **ManageMembers**: Add, remove and change roles of members
/// - **ManageOrganization**: Rename, re-parent or configure the organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read organization data.
    ///
    /// The only action admins of an ancestor organization inherit.
    View,

    /// Create and edit policies.
    EditPolicy,

    /// Maintain policy-to-framework mappings.
    ManageFrameworkMappings,

    /// Record regulatory events affecting the organization.
    TrackRegulatoryEvents,

    /// Manage organization members.
    ManageMembers,

    /// Manage the organization itself.
    ManageOrganization,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::EditPolicy => "edit_policy",
            Action::ManageFrameworkMappings => "manage_framework_mappings",
            Action::TrackRegulatoryEvents => "track_regulatory_events",
            Action::ManageMembers => "manage_members",
            Action::ManageOrganization => "manage_organization",
        }
    }

    /// Parse action from string representation.
    ///
    /// Accepts snake_case, camelCase and a few aliases; case-insensitive.
    ///
    /// # Example
    ///
    /// ```
    /// use govern_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("view"), Some(Action::View));
    /// assert_eq!(Action::parse("read"), Some(Action::View)); // Alias
    /// assert_eq!(Action::parse("manageMembers"), Some(Action::ManageMembers));
    /// assert_eq!(Action::parse("edit_policy"), Some(Action::EditPolicy));
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "view" | "read" => Some(Action::View),
            "editpolicy" | "editpolicies" | "write" => Some(Action::EditPolicy),
            "manageframeworkmappings" | "mapframeworks" => Some(Action::ManageFrameworkMappings),
            "trackregulatoryevents" | "regulatoryevents" => Some(Action::TrackRegulatoryEvents),
            "managemembers" | "members" => Some(Action::ManageMembers),
            "manageorganization" | "manageorg" => Some(Action::ManageOrganization),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::View,
            Action::EditPolicy,
            Action::ManageFrameworkMappings,
            Action::TrackRegulatoryEvents,
            Action::ManageMembers,
            Action::ManageOrganization,
        ]
    }

    /// Minimum role required to perform this action.
    pub fn required_role(&self) -> MembershipRole {
        match self {
            Action::View
            | Action::EditPolicy
            | Action::ManageFrameworkMappings
            | Action::TrackRegulatoryEvents => MembershipRole::Manager,
            Action::ManageMembers | Action::ManageOrganization => MembershipRole::Admin,
        }
    }

    /// Whether admin rights on an ancestor organization grant this action.
    ///
    /// Inheritance is read-scoped: only `View` inherits.
    ///
    /// # Example
    ///
    /// ```
    /// use govern_rbac::actions::Action;
    ///
    /// assert!(Action::View.inherits());
    /// assert!(!Action::ManageMembers.inherits());
    /// ```
    pub fn inherits(&self) -> bool {
        matches!(self, Action::View)
    }

    /// Check if this is a read-only action.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::View)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
