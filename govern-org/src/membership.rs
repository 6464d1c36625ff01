//! Membership domain models
//!
//! This module provides the membership entity that links a user to an
//! organization with a role, and the per-user membership set the access
//! context reasons about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::roles::MembershipRole;

/// Organization membership linking a user to an organization.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use govern_org::{Membership, MembershipRole};
///
/// let org_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let membership = Membership::new(org_id, user_id, MembershipRole::Admin);
/// assert!(membership.role.is_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Organization ID
    pub org_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the organization
    pub role: MembershipRole,

    /// When the user was added
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Membership {
    /// Creates a new membership stamped with the current time.
    pub fn new(org_id: Uuid, user_id: Uuid, role: MembershipRole) -> Self {
        Self {
            org_id,
            user_id,
            role,
            created_at: Some(Utc::now()),
        }
    }
}

/// The memberships of a single user, keyed by organization.
///
/// Iteration order is organization ID order, so anything derived from the
/// set is stable for the same rows regardless of the order the store
/// returned them in.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use govern_org::{Membership, MembershipRole, MembershipSet};
///
/// let user_id = Uuid::now_v7();
/// let org_id = Uuid::now_v7();
/// let set = MembershipSet::from_memberships([
///     Membership::new(org_id, user_id, MembershipRole::Manager),
/// ]);
///
/// assert_eq!(set.role_in(org_id), Some(MembershipRole::Manager));
/// assert!(set.role_in(Uuid::now_v7()).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSet {
    memberships: BTreeMap<Uuid, Membership>,
}

impl MembershipSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, collapsing duplicate organizations to the strongest role.
    pub fn from_memberships(memberships: impl IntoIterator<Item = Membership>) -> Self {
        let mut set = Self::new();
        for membership in memberships {
            set.insert(membership);
        }
        set
    }

    /// Insert a membership. A second membership for the same organization
    /// keeps whichever role is stronger.
    pub fn insert(&mut self, membership: Membership) {
        match self.memberships.get(&membership.org_id) {
            Some(existing) => {
                tracing::warn!(
                    org_id = %membership.org_id,
                    kept = %existing.role.max(membership.role),
                    "Duplicate membership rows for organization"
                );
                if membership.role > existing.role {
                    self.memberships.insert(membership.org_id, membership);
                }
            }
            None => {
                self.memberships.insert(membership.org_id, membership);
            }
        }
    }

    /// Membership for an organization.
    pub fn get(&self, org_id: Uuid) -> Option<&Membership> {
        self.memberships.get(&org_id)
    }

    /// Direct role in an organization.
    pub fn role_in(&self, org_id: Uuid) -> Option<MembershipRole> {
        self.memberships.get(&org_id).map(|m| m.role)
    }

    /// Whether the user is a direct member of the organization.
    pub fn contains(&self, org_id: Uuid) -> bool {
        self.memberships.contains_key(&org_id)
    }

    /// Organizations the user administers directly.
    pub fn administered(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.memberships
            .values()
            .filter(|m| m.role.is_admin())
            .map(|m| m.org_id)
    }

    /// Iterate over memberships in organization ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Membership> {
        self.memberships.values()
    }

    /// Number of memberships.
    pub fn len(&self) -> usize {
        self.memberships.len()
    }

    /// Whether the user has no memberships.
    pub fn is_empty(&self) -> bool {
        self.memberships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_creation() {
        let org_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let membership = Membership::new(org_id, user_id, MembershipRole::Manager);

        assert_eq!(membership.org_id, org_id);
        assert_eq!(membership.user_id, user_id);
        assert_eq!(membership.role, MembershipRole::Manager);
        assert!(membership.created_at.is_some());
    }

    #[test]
    fn test_duplicate_memberships_keep_strongest_role() {
        let org_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();

        let set = MembershipSet::from_memberships([
            Membership::new(org_id, user_id, MembershipRole::Admin),
            Membership::new(org_id, user_id, MembershipRole::Manager),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.role_in(org_id), Some(MembershipRole::Admin));

        let set = MembershipSet::from_memberships([
            Membership::new(org_id, user_id, MembershipRole::Manager),
            Membership::new(org_id, user_id, MembershipRole::Admin),
        ]);
        assert_eq!(set.role_in(org_id), Some(MembershipRole::Admin));
    }

    #[test]
    fn test_iteration_order_is_independent_of_input_order() {
        let user_id = Uuid::now_v7();
        let a = Membership::new(Uuid::now_v7(), user_id, MembershipRole::Admin);
        let b = Membership::new(Uuid::now_v7(), user_id, MembershipRole::Manager);

        let forward = MembershipSet::from_memberships([a.clone(), b.clone()]);
        let backward = MembershipSet::from_memberships([b, a]);

        let forward_ids: Vec<_> = forward.iter().map(|m| m.org_id).collect();
        let backward_ids: Vec<_> = backward.iter().map(|m| m.org_id).collect();
        assert_eq!(forward_ids, backward_ids);
    }

    #[test]
    fn test_administered() {
        let user_id = Uuid::now_v7();
        let admin_org = Uuid::now_v7();
        let managed_org = Uuid::now_v7();

        let set = MembershipSet::from_memberships([
            Membership::new(admin_org, user_id, MembershipRole::Admin),
            Membership::new(managed_org, user_id, MembershipRole::Manager),
        ]);

        let administered: Vec<_> = set.administered().collect();
        assert_eq!(administered, vec![admin_org]);
    }
}
