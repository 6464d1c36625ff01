//! Membership resolution
//!
//! Loads a principal's memberships and the organization hierarchy from the
//! remote store and validates them. Every row is checked before anything is
//! returned: a resolution is either fully valid or an error.

use govern_auth::Principal;
use govern_org::{MembershipSet, OrgHierarchy};
use govern_rbac::AccessScope;
use govern_store::RemoteStore;
use tracing::{debug, instrument, warn};

use crate::error::{ContextError, ContextResult};

/// Validated memberships together with the hierarchy they refer to.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// The principal's direct memberships
    pub memberships: MembershipSet,
    /// Every organization visible to the principal
    pub hierarchy: OrgHierarchy,
}

impl AccessScope for Resolution {
    fn memberships(&self) -> &MembershipSet {
        &self.memberships
    }

    fn hierarchy(&self) -> &OrgHierarchy {
        &self.hierarchy
    }
}

/// Resolves memberships against a [`RemoteStore`].
#[derive(Debug)]
pub struct MembershipResolver<S> {
    store: S,
}

impl<S: RemoteStore> MembershipResolver<S> {
    /// Create a resolver over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the memberships of `principal`.
    ///
    /// # Errors
    ///
    /// - [`ContextError::NotAuthenticated`] without a principal
    /// - [`ContextError::ResolutionFailed`] when the store fails or a row is
    ///   malformed, belongs to another user, or references an unknown
    ///   organization; only store outages are marked transient
    /// - [`ContextError::NotAuthenticated`] when the store rejects the
    ///   credentials
    /// - [`ContextError::InvalidHierarchy`] when the organizations contain a
    ///   cycle or duplicate IDs
    ///
    /// An empty membership set is a valid result.
    #[instrument(skip_all, fields(user_id = tracing::field::Empty))]
    pub async fn resolve(&self, principal: Option<&Principal>) -> ContextResult<Resolution> {
        let principal = principal.ok_or(ContextError::NotAuthenticated)?;
        tracing::Span::current().record("user_id", tracing::field::display(principal.id));

        let organizations = self
            .store
            .list_organizations()
            .await
            .inspect_err(|e| warn!(error = %e, "Listing organizations failed"))?;
        let rows = self
            .store
            .list_memberships_for_user(principal.id)
            .await
            .inspect_err(|e| warn!(error = %e, "Listing memberships failed"))?;

        let hierarchy = OrgHierarchy::build(organizations)?;

        let mut memberships = MembershipSet::new();
        for row in rows {
            let membership = row.into_membership().map_err(|defect| {
                ContextError::resolution(format!("malformed membership row: {}", defect))
            })?;

            if membership.user_id != principal.id {
                return Err(ContextError::resolution(format!(
                    "membership in {} belongs to another user",
                    membership.org_id
                )));
            }
            if !hierarchy.contains(membership.org_id) {
                return Err(ContextError::resolution(format!(
                    "membership references unknown organization {}",
                    membership.org_id
                )));
            }

            memberships.insert(membership);
        }

        debug!(
            memberships = memberships.len(),
            organizations = hierarchy.len(),
            "Resolved memberships"
        );

        Ok(Resolution {
            memberships,
            hierarchy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govern_org::{Membership, MembershipRole, Organization};
    use govern_store::{MembershipRow, MemoryStore};
    use uuid::Uuid;

    fn principal() -> Principal {
        Principal::new(Uuid::now_v7(), "officer@example.com")
    }

    #[tokio::test]
    async fn test_requires_principal() {
        let resolver = MembershipResolver::new(MemoryStore::new());
        assert_eq!(
            resolver.resolve(None).await.unwrap_err(),
            ContextError::NotAuthenticated
        );
    }

    #[tokio::test]
    async fn test_resolves_valid_memberships() {
        let store = MemoryStore::new();
        let user = principal();
        let group = Organization::new("Group");
        let unit = Organization::new("Unit").with_parent(group.id);
        store.add_membership(Membership::new(group.id, user.id, MembershipRole::Admin));
        store.add_organization(group.clone());
        store.add_organization(unit.clone());

        let resolution = MembershipResolver::new(store)
            .resolve(Some(&user))
            .await
            .unwrap();

        assert_eq!(resolution.memberships.len(), 1);
        assert_eq!(
            resolution.memberships.role_in(group.id),
            Some(MembershipRole::Admin)
        );
        assert!(resolution.hierarchy.is_descendant(unit.id, group.id));
    }

    #[tokio::test]
    async fn test_empty_memberships_are_valid() {
        let store = MemoryStore::new();
        store.add_organization(Organization::new("Somebody else's"));

        let resolution = MembershipResolver::new(store)
            .resolve(Some(&principal()))
            .await
            .unwrap();

        assert!(resolution.memberships.is_empty());
        assert_eq!(resolution.hierarchy.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_row_fails() {
        let store = MemoryStore::new();
        let user = principal();
        let org = Organization::new("Acme");
        store.add_organization(org.clone());
        store.add_raw_membership(MembershipRow {
            org_id: Some(org.id),
            user_id: Some(user.id),
            role: Some("owner".to_string()),
            created_at: None,
        });

        let err = MembershipResolver::new(store)
            .resolve(Some(&user))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::ResolutionFailed { ref message, transient: false } if message.contains("owner")));
    }

    #[tokio::test]
    async fn test_dangling_organization_fails() {
        let store = MemoryStore::new();
        let user = principal();
        store.add_membership(Membership::new(Uuid::now_v7(), user.id, MembershipRole::Manager));

        let err = MembershipResolver::new(store)
            .resolve(Some(&user))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::ResolutionFailed { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_cycle_is_invalid_hierarchy() {
        let store = MemoryStore::new();
        let mut a = Organization::new("A");
        let b = Organization::new("B").with_parent(a.id);
        a.parent_id = Some(b.id);
        store.add_organization(a);
        store.add_organization(b);

        let err = MembershipResolver::new(store)
            .resolve(Some(&principal()))
            .await
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[tokio::test]
    async fn test_store_failure_is_resolution_failure() {
        let store = MemoryStore::new();
        store.fail_next(1);

        let err = MembershipResolver::new(store)
            .resolve(Some(&principal()))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
