//! In-process remote store.
//!
//! Holds organizations and membership rows in memory. Used by tests and
//! demos; it can inject transient failures and counts the calls it serves.

use crate::error::{StoreError, StoreResult};
use crate::rows::{MembershipRow, OrganizationRow};
use crate::RemoteStore;
use async_trait::async_trait;
use govern_org::{Membership, Organization};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    organizations: Vec<Organization>,
    memberships: Vec<MembershipRow>,
    failures_pending: usize,
}

/// In-memory [`RemoteStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    organization_calls: AtomicUsize,
    membership_calls: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an organization, replacing any with the same ID.
    pub fn add_organization(&self, organization: Organization) {
        let mut tables = self.tables();
        tables.organizations.retain(|o| o.id != organization.id);
        tables.organizations.push(organization);
    }

    /// Add a validated membership.
    pub fn add_membership(&self, membership: Membership) {
        self.add_raw_membership(membership.into());
    }

    /// Add a membership row as-is, malformed or not.
    pub fn add_raw_membership(&self, row: MembershipRow) {
        self.tables().memberships.push(row);
    }

    /// Remove every membership row of `user_id` in `org_id`.
    pub fn remove_membership(&self, org_id: Uuid, user_id: Uuid) {
        self.tables()
            .memberships
            .retain(|row| !(row.org_id == Some(org_id) && row.user_id == Some(user_id)));
    }

    /// Make the next `count` calls fail with [`StoreError::Unavailable`].
    pub fn fail_next(&self, count: usize) {
        self.tables().failures_pending = count;
    }

    /// Number of organization listings served or failed.
    pub fn organization_calls(&self) -> usize {
        self.organization_calls.load(Ordering::SeqCst)
    }

    /// Number of membership listings served or failed.
    pub fn membership_calls(&self) -> usize {
        self.membership_calls.load(Ordering::SeqCst)
    }

    fn take_failure(tables: &mut Tables) -> StoreResult<()> {
        if tables.failures_pending > 0 {
            tables.failures_pending -= 1;
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_organizations(&self) -> StoreResult<Vec<OrganizationRow>> {
        self.organization_calls.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        Self::take_failure(&mut tables)?;

        let mut organizations = tables.organizations.clone();
        organizations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(organizations)
    }

    async fn list_memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRow>> {
        self.membership_calls.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables();
        Self::take_failure(&mut tables)?;

        Ok(tables
            .memberships
            .iter()
            .filter(|row| row.user_id == Some(user_id))
            .cloned()
            .collect())
    }
}
