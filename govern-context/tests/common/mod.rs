//! Shared fixtures for context integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use govern_auth::Principal;
use govern_context::{ActiveOrgContext, ContextConfig};
use govern_org::{Membership, MembershipRole, Organization};
use govern_store::{MembershipRow, MemoryStore, OrganizationRow, RemoteStore, RetryConfig, StoreResult};
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

/// Memory store whose membership listings can be held open.
#[derive(Debug, Default)]
pub struct GatedStore {
    pub inner: MemoryStore,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    pub entered: Notify,
}

impl GatedStore {
    /// Hold the next membership listing until the returned sender fires or
    /// is dropped.
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn list_organizations(&self) -> StoreResult<Vec<OrganizationRow>> {
        self.inner.list_organizations().await
    }

    async fn list_memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRow>> {
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            self.entered.notify_one();
            let _ = gate.await;
        }
        self.inner.list_memberships_for_user(user_id).await
    }
}

/// ```text
/// Group
///   └─ Subsidiary
///        └─ Business Unit
/// Unrelated
/// ```
pub struct World {
    pub store: Arc<GatedStore>,
    pub alice: Principal,
    pub bob: Principal,
    pub group: Uuid,
    pub subsidiary: Uuid,
    pub unit: Uuid,
    pub unrelated: Uuid,
}

impl World {
    pub fn new() -> Self {
        let store = Arc::new(GatedStore::default());

        let group = Organization::new("Group").with_type("enterprise");
        let subsidiary = Organization::new("Subsidiary").with_parent(group.id);
        let unit = Organization::new("Business Unit").with_parent(subsidiary.id);
        let unrelated = Organization::new("Unrelated");

        let world = Self {
            store: store.clone(),
            alice: Principal::new(Uuid::now_v7(), "alice@example.com"),
            bob: Principal::new(Uuid::now_v7(), "bob@example.com"),
            group: group.id,
            subsidiary: subsidiary.id,
            unit: unit.id,
            unrelated: unrelated.id,
        };

        for org in [group, subsidiary, unit, unrelated] {
            store.inner.add_organization(org);
        }
        world
    }

    pub fn grant(&self, principal: &Principal, org_id: Uuid, role: MembershipRole) {
        self.store
            .inner
            .add_membership(Membership::new(org_id, principal.id, role));
    }

    pub fn revoke(&self, principal: &Principal, org_id: Uuid) {
        self.store.inner.remove_membership(org_id, principal.id);
    }

    pub fn context(&self) -> ActiveOrgContext<Arc<GatedStore>> {
        self.context_with(RetryConfig::fast())
    }

    pub fn context_with(&self, retry: RetryConfig) -> ActiveOrgContext<Arc<GatedStore>> {
        ActiveOrgContext::new(self.store.clone(), ContextConfig::default().with_retry(retry))
    }
}
