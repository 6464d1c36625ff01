//! Active-organization context
//!
//! Holds the signed-in principal's memberships, the organization hierarchy and
//! the organization the dashboard is currently scoped to. State is published
//! as immutable [`ContextSnapshot`]s; a reader always sees one complete
//! snapshot.
//!
//! Every mutating request takes a ticket from a monotonically increasing
//! sequence. Its result is applied only while the ticket is still the latest,
//! so overlapping requests converge on the most recent one and the others
//! return [`ContextError::Superseded`].
//!
//! Observers are notified after the state lock is released. A callback may
//! therefore call back into the context, including
//! [`reset`](ActiveOrgContext::reset) and
//! [`end_session`](ActiveOrgContext::end_session).

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use govern_auth::{Principal, SessionEvent};
use govern_org::{EffectiveRole, MembershipSet, OrgHierarchy, Organization};
use govern_rbac::{can_perform, effective_role, is_accessible, AccessScope, Action};
use govern_store::retry::with_retry_if;
use govern_store::RemoteStore;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::ContextConfig;
use crate::error::{ContextError, ContextResult};
use crate::observer::{Observers, Subscription};
use crate::resolver::{MembershipResolver, Resolution};
use crate::selection::default_organization;

/// Lifecycle status of the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    /// Nothing has been resolved yet, or the context was reset
    Uninitialized,
    /// An organization is active
    Ready,
    /// The principal has no memberships
    NoAccessibleOrganization,
    /// The session ended; the user has to sign in again
    ReauthenticationRequired,
    /// Resolution failed and no organization is active
    Failed,
}

/// Immutable view of the context at one point in time.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    /// The signed-in principal
    pub principal: Option<Principal>,
    /// The active organization
    pub organization: Option<Organization>,
    /// The principal's effective role in the active organization
    pub role: Option<EffectiveRole>,
    /// Direct memberships of the principal
    pub memberships: Arc<MembershipSet>,
    /// Organizations visible to the principal
    pub hierarchy: Arc<OrgHierarchy>,
    /// Lifecycle status
    pub status: ContextStatus,
    /// A request is in flight; the other fields hold the prior state
    pub is_loading: bool,
    /// Error of the most recent request
    pub error: Option<ContextError>,
    /// Publication counter, increases with every snapshot
    pub version: u64,
}

impl ContextSnapshot {
    fn uninitialized() -> Self {
        Self {
            principal: None,
            organization: None,
            role: None,
            memberships: Arc::new(MembershipSet::new()),
            hierarchy: Arc::new(OrgHierarchy::empty()),
            status: ContextStatus::Uninitialized,
            is_loading: false,
            error: None,
            version: 0,
        }
    }

    /// ID of the active organization.
    pub fn active_org_id(&self) -> Option<Uuid> {
        self.organization.as_ref().map(|org| org.id)
    }

    /// Whether an organization is active.
    pub fn is_ready(&self) -> bool {
        self.status == ContextStatus::Ready
    }

    /// Whether the principal may perform `action` in `org_id`.
    pub fn can(&self, action: Action, org_id: Uuid) -> bool {
        can_perform(action, org_id, self)
    }

    /// Whether the principal may perform `action` in the active organization.
    pub fn can_in_active(&self, action: Action) -> bool {
        self.active_org_id()
            .is_some_and(|org_id| self.can(action, org_id))
    }

    /// Organizations the principal may switch to, in hierarchy order.
    pub fn accessible_organizations(&self) -> Vec<&Organization> {
        self.hierarchy
            .iter()
            .filter(|org| is_accessible(org.id, self))
            .collect()
    }
}

impl AccessScope for ContextSnapshot {
    fn memberships(&self) -> &MembershipSet {
        &self.memberships
    }

    fn hierarchy(&self) -> &OrgHierarchy {
        &self.hierarchy
    }
}

type SessionFuture<'a> = Pin<Box<dyn Future<Output = ContextResult<Arc<ContextSnapshot>>> + Send + 'a>>;

/// Session-scoped active-organization context.
///
/// Construct one per session and share it by reference (typically in an
/// `Arc`). Observer callbacks run on the publishing task.
///
/// # Examples
///
/// ```rust,no_run
/// use govern_auth::Principal;
/// use govern_context::{ActiveOrgContext, ContextConfig};
/// use govern_rbac::Action;
/// use govern_store::MemoryStore;
/// use uuid::Uuid;
///
/// async fn example(principal: Principal) {
///     let context = ActiveOrgContext::new(MemoryStore::new(), ContextConfig::default());
///     let _subscription = context.subscribe(|snapshot| {
///         println!("active organization: {:?}", snapshot.active_org_id());
///     });
///
///     if let Ok(snapshot) = context.initialize(Some(principal)).await {
///         let org_id = snapshot.active_org_id().unwrap_or_else(Uuid::nil);
///         println!("can edit policies: {}", context.can(Action::EditPolicy, org_id));
///     }
/// }
/// ```
pub struct ActiveOrgContext<S> {
    resolver: MembershipResolver<S>,
    config: ContextConfig,
    state: Mutex<Arc<ContextSnapshot>>,
    sequence: AtomicU64,
    observers: Observers,
}

impl<S: RemoteStore> std::fmt::Debug for ActiveOrgContext<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.current_state();
        f.debug_struct("ActiveOrgContext")
            .field("status", &state.status)
            .field("active_org_id", &state.active_org_id())
            .field("version", &state.version)
            .field("observers", &self.observers)
            .finish()
    }
}

impl<S: RemoteStore> ActiveOrgContext<S> {
    /// Create an uninitialized context over `store`.
    pub fn new(store: S, config: ContextConfig) -> Self {
        Self {
            resolver: MembershipResolver::new(store),
            config,
            state: Mutex::new(Arc::new(ContextSnapshot::uninitialized())),
            sequence: AtomicU64::new(0),
            observers: Observers::default(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        self.resolver.store()
    }

    /// The context configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// The latest published snapshot.
    pub fn current_state(&self) -> Arc<ContextSnapshot> {
        self.lock_state().clone()
    }

    /// Register an observer for published snapshots.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<ContextSnapshot>) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Whether the principal may perform `action` in `org_id`, according to
    /// the latest snapshot.
    pub fn can(&self, action: Action, org_id: Uuid) -> bool {
        self.current_state().can(action, org_id)
    }

    /// Resolve memberships for `principal` and activate the default
    /// organization.
    ///
    /// The result depends only on the resolved memberships and hierarchy,
    /// never on an earlier selection. A principal other than the current one
    /// discards all cached data first.
    ///
    /// # Errors
    ///
    /// - [`ContextError::NotAuthenticated`] without a principal, or when the
    ///   store rejects the session (status
    ///   [`ContextStatus::ReauthenticationRequired`])
    /// - [`ContextError::NoAccessibleOrganization`] for an empty membership set
    /// - [`ContextError::ResolutionFailed`] / [`ContextError::InvalidHierarchy`]
    ///   from the resolver, after retrying transient failures
    /// - [`ContextError::Superseded`] if a newer request took over
    #[instrument(skip_all, fields(user_id = ?principal.as_ref().map(|p| p.id)))]
    pub async fn initialize(
        &self,
        principal: Option<Principal>,
    ) -> ContextResult<Arc<ContextSnapshot>> {
        self.load(principal, false).await
    }

    /// Re-resolve memberships after the session was refreshed.
    ///
    /// For the current principal the active organization is kept while it
    /// remains accessible, otherwise the default organization is chosen. A
    /// different principal is initialized from scratch.
    ///
    /// # Errors
    ///
    /// As for [`initialize`](ActiveOrgContext::initialize).
    #[instrument(skip_all, fields(user_id = %principal.id))]
    pub async fn revalidate(&self, principal: Principal) -> ContextResult<Arc<ContextSnapshot>> {
        self.load(Some(principal), true).await
    }

    /// Switch the active organization to `org_id`.
    ///
    /// Memberships are re-resolved first, so a revoked membership is caught
    /// here. The organization must be a direct membership or a descendant of
    /// an organization the principal administers.
    ///
    /// # Errors
    ///
    /// - [`ContextError::NotAuthenticated`] without a principal
    /// - [`ContextError::OrganizationNotAccessible`]; the re-resolved
    ///   memberships are published and the prior selection stays in place
    ///   while it remains accessible. Without a valid prior selection the
    ///   default organization is chosen.
    /// - resolver errors and [`ContextError::Superseded`] as for
    ///   [`initialize`](ActiveOrgContext::initialize)
    #[instrument(skip(self))]
    pub async fn select(&self, org_id: Uuid) -> ContextResult<Arc<ContextSnapshot>> {
        let ticket = self.next_ticket();

        let Some(principal) = self.current_state().principal.clone() else {
            self.publish(ticket, |prev| ContextSnapshot {
                error: Some(ContextError::NotAuthenticated),
                ..prev.clone()
            });
            return Err(ContextError::NotAuthenticated);
        };

        self.publish(ticket, |prev| ContextSnapshot {
            is_loading: true,
            error: None,
            ..prev.clone()
        })
        .ok_or(ContextError::Superseded)?;

        let resolution = self.resolve_with_retry(&principal).await;

        let mut outcome = Err(ContextError::Superseded);
        self.publish(ticket, |prev| match resolution {
            Err(error) => {
                outcome = Err(error.clone());
                failed(prev, error)
            }
            Ok(resolution) if is_accessible(org_id, &resolution) => {
                outcome = Ok(());
                ready(prev, resolution, org_id)
            }
            Ok(resolution) => {
                debug!("Organization not accessible, keeping prior selection if still valid");
                let error = ContextError::OrganizationNotAccessible(org_id);
                outcome = Err(error.clone());
                ContextSnapshot {
                    error: Some(error),
                    ..settle(prev, resolution, prev.active_org_id())
                }
            }
        })
        .ok_or(ContextError::Superseded)
        .and_then(|snapshot| outcome.map(|_| snapshot))
    }

    /// Return to the uninitialized state, discarding in-flight requests.
    pub fn reset(&self) -> Arc<ContextSnapshot> {
        self.clear(ContextStatus::Uninitialized)
    }

    /// Discard everything after the session ended.
    pub fn end_session(&self) -> Arc<ContextSnapshot> {
        self.clear(ContextStatus::ReauthenticationRequired)
    }

    /// React to a session lifecycle event.
    ///
    /// `Established` initializes for the carried principal and `Refreshed`
    /// revalidates, which fully resets when the principal changed. `Revoked`
    /// and `Expired` end the session.
    pub async fn handle_session_event(
        &self,
        event: SessionEvent,
    ) -> ContextResult<Arc<ContextSnapshot>> {
        debug!(?event, "Handling session event");
        match event {
            SessionEvent::Established(principal) => self.initialize(Some(principal)).await,
            SessionEvent::Refreshed(principal) => self.revalidate(principal).await,
            SessionEvent::Revoked | SessionEvent::Expired => Ok(self.end_session()),
        }
    }

    /// Apply session events until the channel closes.
    ///
    /// A new event preempts the work started for the previous one, so an
    /// expiry arriving during an initialization takes effect immediately.
    pub async fn run_session_events(&self, mut events: broadcast::Receiver<SessionEvent>) {
        let mut pending: Option<SessionFuture<'_>> = None;

        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => {
                        pending = None;
                        if event.ends_session() {
                            let _ = self.handle_session_event(event).await;
                        } else {
                            pending = Some(Box::pin(self.handle_session_event(event)));
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session events dropped, context may be stale");
                    }
                    Err(RecvError::Closed) => break,
                },
                result = next_outcome(&mut pending), if pending.is_some() => {
                    pending = None;
                    if let Err(error) = result {
                        debug!(error = %error, "Session event left the context without an organization");
                    }
                }
            }
        }

        debug!("Session event stream closed");
    }

    async fn load(
        &self,
        principal: Option<Principal>,
        keep_active: bool,
    ) -> ContextResult<Arc<ContextSnapshot>> {
        let ticket = self.next_ticket();

        let Some(principal) = principal else {
            self.publish(ticket, |_| ContextSnapshot {
                error: Some(ContextError::NotAuthenticated),
                ..ContextSnapshot::uninitialized()
            });
            return Err(ContextError::NotAuthenticated);
        };

        let switching = self
            .current_state()
            .principal
            .as_ref()
            .map(|current| current.id)
            != Some(principal.id);
        if switching {
            debug!("Principal changed, discarding cached memberships");
        }

        let loading_principal = principal.clone();
        self.publish(ticket, move |prev| {
            if switching {
                ContextSnapshot {
                    principal: Some(loading_principal),
                    is_loading: true,
                    ..ContextSnapshot::uninitialized()
                }
            } else {
                ContextSnapshot {
                    principal: Some(loading_principal),
                    is_loading: true,
                    error: None,
                    ..prev.clone()
                }
            }
        })
        .ok_or(ContextError::Superseded)?;

        let resolution = self.resolve_with_retry(&principal).await;

        let mut outcome = Err(ContextError::Superseded);
        self.publish(ticket, |prev| {
            let next = match resolution {
                Err(error) => failed(prev, error),
                Ok(resolution) => {
                    let preferred = prev.active_org_id().filter(|_| keep_active && !switching);
                    settle(prev, resolution, preferred)
                }
            };
            outcome = match next.error {
                Some(ref error) => Err(error.clone()),
                None => Ok(()),
            };
            next
        })
        .ok_or(ContextError::Superseded)
        .and_then(|snapshot| outcome.map(|_| snapshot))
    }

    fn clear(&self, status: ContextStatus) -> Arc<ContextSnapshot> {
        let ticket = self.next_ticket();
        debug!(?status, "Clearing context");
        // Only a later request can win the publish; its snapshot is the state.
        self.publish(ticket, |_| ContextSnapshot {
            status,
            ..ContextSnapshot::uninitialized()
        })
        .unwrap_or_else(|| self.current_state())
    }

    async fn resolve_with_retry(&self, principal: &Principal) -> ContextResult<Resolution> {
        with_retry_if(
            &self.config.retry,
            || self.resolver.resolve(Some(principal)),
            ContextError::is_retryable,
        )
        .await
    }

    fn next_ticket(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock_state(&self) -> MutexGuard<'_, Arc<ContextSnapshot>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish the snapshot built from the current one, if `ticket` is still
    /// the latest. Observers are notified once the state lock is released.
    fn publish<F>(&self, ticket: u64, build: F) -> Option<Arc<ContextSnapshot>>
    where
        F: FnOnce(&ContextSnapshot) -> ContextSnapshot,
    {
        let (previous, snapshot) = {
            let mut state = self.lock_state();
            if self.sequence.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "Request superseded, result discarded");
                return None;
            }

            let mut next = build(&state);
            next.version = state.version + 1;
            let next = Arc::new(next);
            let previous = std::mem::replace(&mut *state, next.clone());
            (previous, next)
        };

        if previous.active_org_id() != snapshot.active_org_id() || previous.role != snapshot.role {
            match (&snapshot.organization, &snapshot.role) {
                (Some(org), Some(role)) => info!(
                    org_id = %org.id,
                    org_name = %org.name,
                    role = %role.role,
                    inherited = !role.is_direct(),
                    "Active organization selected"
                ),
                _ => info!(status = ?snapshot.status, "No active organization"),
            }
        }

        self.observers.notify(&snapshot);
        Some(snapshot)
    }
}

async fn next_outcome(pending: &mut Option<SessionFuture<'_>>) -> ContextResult<Arc<ContextSnapshot>> {
    match pending.as_mut() {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

fn ready(prev: &ContextSnapshot, resolution: Resolution, org_id: Uuid) -> ContextSnapshot {
    let role = effective_role(org_id, &resolution);
    let organization = resolution.hierarchy.get(org_id).cloned();

    ContextSnapshot {
        principal: prev.principal.clone(),
        organization,
        role,
        memberships: Arc::new(resolution.memberships),
        hierarchy: Arc::new(resolution.hierarchy),
        status: ContextStatus::Ready,
        is_loading: false,
        error: None,
        version: prev.version,
    }
}

/// Activate `preferred` if it is still accessible, the default organization
/// otherwise.
fn settle(prev: &ContextSnapshot, resolution: Resolution, preferred: Option<Uuid>) -> ContextSnapshot {
    let selected = preferred
        .filter(|org_id| is_accessible(*org_id, &resolution))
        .or_else(|| default_organization(&resolution));

    match selected {
        Some(org_id) => ready(prev, resolution, org_id),
        None => ContextSnapshot {
            principal: prev.principal.clone(),
            memberships: Arc::new(resolution.memberships),
            hierarchy: Arc::new(resolution.hierarchy),
            status: ContextStatus::NoAccessibleOrganization,
            error: Some(ContextError::NoAccessibleOrganization),
            ..ContextSnapshot::uninitialized()
        },
    }
}

/// Keep whatever was readable before the request and record the error. A
/// rejected session discards everything.
fn failed(prev: &ContextSnapshot, error: ContextError) -> ContextSnapshot {
    warn!(error = %error, code = error.error_code(), "Context request failed");
    if error.requires_reauthentication() {
        return ContextSnapshot {
            status: ContextStatus::ReauthenticationRequired,
            error: Some(error),
            ..ContextSnapshot::uninitialized()
        };
    }

    let status = if prev.organization.is_some() {
        prev.status
    } else {
        ContextStatus::Failed
    };

    ContextSnapshot {
        status,
        is_loading: false,
        error: Some(error),
        ..prev.clone()
    }
}
