//! Session provider boundary
//!
//! The hosted auth service owns sign-in and token issuance. The dashboard
//! only needs two things from it: who is signed in right now, and a stream
//! of lifecycle events so the access context can react to sign-out, refresh
//! and expiry.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tokio::sync::broadcast;

use crate::error::{AuthError, AuthResult};
use crate::principal::Principal;

/// Session lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "principal", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A user signed in
    Established(Principal),

    /// The session's tokens were refreshed
    Refreshed(Principal),

    /// The session was ended (sign-out or server-side revocation)
    Revoked,

    /// The session expired without a successful refresh
    Expired,
}

impl SessionEvent {
    /// The principal carried by the event, if any.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SessionEvent::Established(p) | SessionEvent::Refreshed(p) => Some(p),
            SessionEvent::Revoked | SessionEvent::Expired => None,
        }
    }

    /// Whether the event ends the session.
    pub fn ends_session(&self) -> bool {
        matches!(self, SessionEvent::Revoked | SessionEvent::Expired)
    }
}

/// Source of the current principal and of session lifecycle events.
pub trait SessionProvider: Send + Sync {
    /// The currently signed-in principal.
    fn principal(&self) -> Option<Principal>;

    /// Subscribe to lifecycle events emitted after this call.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    /// The current principal, or [`AuthError::NotAuthenticated`].
    fn require_principal(&self) -> AuthResult<Principal> {
        self.principal().ok_or(AuthError::NotAuthenticated)
    }
}

/// In-process session provider.
///
/// Holds the current principal and broadcasts lifecycle events to every
/// subscriber. Used by the dashboard shell, which forwards what the hosted
/// auth client reports, and by tests.
///
/// # Examples
///
/// ```
/// use govern_auth::{MemorySessionProvider, Principal, SessionEvent, SessionProvider};
/// use uuid::Uuid;
///
/// let provider = MemorySessionProvider::new();
/// let mut events = provider.subscribe();
///
/// let principal = Principal::new(Uuid::now_v7(), "user@example.com");
/// provider.establish(principal.clone());
///
/// assert_eq!(provider.principal(), Some(principal.clone()));
/// assert_eq!(events.try_recv().unwrap(), SessionEvent::Established(principal));
/// ```
pub struct MemorySessionProvider {
    principal: RwLock<Option<Principal>>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for MemorySessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionProvider")
            .field("principal", &self.principal())
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl MemorySessionProvider {
    /// Create a provider with no signed-in user.
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create with a custom event channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            principal: RwLock::new(None),
            events,
        }
    }

    fn set_principal(&self, principal: Option<Principal>) {
        let mut guard = self
            .principal
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = principal;
    }

    fn emit(&self, event: SessionEvent) {
        tracing::debug!(?event, "Session event");
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    /// Record a sign-in.
    pub fn establish(&self, principal: Principal) {
        self.set_principal(Some(principal.clone()));
        self.emit(SessionEvent::Established(principal));
    }

    /// Record a token refresh for the current principal.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotAuthenticated`] if nobody is signed in.
    pub fn refresh(&self) -> AuthResult<()> {
        let principal = self.require_principal()?;
        self.emit(SessionEvent::Refreshed(principal));
        Ok(())
    }

    /// Record a sign-out or server-side revocation.
    pub fn revoke(&self) {
        self.set_principal(None);
        self.emit(SessionEvent::Revoked);
    }

    /// Record that the session expired and could not be refreshed.
    pub fn expire(&self) {
        self.set_principal(None);
        self.emit(SessionEvent::Expired);
    }
}

impl Default for MemorySessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for MemorySessionProvider {
    fn principal(&self) -> Option<Principal> {
        self.principal
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
