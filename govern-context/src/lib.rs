//! # Govern Context
//!
//! The active-organization context of the compliance dashboard.
//!
//! ## Overview
//!
//! Every view in the dashboard works inside one organization at a time. This
//! crate decides which one, and what the signed-in user may do there:
//!
//! - **Resolver**: Loads and validates memberships and the organization
//!   hierarchy from the remote store
//! - **Context**: Holds the active organization, publishes snapshots to
//!   observers, and follows the session lifecycle
//! - **Selection**: The deterministic default organization rule
//!
//! Authorization decisions themselves live in `govern-rbac`; a
//! [`ContextSnapshot`] can be passed to `govern_rbac::can_perform` directly.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use govern_auth::{MemorySessionProvider, SessionProvider};
//! use govern_context::{ActiveOrgContext, ContextConfig};
//! use govern_store::{RestStore, StoreConfig};
//!
//! async fn run(session: Arc<MemorySessionProvider>) -> Result<(), Box<dyn std::error::Error>> {
//!     let store_config = StoreConfig::from_env();
//!     let context = Arc::new(ActiveOrgContext::new(
//!         RestStore::new(store_config.clone())?,
//!         ContextConfig::from_store_config(&store_config),
//!     ));
//!
//!     let events = session.subscribe();
//!     let _ = context.initialize(session.principal()).await;
//!
//!     let follower = context.clone();
//!     tokio::spawn(async move { follower.run_session_events(events).await });
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod observer;
pub mod resolver;
pub mod selection;

// Re-export main types
pub use config::ContextConfig;
pub use context::{ActiveOrgContext, ContextSnapshot, ContextStatus};
pub use error::{ContextError, ContextResult};
pub use observer::Subscription;
pub use resolver::{MembershipResolver, Resolution};
pub use selection::default_organization;
