//! # Govern Store
//!
//! Remote store boundary of the compliance dashboard.
//!
//! ## Overview
//!
//! The organization and membership tables live in a hosted relational store
//! exposed over PostgREST. This crate provides:
//!
//! - **[`RemoteStore`]**: The two reads the access context needs
//! - **[`RestStore`]**: The PostgREST implementation (reqwest)
//! - **[`MemoryStore`]**: An in-process implementation for tests and demos
//! - **[`StoreConfig`]**: Environment-driven configuration
//! - **[`retry`]**: Exponential backoff for transient failures
//!
//! ## Usage
//!
//! ```rust,no_run
//! use govern_store::{RemoteStore, RestStore, StoreConfig};
//! use uuid::Uuid;
//!
//! async fn example(user_id: Uuid) -> Result<(), govern_store::StoreError> {
//!     let store = RestStore::new(StoreConfig::from_env())?;
//!     let organizations = store.list_organizations().await?;
//!     let memberships = store.list_memberships_for_user(user_id).await?;
//!     println!("{} orgs, {} memberships", organizations.len(), memberships.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod rest;
pub mod retry;
pub mod rows;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub use config::{ConfigError, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use retry::RetryConfig;
pub use rows::{MembershipRow, OrganizationRow, RowDefect};

/// Read access to organizations and memberships.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List every organization visible to the caller.
    async fn list_organizations(&self) -> StoreResult<Vec<OrganizationRow>>;

    /// List the raw membership rows of one user.
    async fn list_memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRow>>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn list_organizations(&self) -> StoreResult<Vec<OrganizationRow>> {
        (**self).list_organizations().await
    }

    async fn list_memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRow>> {
        (**self).list_memberships_for_user(user_id).await
    }
}
