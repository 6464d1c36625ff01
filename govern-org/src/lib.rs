//! # Govern Organization Model
//!
//! This crate provides the organization model behind the compliance
//! dashboard's access context.
//!
//! ## Overview
//!
//! The govern-org crate handles:
//! - **Organizations**: Tenant entities arranged in a forest via `parent_id`
//! - **Metadata**: Validated, typed access to the open metadata column
//! - **Memberships**: User-organization relationships with a role
//! - **Roles**: The closed `admin` / `manager` role set and effective roles
//! - **Hierarchy**: An immutable index answering ancestor/descendant queries
//!
//! ## Architecture
//!
//! ```text
//! User
//!   └─ Membership (role) ─→ Organization
//!                               ├─ Metadata
//!                               └─ parent ─→ Organization ─→ ...
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use govern_org::{Membership, MembershipRole, MembershipSet, OrgHierarchy, Organization};
//! use uuid::Uuid;
//!
//! let group = Organization::new("Acme Group");
//! let unit = Organization::new("Acme Payments").with_parent(group.id);
//! let group_id = group.id;
//! let hierarchy = OrgHierarchy::build([group, unit]).unwrap();
//!
//! let user_id = Uuid::now_v7();
//! let memberships = MembershipSet::from_memberships([
//!     Membership::new(group_id, user_id, MembershipRole::Admin),
//! ]);
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `govern-rbac`: Authorization decisions over memberships and hierarchy
//! - `govern-store`: Rows fetched from the remote store
//! - `govern-context`: The active-organization context

pub mod hierarchy;
pub mod membership;
pub mod metadata;
pub mod organization;
pub mod roles;

// Re-export main types for convenience
pub use hierarchy::{HierarchyError, HierarchyResult, OrgHierarchy};
pub use membership::{Membership, MembershipSet};
pub use metadata::{Metadata, MetadataError, MetadataValue};
pub use organization::Organization;
pub use roles::{EffectiveRole, MembershipRole, RoleSource};
