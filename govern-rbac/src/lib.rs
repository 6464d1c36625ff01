//! # Govern RBAC
//!
//! This crate provides the authorization gate for the compliance dashboard.
//!
//! ## Overview
//!
//! The govern-rbac crate handles:
//! - **Actions**: The closed set of gated operations, each with a minimum
//!   role and an inheritance flag
//! - **Gate**: Pure functions deciding whether an action is allowed in an
//!   organization, and what the user's effective role there is
//!
//! ## Role Inheritance
//!
//! ```text
//! Group          admin (direct)    -> every action
//!   └─ Unit      admin (inherited) -> view only
//! ```
//!
//! Admin rights on an organization make its descendants visible. They never
//! grant write or membership management in a descendant; the manager role is
//! not inherited at all.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use govern_org::{MembershipSet, OrgHierarchy};
//! use govern_rbac::{can_perform, AccessView, Action};
//! use uuid::Uuid;
//!
//! let memberships = MembershipSet::new();
//! let hierarchy = OrgHierarchy::empty();
//! let view = AccessView::new(&memberships, &hierarchy);
//!
//! if can_perform(Action::EditPolicy, Uuid::now_v7(), &view) {
//!     // render the policy editor
//! }
//! ```

pub mod actions;
pub mod gate;

// Re-export main types for convenience
pub use actions::Action;
pub use gate::{can_perform, effective_role, is_accessible, AccessScope, AccessView};
