//! # Govern Authentication
//!
//! This crate provides the session boundary of the compliance dashboard.
//!
//! ## Overview
//!
//! The govern-auth crate handles:
//! - **Principal**: The signed-in user (`id`, `email`)
//! - **Sessions**: The `SessionProvider` trait, lifecycle events, and an
//!   in-process provider
//! - **Claims**: Access token claims issued by the hosted auth service
//! - **JWT**: Access token validation (optional)
//!
//! ## Features
//!
//! - `jwt` (default): Access token validation using jsonwebtoken
//!
//! ## Usage
//!
//! ```rust,no_run
//! use govern_auth::{MemorySessionProvider, Principal, SessionEvent, SessionProvider};
//! use uuid::Uuid;
//!
//! async fn watch_session(provider: &MemorySessionProvider) {
//!     let mut events = provider.subscribe();
//!     provider.establish(Principal::new(Uuid::now_v7(), "user@example.com"));
//!
//!     while let Ok(event) = events.recv().await {
//!         if event.ends_session() {
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! ## Cross-Crate Integration
//!
//! The `govern-context` crate subscribes to a `SessionProvider` and resets or
//! re-initializes the active-organization context on lifecycle events.

pub mod claims;
pub mod error;
#[cfg(feature = "jwt")]
pub mod jwt;
pub mod principal;
pub mod session;

// Re-export main types
pub use claims::SessionClaims;
pub use error::{AuthError, AuthResult};
pub use principal::Principal;
pub use session::{MemorySessionProvider, SessionEvent, SessionProvider};

#[cfg(feature = "jwt")]
pub use jwt::{JwtAlgorithm, JwtConfig, TokenVerifier};
