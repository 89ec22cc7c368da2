//! # LexChain
//!
//! An access-control registry for content-addressed documents: owners
//! register documents by hash, hand out time-bound access grants, and can
//! arm a one-way emergency override opened by an out-of-band secret.
//!
//! ## Overview
//!
//! - **Documents**: keyed by content hash. The first uploader owns the hash.
//! - **Grants**: per (document, grantee), valid while `now < expires_at`.
//!   Expiry is lazy; there is no sweeper.
//! - **Emergency override**: a BLAKE3 commitment to a recovery secret. Once
//!   active it stays active. It never widens `has_access`; it is checked
//!   through `has_emergency_access` only.
//! - **Audit log**: every successful write commits exactly one event, numbered
//!   1, 2, 3, ... in commit order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lexchain::{Registry, RegistryConfig};
//! use lexchain::core::{ContentHash, EmergencySecret, Identity};
//! use lexchain::store::SqliteStore;
//!
//! async fn example() -> lexchain::Result<()> {
//!     let store = SqliteStore::open("registry.db")?;
//!     let registry = Registry::with_system_clock(store, RegistryConfig::default())?;
//!
//!     let alice = Identity::new("0xa11ce")?;
//!     let bob = Identity::new("0xb0b")?;
//!     let doc = ContentHash::new("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi")?;
//!
//!     registry.upload_document(&alice, &doc, "lease.pdf").await?;
//!     registry.grant_access(&alice, &doc, &bob, 3600).await?;
//!     assert!(registry.has_access(&doc, &bob).await?);
//!
//!     let secret = EmergencySecret::from("correct horse battery staple");
//!     registry.activate_emergency(&alice, &doc, secret.commitment()).await?;
//!     assert!(registry.has_emergency_access(&doc, &secret).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `lexchain::core` - Identifiers, records, events, key commitments
//! - `lexchain::perms` - Ownership, grant, and emergency rules
//! - `lexchain::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod registry;

// Re-export component crates
pub use lexchain_core as core;
pub use lexchain_perms as perms;
pub use lexchain_store as store;

// Re-export main types for convenience
pub use config::{RegistryConfig, DEFAULT_EVENT_BUFFER, DEFAULT_GRANT_DURATION_SECS};
pub use error::{RegistryError, Result};
pub use registry::Registry;

// Re-export commonly used core types
pub use lexchain_core::{
    AccessGrant, ContentHash, Document, EmergencyOverride, EmergencySecret, EventRecord, Identity,
    KeyHash, RegistryEvent,
};
pub use lexchain_perms::{AccessDecision, EmergencyPolicy, PermsError};
