//! # LexChain Permissions
//!
//! The rules that govern the registry: document ownership, time-bound
//! grants, and the one-way emergency override.
//!
//! ## Overview
//!
//! Writes are validated by [`Rules`], which turns an operation plus the
//! current records into a single [`Transition`](lexchain_core::Transition)
//! or a [`PermsError`]. Reads go through [`AccessGate`], which is pure.
//!
//! ## Key Concepts
//!
//! - **Owner**: the identity that first uploaded a document. Only the owner
//!   can rewrite metadata, grant, revoke, or register emergency contacts.
//! - **Grant**: access for one identity to one document until `expires_at`.
//!   Expiry is lazy: a grant simply stops counting once `now >= expires_at`.
//! - **Emergency override**: a commitment to a recovery secret. Once active
//!   it stays active, and access through it requires presenting the secret.
//!
//! ## Usage
//!
//! ```rust
//! use lexchain_core::{ContentHash, Identity};
//! use lexchain_perms::Rules;
//!
//! let rules = Rules::default();
//! let hash = ContentHash::new("bafy-contract").unwrap();
//! let alice = Identity::new("0xa11ce").unwrap();
//!
//! let transition = rules.plan_upload(None, &hash, "contract.pdf", &alice, 0).unwrap();
//! assert_eq!(transition.event.name(), "DocumentUploaded");
//! ```

pub mod error;
pub mod gate;
pub mod policy;
pub mod rules;

pub use error::{PermsError, Result};
pub use gate::{AccessDecision, AccessGate};
pub use policy::EmergencyPolicy;
pub use rules::{Rules, DEFAULT_MAX_METADATA_LEN};
