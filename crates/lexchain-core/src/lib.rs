//! # LexChain Core
//!
//! Pure primitives for the LexChain document registry: identifiers, records,
//! audit events, and emergency key commitments.
//!
//! This crate contains no I/O, no storage, no networking. It is pure data and
//! computation shared by the permission rules, the stores, and the registry.
//!
//! ## Key Types
//!
//! - [`ContentHash`] - Opaque content identifier, the primary key of a document
//! - [`Identity`] - Opaque, externally authenticated caller reference
//! - [`Document`], [`AccessGrant`], [`EmergencyOverride`] - Registry records
//! - [`RegistryEvent`] - Audit events emitted by every successful write
//! - [`KeyHash`] - Commitment to an out-of-band emergency secret
//! - [`Clock`] - Source of the current time in Unix seconds

pub mod clock;
pub mod crypto;
pub mod error;
pub mod events;
pub mod records;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{EmergencySecret, KeyHash, KEY_COMMIT_DOMAIN};
pub use error::{CoreError, Result};
pub use events::{EventRecord, Mutation, RegistryEvent, Transition};
pub use records::{
    AccessGrant, AccessView, Document, EmergencyContact, EmergencyOverride, EmergencyView,
    Timestamp,
};
pub use types::{ContentHash, Identity, MAX_CONTENT_HASH_LEN, MAX_IDENTITY_LEN};
