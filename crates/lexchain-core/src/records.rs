//! Registry records: documents, access grants, and emergency overrides.

use serde::{Deserialize, Serialize};

use crate::crypto::KeyHash;
use crate::types::{ContentHash, Identity};

/// Unix time in seconds.
pub type Timestamp = i64;

/// A registered document, keyed by its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The content identifier. Immutable primary key.
    pub hash: ContentHash,

    /// The identity that first uploaded the document. Immutable.
    pub owner: Identity,

    /// Opaque short description, e.g. a title.
    pub metadata: String,

    /// When the document was first registered.
    pub created_at: Timestamp,

    /// When the metadata was last written.
    pub updated_at: Timestamp,
}

impl Document {
    /// Check whether `identity` owns this document.
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        &self.owner == identity
    }
}

/// A time-bound grant of access to one document for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    /// The document being shared.
    pub document: ContentHash,

    /// Who receives access.
    pub grantee: Identity,

    /// Access is valid while `now < expires_at`.
    pub expires_at: Timestamp,

    /// The document owner at grant time.
    pub granted_by: Identity,

    /// When the grant was written.
    pub granted_at: Timestamp,
}

impl AccessGrant {
    /// Check whether the grant is still in force at `now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }

    /// Seconds of access left at `now` (zero once lapsed).
    pub fn remaining(&self, now: Timestamp) -> i64 {
        self.expires_at.saturating_sub(now).max(0)
    }
}

/// Emergency override state for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyOverride {
    /// The document the override applies to.
    pub document: ContentHash,

    /// Commitment to the out-of-band recovery secret.
    pub key_hash: KeyHash,

    /// Who triggered the override.
    pub activated_by: Identity,

    /// When it was triggered.
    pub activated_at: Timestamp,

    /// Whether the override is in force. Once true, stays true.
    pub active: bool,
}

/// An identity the owner trusts to trigger the emergency override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub document: ContentHash,
    pub contact: Identity,
    pub added_at: Timestamp,
}

/// A consistent read of a document and one identity's grant on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessView {
    pub document: Document,
    pub grant: Option<AccessGrant>,
}

/// A consistent read of a document's emergency state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencyView {
    pub document: Document,
    pub emergency: Option<EmergencyOverride>,
    /// Whether the identity the view was loaded for is a registered contact.
    pub is_contact: bool,
}
