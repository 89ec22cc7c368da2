//! Audit events and the state transitions that produce them.
//!
//! Every successful write to the registry is a [`Transition`]: one
//! [`Mutation`] of the stored records plus the [`RegistryEvent`] describing it.
//! Stores apply both atomically and stamp the event with the next sequence
//! number, so the event log is complete and totally ordered.

use serde::{Deserialize, Serialize};

use crate::crypto::KeyHash;
use crate::error::{CoreError, Result};
use crate::records::{AccessGrant, Document, EmergencyContact, EmergencyOverride, Timestamp};
use crate::types::{ContentHash, Identity};

/// An audit event emitted by a successful registry write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A document was created or its metadata rewritten by the owner.
    DocumentUploaded {
        document: ContentHash,
        owner: Identity,
        metadata: String,
        timestamp: Timestamp,
    },

    /// A grant was created or its expiry overwritten.
    AccessGranted {
        document: ContentHash,
        grantee: Identity,
        expires_at: Timestamp,
    },

    /// A grant was revoked (or was already absent).
    AccessRevoked {
        document: ContentHash,
        grantee: Identity,
    },

    /// The emergency override was triggered.
    EmergencyActivated {
        document: ContentHash,
        activated_by: Identity,
        key_hash: KeyHash,
    },

    /// The owner registered an emergency contact.
    EmergencyContactRegistered {
        document: ContentHash,
        contact: Identity,
    },
}

impl RegistryEvent {
    /// The document this event concerns.
    pub fn document(&self) -> &ContentHash {
        match self {
            RegistryEvent::DocumentUploaded { document, .. }
            | RegistryEvent::AccessGranted { document, .. }
            | RegistryEvent::AccessRevoked { document, .. }
            | RegistryEvent::EmergencyActivated { document, .. }
            | RegistryEvent::EmergencyContactRegistered { document, .. } => document,
        }
    }

    /// Stable name of the event kind, used as a storage column and log field.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::DocumentUploaded { .. } => "DocumentUploaded",
            RegistryEvent::AccessGranted { .. } => "AccessGranted",
            RegistryEvent::AccessRevoked { .. } => "AccessRevoked",
            RegistryEvent::EmergencyActivated { .. } => "EmergencyActivated",
            RegistryEvent::EmergencyContactRegistered { .. } => "EmergencyContactRegistered",
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

/// A committed event with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log. Starts at 1, no gaps.
    pub seq: u64,

    /// Registry time of the commit.
    pub timestamp: Timestamp,

    pub event: RegistryEvent,
}

/// A change to the stored records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Insert or replace a document.
    PutDocument(Document),

    /// Insert or replace the grant for `(document, grantee)`.
    PutGrant(AccessGrant),

    /// Delete the grant for `(document, grantee)` if present.
    RemoveGrant {
        document: ContentHash,
        grantee: Identity,
    },

    /// Add an emergency contact if not already present.
    AddEmergencyContact(EmergencyContact),

    /// Insert or replace a document's emergency override.
    PutEmergencyOverride(EmergencyOverride),
}

/// One atomic registry write: the mutation and the event it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub mutation: Mutation,
    pub event: RegistryEvent,
    /// Registry time at which the transition was planned.
    pub at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_cbor_roundtrip() {
        let event = RegistryEvent::EmergencyActivated {
            document: ContentHash::new("abc").unwrap(),
            activated_by: Identity::new("alice").unwrap(),
            key_hash: KeyHash::commit(b"secret"),
        };

        let bytes = event.to_bytes().unwrap();
        assert_eq!(RegistryEvent::from_bytes(&bytes).unwrap(), event);
    }

    #[test]
    fn test_event_accessors() {
        let event = RegistryEvent::AccessRevoked {
            document: ContentHash::new("abc").unwrap(),
            grantee: Identity::new("bob").unwrap(),
        };
        assert_eq!(event.document().as_str(), "abc");
        assert_eq!(event.name(), "AccessRevoked");
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            RegistryEvent::from_bytes(&[0xff, 0x00, 0x13]),
            Err(CoreError::DecodingError(_))
        ));
    }
}
