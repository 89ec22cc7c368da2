//! Transition planning: validate a write against current state.
//!
//! Each `plan_*` method takes the records the operation depends on (as read
//! by the caller under the registry's writer lock) and either rejects the
//! operation or returns the single [`Transition`] that implements it. Nothing
//! here touches storage, so the rules are testable in isolation.

use lexchain_core::{
    AccessGrant, ContentHash, Document, EmergencyContact, EmergencyOverride, EmergencyView,
    Identity, KeyHash, Mutation, RegistryEvent, Timestamp, Transition,
};

use crate::error::{PermsError, Result};
use crate::policy::EmergencyPolicy;

/// Default cap on document metadata, in bytes.
pub const DEFAULT_MAX_METADATA_LEN: usize = 1024;

/// The rule set applied to every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub emergency_policy: EmergencyPolicy,
    pub max_metadata_len: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            emergency_policy: EmergencyPolicy::default(),
            max_metadata_len: DEFAULT_MAX_METADATA_LEN,
        }
    }
}

/// Return the document if it exists and `caller` owns it.
fn owned<'a>(
    document: Option<&'a Document>,
    hash: &ContentHash,
    caller: &Identity,
) -> Result<&'a Document> {
    let document = document.ok_or_else(|| PermsError::NotFound(hash.clone()))?;
    if !document.is_owned_by(caller) {
        return Err(PermsError::NotOwner {
            document: hash.clone(),
            caller: caller.clone(),
        });
    }
    Ok(document)
}

impl Rules {
    /// Plan an upload: create the document, or rewrite its metadata if the
    /// caller already owns it.
    pub fn plan_upload(
        &self,
        existing: Option<&Document>,
        hash: &ContentHash,
        metadata: &str,
        caller: &Identity,
        now: Timestamp,
    ) -> Result<Transition> {
        if let Some(doc) = existing {
            if !doc.is_owned_by(caller) {
                return Err(PermsError::NotOwner {
                    document: hash.clone(),
                    caller: caller.clone(),
                });
            }
        }

        if metadata.len() > self.max_metadata_len {
            return Err(PermsError::InvalidInput(format!(
                "metadata is {} bytes, maximum is {}",
                metadata.len(),
                self.max_metadata_len
            )));
        }

        let document = match existing {
            Some(doc) => Document {
                metadata: metadata.to_string(),
                updated_at: now,
                ..doc.clone()
            },
            None => Document {
                hash: hash.clone(),
                owner: caller.clone(),
                metadata: metadata.to_string(),
                created_at: now,
                updated_at: now,
            },
        };

        let event = RegistryEvent::DocumentUploaded {
            document: hash.clone(),
            owner: document.owner.clone(),
            metadata: document.metadata.clone(),
            timestamp: now,
        };

        Ok(Transition {
            mutation: Mutation::PutDocument(document),
            event,
            at: now,
        })
    }

    /// Plan a grant of `duration` seconds, overwriting any existing grant for
    /// the same grantee.
    pub fn plan_grant(
        &self,
        document: Option<&Document>,
        hash: &ContentHash,
        grantee: &Identity,
        duration: i64,
        caller: &Identity,
        now: Timestamp,
    ) -> Result<Transition> {
        let document = owned(document, hash, caller)?;

        if duration <= 0 {
            return Err(PermsError::InvalidDuration(duration));
        }
        let expires_at = now
            .checked_add(duration)
            .ok_or(PermsError::InvalidDuration(duration))?;

        let grant = AccessGrant {
            document: hash.clone(),
            grantee: grantee.clone(),
            expires_at,
            granted_by: document.owner.clone(),
            granted_at: now,
        };

        Ok(Transition {
            mutation: Mutation::PutGrant(grant),
            event: RegistryEvent::AccessGranted {
                document: hash.clone(),
                grantee: grantee.clone(),
                expires_at,
            },
            at: now,
        })
    }

    /// Plan a revocation. Succeeds whether or not a grant exists.
    pub fn plan_revoke(
        &self,
        document: Option<&Document>,
        hash: &ContentHash,
        grantee: &Identity,
        caller: &Identity,
        now: Timestamp,
    ) -> Result<Transition> {
        owned(document, hash, caller)?;

        Ok(Transition {
            mutation: Mutation::RemoveGrant {
                document: hash.clone(),
                grantee: grantee.clone(),
            },
            event: RegistryEvent::AccessRevoked {
                document: hash.clone(),
                grantee: grantee.clone(),
            },
            at: now,
        })
    }

    /// Plan registration of an emergency contact. Owner only.
    pub fn plan_register_contact(
        &self,
        document: Option<&Document>,
        hash: &ContentHash,
        contact: &Identity,
        caller: &Identity,
        now: Timestamp,
    ) -> Result<Transition> {
        owned(document, hash, caller)?;

        Ok(Transition {
            mutation: Mutation::AddEmergencyContact(EmergencyContact {
                document: hash.clone(),
                contact: contact.clone(),
                added_at: now,
            }),
            event: RegistryEvent::EmergencyContactRegistered {
                document: hash.clone(),
                contact: contact.clone(),
            },
            at: now,
        })
    }

    /// Plan activation of the emergency override.
    ///
    /// `view` must be loaded for `caller` so that contact membership is known.
    /// Activation is one-way: a second call while active is rejected.
    pub fn plan_activation(
        &self,
        view: Option<&EmergencyView>,
        hash: &ContentHash,
        key_hash: KeyHash,
        caller: &Identity,
        now: Timestamp,
    ) -> Result<Transition> {
        let view = view.ok_or_else(|| PermsError::NotFound(hash.clone()))?;

        if !self.emergency_policy.authorizes(view, caller) {
            return Err(PermsError::NotAuthorized {
                document: hash.clone(),
                caller: caller.clone(),
            });
        }

        if view.emergency.as_ref().is_some_and(|e| e.active) {
            return Err(PermsError::AlreadyActive(hash.clone()));
        }

        let emergency = EmergencyOverride {
            document: hash.clone(),
            key_hash,
            activated_by: caller.clone(),
            activated_at: now,
            active: true,
        };

        Ok(Transition {
            mutation: Mutation::PutEmergencyOverride(emergency),
            event: RegistryEvent::EmergencyActivated {
                document: hash.clone(),
                activated_by: caller.clone(),
                key_hash,
            },
            at: now,
        })
    }
}
