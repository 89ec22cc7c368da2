//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use lexchain_core::{
    AccessGrant, AccessView, ContentHash, Document, EmergencyContact, EmergencyOverride,
    EmergencyView, EventRecord, Identity, Mutation, Transition,
};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; a
/// commit holds the write lock for the mutation and the log append together.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Documents indexed by hash.
    documents: BTreeMap<ContentHash, Document>,

    /// Grants: document -> grantee -> grant.
    grants: HashMap<ContentHash, BTreeMap<Identity, AccessGrant>>,

    /// Emergency overrides by document.
    emergencies: HashMap<ContentHash, EmergencyOverride>,

    /// Emergency contacts: document -> contact -> record.
    contacts: HashMap<ContentHash, BTreeMap<Identity, EmergencyContact>>,

    /// Event log. `events[i].seq == i + 1`.
    events: Vec<EventRecord>,
}

impl MemoryStoreInner {
    fn apply(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::PutDocument(doc) => {
                self.documents.insert(doc.hash.clone(), doc.clone());
            }
            Mutation::PutGrant(grant) => {
                self.grants
                    .entry(grant.document.clone())
                    .or_default()
                    .insert(grant.grantee.clone(), grant.clone());
            }
            Mutation::RemoveGrant { document, grantee } => {
                if let Some(grants) = self.grants.get_mut(document) {
                    grants.remove(grantee);
                }
            }
            Mutation::AddEmergencyContact(contact) => {
                self.contacts
                    .entry(contact.document.clone())
                    .or_default()
                    .entry(contact.contact.clone())
                    .or_insert_with(|| contact.clone());
            }
            Mutation::PutEmergencyOverride(emergency) => {
                self.emergencies
                    .insert(emergency.document.clone(), emergency.clone());
            }
        }
    }

    fn grant(&self, hash: &ContentHash, grantee: &Identity) -> Option<AccessGrant> {
        self.grants.get(hash).and_then(|g| g.get(grantee)).cloned()
    }

    fn is_contact(&self, hash: &ContentHash, identity: &Identity) -> bool {
        self.contacts
            .get(hash)
            .is_some_and(|c| c.contains_key(identity))
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_document(&self, hash: &ContentHash) -> Result<Option<Document>> {
        let inner = self.read()?;
        Ok(inner.documents.get(hash).cloned())
    }

    async fn list_documents(&self, owner: Option<&Identity>) -> Result<Vec<ContentHash>> {
        let inner = self.read()?;

        let hashes = inner
            .documents
            .values()
            .filter(|d| owner.map_or(true, |o| &d.owner == o))
            .map(|d| d.hash.clone())
            .collect();

        Ok(hashes)
    }

    async fn get_grant(
        &self,
        hash: &ContentHash,
        grantee: &Identity,
    ) -> Result<Option<AccessGrant>> {
        let inner = self.read()?;
        Ok(inner.grant(hash, grantee))
    }

    async fn grants_for(&self, hash: &ContentHash) -> Result<Vec<AccessGrant>> {
        let inner = self.read()?;
        Ok(inner
            .grants
            .get(hash)
            .map(|g| g.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_emergency(&self, hash: &ContentHash) -> Result<Option<EmergencyOverride>> {
        let inner = self.read()?;
        Ok(inner.emergencies.get(hash).cloned())
    }

    async fn emergency_contacts(&self, hash: &ContentHash) -> Result<Vec<EmergencyContact>> {
        let inner = self.read()?;
        Ok(inner
            .contacts
            .get(hash)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn access_view(
        &self,
        hash: &ContentHash,
        identity: &Identity,
    ) -> Result<Option<AccessView>> {
        let inner = self.read()?;

        Ok(inner.documents.get(hash).map(|document| AccessView {
            document: document.clone(),
            grant: inner.grant(hash, identity),
        }))
    }

    async fn emergency_view(
        &self,
        hash: &ContentHash,
        identity: Option<&Identity>,
    ) -> Result<Option<EmergencyView>> {
        let inner = self.read()?;

        Ok(inner.documents.get(hash).map(|document| EmergencyView {
            document: document.clone(),
            emergency: inner.emergencies.get(hash).cloned(),
            is_contact: identity.is_some_and(|id| inner.is_contact(hash, id)),
        }))
    }

    async fn commit(&self, transition: &Transition) -> Result<EventRecord> {
        let mut inner = self.write()?;

        inner.apply(&transition.mutation);

        let record = EventRecord {
            seq: inner.events.len() as u64 + 1,
            timestamp: transition.at,
            event: transition.event.clone(),
        };
        inner.events.push(record.clone());

        Ok(record)
    }

    async fn events_since(&self, after_seq: u64, limit: usize) -> Result<Vec<EventRecord>> {
        let inner = self.read()?;

        let start = usize::try_from(after_seq)
            .unwrap_or(usize::MAX)
            .min(inner.events.len());

        Ok(inner.events[start..].iter().take(limit).cloned().collect())
    }

    async fn head_seq(&self) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.events.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexchain_core::{KeyHash, RegistryEvent};
    use proptest::prelude::*;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn hash(s: &str) -> ContentHash {
        ContentHash::new(s).unwrap()
    }

    fn upload(h: &str, owner: &str, at: i64) -> Transition {
        let doc = Document {
            hash: hash(h),
            owner: id(owner),
            metadata: format!("{} meta", h),
            created_at: at,
            updated_at: at,
        };
        Transition {
            event: RegistryEvent::DocumentUploaded {
                document: doc.hash.clone(),
                owner: doc.owner.clone(),
                metadata: doc.metadata.clone(),
                timestamp: at,
            },
            mutation: Mutation::PutDocument(doc),
            at,
        }
    }

    fn grant(h: &str, grantee: &str, expires_at: i64) -> Transition {
        Transition {
            mutation: Mutation::PutGrant(AccessGrant {
                document: hash(h),
                grantee: id(grantee),
                expires_at,
                granted_by: id("alice"),
                granted_at: 0,
            }),
            event: RegistryEvent::AccessGranted {
                document: hash(h),
                grantee: id(grantee),
                expires_at,
            },
            at: 0,
        }
    }

    #[tokio::test]
    async fn test_commit_assigns_sequential_seqs() {
        let store = MemoryStore::new();

        let r1 = store.commit(&upload("a", "alice", 1)).await.unwrap();
        let r2 = store.commit(&upload("b", "bob", 2)).await.unwrap();

        assert_eq!(r1.seq, 1);
        assert_eq!(r2.seq, 2);
        assert_eq!(store.head_seq().await.unwrap(), 2);

        let events = store.events_since(1, 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].seq, 2);
        assert!(store.events_since(99, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_grant_overwrites_by_key() {
        let store = MemoryStore::new();
        store.commit(&upload("a", "alice", 0)).await.unwrap();
        store.commit(&grant("a", "bob", 100)).await.unwrap();
        store.commit(&grant("a", "bob", 50)).await.unwrap();

        let grants = store.grants_for(&hash("a")).await.unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].expires_at, 50);
    }

    #[tokio::test]
    async fn test_access_view_missing_document() {
        let store = MemoryStore::new();
        assert!(store
            .access_view(&hash("nope"), &id("bob"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_emergency_view_reports_contacts() {
        let store = MemoryStore::new();
        store.commit(&upload("a", "alice", 0)).await.unwrap();
        store
            .commit(&Transition {
                mutation: Mutation::AddEmergencyContact(EmergencyContact {
                    document: hash("a"),
                    contact: id("carol"),
                    added_at: 3,
                }),
                event: RegistryEvent::EmergencyContactRegistered {
                    document: hash("a"),
                    contact: id("carol"),
                },
                at: 3,
            })
            .await
            .unwrap();

        let view = store
            .emergency_view(&hash("a"), Some(&id("carol")))
            .await
            .unwrap()
            .unwrap();
        assert!(view.is_contact);
        assert!(view.emergency.is_none());

        let view = store
            .emergency_view(&hash("a"), None)
            .await
            .unwrap()
            .unwrap();
        assert!(!view.is_contact);

        store
            .commit(&Transition {
                mutation: Mutation::PutEmergencyOverride(EmergencyOverride {
                    document: hash("a"),
                    key_hash: KeyHash::commit(b"s"),
                    activated_by: id("carol"),
                    activated_at: 4,
                    active: true,
                }),
                event: RegistryEvent::EmergencyActivated {
                    document: hash("a"),
                    activated_by: id("carol"),
                    key_hash: KeyHash::commit(b"s"),
                },
                at: 4,
            })
            .await
            .unwrap();
        assert!(store.get_emergency(&hash("a")).await.unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn test_list_documents_by_owner() {
        let store = MemoryStore::new();
        store.commit(&upload("b", "alice", 0)).await.unwrap();
        store.commit(&upload("a", "alice", 0)).await.unwrap();
        store.commit(&upload("c", "bob", 0)).await.unwrap();

        let all = store.list_documents(None).await.unwrap();
        assert_eq!(all, vec![hash("a"), hash("b"), hash("c")]);

        let alice = store.list_documents(Some(&id("alice"))).await.unwrap();
        assert_eq!(alice, vec![hash("a"), hash("b")]);
    }

    proptest! {
        #[test]
        fn prop_one_grant_per_grantee(
            grants in prop::collection::vec((0u8..4, 1i64..1000), 1..32),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = MemoryStore::new();
                store.commit(&upload("a", "alice", 0)).await.unwrap();

                let mut latest = std::collections::BTreeMap::new();
                for (who, expires_at) in &grants {
                    let grantee = format!("g{}", who);
                    store.commit(&grant("a", &grantee, *expires_at)).await.unwrap();
                    latest.insert(id(&grantee), *expires_at);
                }

                let stored = store.grants_for(&hash("a")).await.unwrap();
                assert_eq!(stored.len(), latest.len());
                for g in stored {
                    assert_eq!(latest[&g.grantee], g.expires_at);
                }
                assert_eq!(store.head_seq().await.unwrap(), grants.len() as u64 + 1);
            });
        }
    }
}
