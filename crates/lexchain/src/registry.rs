//! The Registry: unified API for the LexChain system.
//!
//! The Registry brings together the permission rules and storage into one
//! facade. Every write follows the same path: take the writer lock, read the
//! records the operation depends on, plan a transition, commit it, publish
//! the committed event.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use lexchain_core::{
    AccessGrant, Clock, ContentHash, Document, EmergencyContact, EmergencyOverride,
    EmergencySecret, EventRecord, Identity, KeyHash, SystemClock, Timestamp, Transition,
};
use lexchain_perms::{AccessDecision, AccessGate, PermsError, Rules};
use lexchain_store::{Store, StoreError};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// The main Registry struct.
///
/// Provides a unified API for:
/// - Uploading documents and rewriting their metadata
/// - Granting and revoking time-bound access
/// - Registering emergency contacts and activating the emergency override
/// - Answering access queries
/// - Reading and following the audit log
pub struct Registry<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Source of "now" for grants, expiry checks, and audit timestamps.
    clock: Arc<dyn Clock>,
    /// Configuration.
    config: RegistryConfig,
    /// Rules derived from the configuration.
    rules: Rules,
    /// Serializes validate + commit so writes form one total order.
    write_lock: Mutex<()>,
    /// Live feed of committed events.
    events: broadcast::Sender<EventRecord>,
}

impl<S: Store> Registry<S> {
    /// Create a new registry over `store`, reading time from `clock`.
    pub fn new(store: S, clock: Arc<dyn Clock>, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_buffer);

        Ok(Self {
            store: Arc::new(store),
            clock,
            rules: config.rules(),
            config,
            write_lock: Mutex::new(()),
            events,
        })
    }

    /// Create a registry that reads wall-clock time.
    pub fn with_system_clock(store: S, config: RegistryConfig) -> Result<Self> {
        Self::new(store, Arc::new(SystemClock), config)
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Current time according to the registry's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a document, or rewrite its metadata if `caller` owns it.
    ///
    /// The first uploader of a hash becomes its owner for good. Anyone else
    /// re-uploading the same hash is rejected with `NotOwner`.
    pub async fn upload_document(
        &self,
        caller: &Identity,
        hash: &ContentHash,
        metadata: &str,
    ) -> Result<Document> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let existing = self.store.get_document(hash).await?;
        let transition = self
            .rules
            .plan_upload(existing.as_ref(), hash, metadata, caller, now)
            .map_err(|e| rejected("upload_document", caller, hash, e))?;

        self.commit(transition).await?;

        self.store
            .get_document(hash)
            .await?
            .ok_or_else(|| missing_after_commit("document", hash))
    }

    /// Get a document by content hash.
    pub async fn get_document(&self, hash: &ContentHash) -> Result<Document> {
        self.store
            .get_document(hash)
            .await?
            .ok_or_else(|| RegistryError::not_found(hash))
    }

    /// List registered documents, ordered by hash.
    pub async fn list_documents(&self) -> Result<Vec<ContentHash>> {
        Ok(self.store.list_documents(None).await?)
    }

    /// List documents owned by `owner`, ordered by hash.
    pub async fn list_documents_by(&self, owner: &Identity) -> Result<Vec<ContentHash>> {
        Ok(self.store.list_documents(Some(owner)).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `grantee` access to `hash` for `duration` seconds from now.
    ///
    /// Overwrites any earlier grant to the same grantee, shortening it if the
    /// new expiry is sooner.
    pub async fn grant_access(
        &self,
        caller: &Identity,
        hash: &ContentHash,
        grantee: &Identity,
        duration: i64,
    ) -> Result<AccessGrant> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let document = self.store.get_document(hash).await?;
        let transition = self
            .rules
            .plan_grant(document.as_ref(), hash, grantee, duration, caller, now)
            .map_err(|e| rejected("grant_access", caller, hash, e))?;

        self.commit(transition).await?;

        self.store
            .get_grant(hash, grantee)
            .await?
            .ok_or_else(|| missing_after_commit("grant", hash))
    }

    /// Grant access for the configured default duration.
    pub async fn grant_access_default(
        &self,
        caller: &Identity,
        hash: &ContentHash,
        grantee: &Identity,
    ) -> Result<AccessGrant> {
        self.grant_access(caller, hash, grantee, self.config.default_grant_duration_secs)
            .await
    }

    /// Remove `grantee`'s grant on `hash`.
    ///
    /// Succeeds, and is recorded in the audit log, even when no grant exists.
    pub async fn revoke_access(
        &self,
        caller: &Identity,
        hash: &ContentHash,
        grantee: &Identity,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let document = self.store.get_document(hash).await?;
        let transition = self
            .rules
            .plan_revoke(document.as_ref(), hash, grantee, caller, now)
            .map_err(|e| rejected("revoke_access", caller, hash, e))?;

        self.commit(transition).await?;
        Ok(())
    }

    /// The grant record for `(hash, grantee)`, expired or not.
    pub async fn grant(
        &self,
        hash: &ContentHash,
        grantee: &Identity,
    ) -> Result<Option<AccessGrant>> {
        self.require_document(hash).await?;
        Ok(self.store.get_grant(hash, grantee).await?)
    }

    /// Every grant record on `hash`, including lapsed ones.
    pub async fn grants(&self, hash: &ContentHash) -> Result<Vec<AccessGrant>> {
        self.require_document(hash).await?;
        Ok(self.store.grants_for(hash).await?)
    }

    /// Grants on `hash` that are in force right now.
    pub async fn active_grants(&self, hash: &ContentHash) -> Result<Vec<AccessGrant>> {
        let now = self.clock.now();
        let grants = self.grants(hash).await?;
        Ok(grants.into_iter().filter(|g| g.is_active(now)).collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Emergency Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Allow `contact` to trigger the emergency override on `hash`. Owner only.
    ///
    /// Registering the same contact twice keeps the original record.
    pub async fn register_emergency_contact(
        &self,
        caller: &Identity,
        hash: &ContentHash,
        contact: &Identity,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let document = self.store.get_document(hash).await?;
        let transition = self
            .rules
            .plan_register_contact(document.as_ref(), hash, contact, caller, now)
            .map_err(|e| rejected("register_emergency_contact", caller, hash, e))?;

        self.commit(transition).await?;
        Ok(())
    }

    /// Activate the emergency override on `hash`, committing to `key_hash`.
    ///
    /// Activation is one-way. Who may call this is decided by the configured
    /// [`EmergencyPolicy`](lexchain_perms::EmergencyPolicy).
    pub async fn activate_emergency(
        &self,
        caller: &Identity,
        hash: &ContentHash,
        key_hash: KeyHash,
    ) -> Result<EmergencyOverride> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let view = self.store.emergency_view(hash, Some(caller)).await?;
        let transition = self
            .rules
            .plan_activation(view.as_ref(), hash, key_hash, caller, now)
            .map_err(|e| rejected("activate_emergency", caller, hash, e))?;

        self.commit(transition).await?;

        self.store
            .get_emergency(hash)
            .await?
            .ok_or_else(|| missing_after_commit("emergency override", hash))
    }

    /// The emergency override on `hash`, if one was ever activated.
    pub async fn emergency_status(
        &self,
        hash: &ContentHash,
    ) -> Result<Option<EmergencyOverride>> {
        self.require_document(hash).await?;
        Ok(self.store.get_emergency(hash).await?)
    }

    /// Emergency contacts registered for `hash`.
    pub async fn emergency_contacts(&self, hash: &ContentHash) -> Result<Vec<EmergencyContact>> {
        self.require_document(hash).await?;
        Ok(self.store.emergency_contacts(hash).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Explain whether `identity` may access `hash` right now.
    pub async fn check_access(
        &self,
        hash: &ContentHash,
        identity: &Identity,
    ) -> Result<AccessDecision> {
        let now = self.clock.now();
        let view = self
            .store
            .access_view(hash, identity)
            .await?
            .ok_or_else(|| RegistryError::not_found(hash))?;

        let decision = AccessGate::decide(&view, identity, now);
        tracing::debug!(document = %hash, %identity, ?decision, "access check");
        Ok(decision)
    }

    /// Whether `identity` may access `hash` right now.
    ///
    /// True for the owner and for holders of an unexpired grant. The
    /// emergency override plays no part here.
    pub async fn has_access(&self, hash: &ContentHash, identity: &Identity) -> Result<bool> {
        Ok(self.check_access(hash, identity).await?.allows())
    }

    /// Whether `secret` opens the active emergency override on `hash`.
    pub async fn has_emergency_access(
        &self,
        hash: &ContentHash,
        secret: &EmergencySecret,
    ) -> Result<bool> {
        let view = self
            .store
            .emergency_view(hash, None)
            .await?
            .ok_or_else(|| RegistryError::not_found(hash))?;

        let allowed = AccessGate::has_emergency_access(view.emergency.as_ref(), secret);
        tracing::debug!(document = %hash, allowed, "emergency access check");
        Ok(allowed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Audit Log
    // ─────────────────────────────────────────────────────────────────────────

    /// Committed events with `seq > after_seq`, oldest first, at most `limit`.
    pub async fn events_since(&self, after_seq: u64, limit: usize) -> Result<Vec<EventRecord>> {
        Ok(self.store.events_since(after_seq, limit).await?)
    }

    /// Sequence number of the last committed event (0 if none).
    pub async fn head_seq(&self) -> Result<u64> {
        Ok(self.store.head_seq().await?)
    }

    /// Follow events committed from now on.
    ///
    /// Combine with [`events_since`](Self::events_since) to catch up on
    /// history first; a lagging receiver skips ahead and should re-read from
    /// its last seen `seq`. A write whose caller is dropped mid-commit can
    /// still land in the store without being broadcast, so the log is the
    /// source of truth: receivers that see a `seq` gap should re-read it.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Commit a planned transition and publish it. Caller holds the write lock.
    async fn commit(&self, transition: Transition) -> Result<EventRecord> {
        let record = self.store.commit(&transition).await.map_err(|e| {
            tracing::warn!(kind = transition.event.name(), error = %e, "commit failed");
            e
        })?;

        tracing::info!(
            seq = record.seq,
            kind = record.event.name(),
            document = %record.event.document(),
            "event committed"
        );

        // No subscribers is not an error.
        let _ = self.events.send(record.clone());
        Ok(record)
    }

    async fn require_document(&self, hash: &ContentHash) -> Result<()> {
        match self.store.get_document(hash).await? {
            Some(_) => Ok(()),
            None => Err(RegistryError::not_found(hash)),
        }
    }
}

fn rejected(
    op: &'static str,
    caller: &Identity,
    hash: &ContentHash,
    e: PermsError,
) -> RegistryError {
    tracing::debug!(op, %caller, document = %hash, error = %e, "operation rejected");
    RegistryError::Permission(e)
}

fn missing_after_commit(what: &str, hash: &ContentHash) -> RegistryError {
    tracing::warn!(document = %hash, what, "record missing after commit");
    RegistryError::Store(StoreError::InvalidData(format!(
        "{} for {} missing after commit",
        what, hash
    )))
}
