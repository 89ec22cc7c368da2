//! Store trait: the abstract interface for registry persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use lexchain_core::{
    AccessGrant, AccessView, ContentHash, Document, EmergencyContact, EmergencyOverride,
    EmergencyView, EventRecord, Identity, Transition,
};

use crate::error::Result;

/// The Store trait: async interface for registry persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Atomic commits**: [`Store::commit`] applies a transition's mutation and
///   appends its event as one indivisible step. Readers never observe one
///   without the other.
/// - **Gap-free log**: committed events are numbered 1, 2, 3, ... in commit
///   order.
/// - **Snapshot views**: [`Store::access_view`] and [`Store::emergency_view`]
///   read a document together with its related records in one step.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a document by content hash.
    async fn get_document(&self, hash: &ContentHash) -> Result<Option<Document>>;

    /// List document hashes, optionally only those owned by `owner`.
    ///
    /// Ordered by hash.
    async fn list_documents(&self, owner: Option<&Identity>) -> Result<Vec<ContentHash>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the grant for `(hash, grantee)`, expired or not.
    async fn get_grant(&self, hash: &ContentHash, grantee: &Identity)
        -> Result<Option<AccessGrant>>;

    /// All grant records for a document, ordered by grantee.
    async fn grants_for(&self, hash: &ContentHash) -> Result<Vec<AccessGrant>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Emergency Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a document's emergency override, if one was ever activated.
    async fn get_emergency(&self, hash: &ContentHash) -> Result<Option<EmergencyOverride>>;

    /// Emergency contacts registered for a document, ordered by contact.
    async fn emergency_contacts(&self, hash: &ContentHash) -> Result<Vec<EmergencyContact>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshot Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Read a document and `identity`'s grant on it in one step.
    ///
    /// Returns `None` if the document does not exist.
    async fn access_view(
        &self,
        hash: &ContentHash,
        identity: &Identity,
    ) -> Result<Option<AccessView>>;

    /// Read a document, its override, and whether `identity` is a registered
    /// contact, in one step.
    ///
    /// Returns `None` if the document does not exist.
    async fn emergency_view(
        &self,
        hash: &ContentHash,
        identity: Option<&Identity>,
    ) -> Result<Option<EmergencyView>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Writes and Event Log
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a transition atomically and append its event to the log.
    ///
    /// Returns the committed event with its assigned sequence number.
    async fn commit(&self, transition: &Transition) -> Result<EventRecord>;

    /// Events with `seq > after_seq`, oldest first, at most `limit`.
    async fn events_since(&self, after_seq: u64, limit: usize) -> Result<Vec<EventRecord>>;

    /// Sequence number of the last committed event (0 if none).
    async fn head_seq(&self) -> Result<u64>;
}
