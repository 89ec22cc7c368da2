//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for the registry. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use lexchain_core::{
    AccessGrant, AccessView, ContentHash, Document, EmergencyContact, EmergencyOverride,
    EmergencyView, EventRecord, Identity, KeyHash, Mutation, RegistryEvent, Transition,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row conversion helpers
// ─────────────────────────────────────────────────────────────────────────────

fn conversion_error(
    idx: usize,
    ty: Type,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
}

fn hash_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<ContentHash> {
    let value: String = row.get(idx)?;
    ContentHash::new(value).map_err(|e| conversion_error(idx, Type::Text, e))
}

fn identity_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Identity> {
    let value: String = row.get(idx)?;
    Identity::new(value).map_err(|e| conversion_error(idx, Type::Text, e))
}

fn key_hash_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<KeyHash> {
    let bytes: Vec<u8> = row.get(idx)?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| rusqlite::Error::InvalidColumnType(idx, "key_hash".into(), Type::Blob))?;
    Ok(KeyHash::from_bytes(arr))
}

const DOCUMENT_COLUMNS: &str = "hash, owner, metadata, created_at, updated_at";

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        hash: hash_at(row, 0)?,
        owner: identity_at(row, 1)?,
        metadata: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

const GRANT_COLUMNS: &str = "document_hash, grantee, expires_at, granted_by, granted_at";

fn row_to_grant(row: &Row<'_>) -> rusqlite::Result<AccessGrant> {
    Ok(AccessGrant {
        document: hash_at(row, 0)?,
        grantee: identity_at(row, 1)?,
        expires_at: row.get(2)?,
        granted_by: identity_at(row, 3)?,
        granted_at: row.get(4)?,
    })
}

const EMERGENCY_COLUMNS: &str = "document_hash, key_hash, activated_by, activated_at, active";

fn row_to_emergency(row: &Row<'_>) -> rusqlite::Result<EmergencyOverride> {
    Ok(EmergencyOverride {
        document: hash_at(row, 0)?,
        key_hash: key_hash_at(row, 1)?,
        activated_by: identity_at(row, 2)?,
        activated_at: row.get(3)?,
        active: row.get::<_, i64>(4)? != 0,
    })
}

fn row_to_contact(row: &Row<'_>) -> rusqlite::Result<EmergencyContact> {
    Ok(EmergencyContact {
        document: hash_at(row, 0)?,
        contact: identity_at(row, 1)?,
        added_at: row.get(2)?,
    })
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
    let seq: i64 = row.get(0)?;
    let body: Vec<u8> = row.get(2)?;
    let event =
        RegistryEvent::from_bytes(&body).map_err(|e| conversion_error(2, Type::Blob, e))?;

    Ok(EventRecord {
        seq: seq as u64,
        timestamp: row.get(1)?,
        event,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Query helpers (run with the connection already locked)
// ─────────────────────────────────────────────────────────────────────────────

fn query_document(conn: &Connection, hash: &ContentHash) -> Result<Option<Document>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM documents WHERE hash = ?1", DOCUMENT_COLUMNS),
            params![hash.as_str()],
            row_to_document,
        )
        .optional()?)
}

fn query_grant(
    conn: &Connection,
    hash: &ContentHash,
    grantee: &Identity,
) -> Result<Option<AccessGrant>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {} FROM grants WHERE document_hash = ?1 AND grantee = ?2",
                GRANT_COLUMNS
            ),
            params![hash.as_str(), grantee.as_str()],
            row_to_grant,
        )
        .optional()?)
}

fn query_emergency(conn: &Connection, hash: &ContentHash) -> Result<Option<EmergencyOverride>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {} FROM emergency_overrides WHERE document_hash = ?1",
                EMERGENCY_COLUMNS
            ),
            params![hash.as_str()],
            row_to_emergency,
        )
        .optional()?)
}

fn query_is_contact(conn: &Connection, hash: &ContentHash, identity: &Identity) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM emergency_contacts WHERE document_hash = ?1 AND contact = ?2",
            params![hash.as_str(), identity.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn to_seq(seq: i64) -> Result<u64> {
    u64::try_from(seq).map_err(|_| StoreError::InvalidData(format!("negative event seq {}", seq)))
}

/// Apply a mutation inside an open transaction.
fn apply_mutation(conn: &Connection, mutation: &Mutation) -> Result<()> {
    match mutation {
        Mutation::PutDocument(doc) => {
            // Owner and created_at are write-once.
            conn.execute(
                "INSERT INTO documents (hash, owner, metadata, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(hash) DO UPDATE SET
                    metadata = excluded.metadata,
                    updated_at = excluded.updated_at",
                params![
                    doc.hash.as_str(),
                    doc.owner.as_str(),
                    doc.metadata,
                    doc.created_at,
                    doc.updated_at,
                ],
            )?;
        }
        Mutation::PutGrant(grant) => {
            conn.execute(
                "INSERT INTO grants (document_hash, grantee, expires_at, granted_by, granted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(document_hash, grantee) DO UPDATE SET
                    expires_at = excluded.expires_at,
                    granted_by = excluded.granted_by,
                    granted_at = excluded.granted_at",
                params![
                    grant.document.as_str(),
                    grant.grantee.as_str(),
                    grant.expires_at,
                    grant.granted_by.as_str(),
                    grant.granted_at,
                ],
            )?;
        }
        Mutation::RemoveGrant { document, grantee } => {
            conn.execute(
                "DELETE FROM grants WHERE document_hash = ?1 AND grantee = ?2",
                params![document.as_str(), grantee.as_str()],
            )?;
        }
        Mutation::AddEmergencyContact(contact) => {
            conn.execute(
                "INSERT OR IGNORE INTO emergency_contacts (document_hash, contact, added_at)
                 VALUES (?1, ?2, ?3)",
                params![
                    contact.document.as_str(),
                    contact.contact.as_str(),
                    contact.added_at,
                ],
            )?;
        }
        Mutation::PutEmergencyOverride(emergency) => {
            conn.execute(
                "INSERT INTO emergency_overrides
                    (document_hash, key_hash, activated_by, activated_at, active)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(document_hash) DO UPDATE SET
                    key_hash = excluded.key_hash,
                    activated_by = excluded.activated_by,
                    activated_at = excluded.activated_at,
                    active = excluded.active",
                params![
                    emergency.document.as_str(),
                    emergency.key_hash.as_bytes().as_slice(),
                    emergency.activated_by.as_str(),
                    emergency.activated_at,
                    emergency.active as i64,
                ],
            )?;
        }
    }

    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_document(&self, hash: &ContentHash) -> Result<Option<Document>> {
        let hash = hash.clone();
        self.with_conn(move |conn| query_document(conn, &hash)).await
    }

    async fn list_documents(&self, owner: Option<&Identity>) -> Result<Vec<ContentHash>> {
        let owner = owner.cloned();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT hash FROM documents WHERE ?1 IS NULL OR owner = ?1 ORDER BY hash",
            )?;

            let hashes = stmt
                .query_map(params![owner.as_ref().map(|o| o.as_str())], |row| {
                    hash_at(row, 0)
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(hashes)
        })
        .await
    }

    async fn get_grant(
        &self,
        hash: &ContentHash,
        grantee: &Identity,
    ) -> Result<Option<AccessGrant>> {
        let hash = hash.clone();
        let grantee = grantee.clone();
        self.with_conn(move |conn| query_grant(conn, &hash, &grantee))
            .await
    }

    async fn grants_for(&self, hash: &ContentHash) -> Result<Vec<AccessGrant>> {
        let hash = hash.clone();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM grants WHERE document_hash = ?1 ORDER BY grantee",
                GRANT_COLUMNS
            ))?;

            let grants = stmt
                .query_map(params![hash.as_str()], row_to_grant)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(grants)
        })
        .await
    }

    async fn get_emergency(&self, hash: &ContentHash) -> Result<Option<EmergencyOverride>> {
        let hash = hash.clone();
        self.with_conn(move |conn| query_emergency(conn, &hash))
            .await
    }

    async fn emergency_contacts(&self, hash: &ContentHash) -> Result<Vec<EmergencyContact>> {
        let hash = hash.clone();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT document_hash, contact, added_at FROM emergency_contacts
                 WHERE document_hash = ?1 ORDER BY contact",
            )?;

            let contacts = stmt
                .query_map(params![hash.as_str()], row_to_contact)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(contacts)
        })
        .await
    }

    async fn access_view(
        &self,
        hash: &ContentHash,
        identity: &Identity,
    ) -> Result<Option<AccessView>> {
        let hash = hash.clone();
        let identity = identity.clone();

        self.with_conn(move |conn| {
            let Some(document) = query_document(conn, &hash)? else {
                return Ok(None);
            };
            let grant = query_grant(conn, &hash, &identity)?;
            Ok(Some(AccessView { document, grant }))
        })
        .await
    }

    async fn emergency_view(
        &self,
        hash: &ContentHash,
        identity: Option<&Identity>,
    ) -> Result<Option<EmergencyView>> {
        let hash = hash.clone();
        let identity = identity.cloned();

        self.with_conn(move |conn| {
            let Some(document) = query_document(conn, &hash)? else {
                return Ok(None);
            };
            let emergency = query_emergency(conn, &hash)?;
            let is_contact = match &identity {
                Some(id) => query_is_contact(conn, &hash, id)?,
                None => false,
            };
            Ok(Some(EmergencyView {
                document,
                emergency,
                is_contact,
            }))
        })
        .await
    }

    async fn commit(&self, transition: &Transition) -> Result<EventRecord> {
        let transition = transition.clone();

        self.with_conn(move |conn| {
            let body = transition.event.to_bytes()?;
            let tx = conn.transaction()?;

            apply_mutation(&tx, &transition.mutation)?;

            let seq: i64 = tx.query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM events",
                [],
                |row| row.get(0),
            )?;

            tx.execute(
                "INSERT INTO events (seq, timestamp, kind, document_hash, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    seq,
                    transition.at,
                    transition.event.name(),
                    transition.event.document().as_str(),
                    body,
                ],
            )?;

            tx.commit()?;
            tracing::trace!(seq, kind = transition.event.name(), "committed transition");

            Ok(EventRecord {
                seq: to_seq(seq)?,
                timestamp: transition.at,
                event: transition.event,
            })
        })
        .await
    }

    async fn events_since(&self, after_seq: u64, limit: usize) -> Result<Vec<EventRecord>> {
        let after = i64::try_from(after_seq).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT seq, timestamp, body FROM events
                 WHERE seq > ?1 ORDER BY seq LIMIT ?2",
            )?;

            let events = stmt
                .query_map(params![after, limit], row_to_event)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(events)
        })
        .await
    }

    async fn head_seq(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let seq: i64 =
                conn.query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| {
                    row.get(0)
                })?;
            to_seq(seq)
        })
        .await
    }
}
