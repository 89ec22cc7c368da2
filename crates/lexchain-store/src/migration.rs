//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use lexchain_core::{Clock, SystemClock};

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, SystemClock.now()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Documents keyed by content hash
        CREATE TABLE documents (
            hash TEXT PRIMARY KEY,            -- opaque content identifier
            owner TEXT NOT NULL,              -- immutable after insert
            metadata TEXT NOT NULL,
            created_at INTEGER NOT NULL,      -- Unix seconds
            updated_at INTEGER NOT NULL
        );

        -- Time-bound grants, one per (document, grantee)
        CREATE TABLE grants (
            document_hash TEXT NOT NULL REFERENCES documents(hash),
            grantee TEXT NOT NULL,
            expires_at INTEGER NOT NULL,      -- valid while now < expires_at
            granted_by TEXT NOT NULL,
            granted_at INTEGER NOT NULL,
            PRIMARY KEY (document_hash, grantee)
        );

        -- Emergency overrides, at most one per document
        CREATE TABLE emergency_overrides (
            document_hash TEXT PRIMARY KEY REFERENCES documents(hash),
            key_hash BLOB NOT NULL,           -- 32 bytes, BLAKE3 commitment
            activated_by TEXT NOT NULL,
            activated_at INTEGER NOT NULL,
            active INTEGER NOT NULL DEFAULT 0
        );

        -- Identities allowed to trigger the override
        CREATE TABLE emergency_contacts (
            document_hash TEXT NOT NULL REFERENCES documents(hash),
            contact TEXT NOT NULL,
            added_at INTEGER NOT NULL,
            PRIMARY KEY (document_hash, contact)
        );

        -- Append-only audit log
        CREATE TABLE events (
            seq INTEGER PRIMARY KEY,          -- 1, 2, 3, ... in commit order
            timestamp INTEGER NOT NULL,
            kind TEXT NOT NULL,
            document_hash TEXT NOT NULL,
            body BLOB NOT NULL                -- CBOR-encoded RegistryEvent
        );

        CREATE INDEX idx_documents_owner ON documents(owner);
        CREATE INDEX idx_events_document ON events(document_hash);
        "#,
    )?;

    Ok(())
}
