//! Registry state survives reopening a SQLite database.

use std::sync::Arc;

use lexchain::core::ManualClock;
use lexchain::store::SqliteStore;
use lexchain::{EmergencySecret, Registry, RegistryConfig};
use lexchain_testkit::{content_hash, identity, init_tracing};

#[tokio::test]
async fn reopen_keeps_documents_grants_and_log() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("registry.db");
    let clock = Arc::new(ManualClock::new(1_000));

    let alice = identity("0xa11ce");
    let bob = identity("0xb0b");
    let doc = content_hash("bafy-lease");
    let secret = EmergencySecret::from("recovery phrase");

    {
        let registry =
            Registry::new(SqliteStore::open(&path)?, clock.clone(), RegistryConfig::default())?;
        registry.upload_document(&alice, &doc, "lease.pdf").await?;
        registry.grant_access(&alice, &doc, &bob, 500).await?;
        registry
            .activate_emergency(&alice, &doc, secret.commitment())
            .await?;
    }

    let registry = Registry::new(SqliteStore::open(&path)?, clock.clone(), RegistryConfig::default())?;

    assert_eq!(registry.get_document(&doc).await?.owner, alice);
    assert!(registry.has_access(&doc, &bob).await?);
    assert!(registry.has_emergency_access(&doc, &secret).await?);
    assert_eq!(registry.head_seq().await?, 3);

    // Sequence numbering continues after reopen.
    registry.revoke_access(&alice, &doc, &bob).await?;
    let tail = registry.events_since(3, 10).await?;
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].seq, 4);

    clock.advance(10_000);
    assert!(!registry.has_access(&doc, &bob).await?);

    Ok(())
}
