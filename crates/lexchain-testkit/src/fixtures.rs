//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use lexchain::{Registry, RegistryConfig};
use lexchain_core::{Clock, ContentHash, Identity, ManualClock, Timestamp};
use lexchain_perms::EmergencyPolicy;
use lexchain_store::{MemoryStore, Store};

/// Fixed start time for fixtures: 2024-01-01T00:00:00Z.
pub const FIXTURE_EPOCH: Timestamp = 1_704_067_200;

/// A registry on a manual clock with a cast of named identities.
///
/// `alice` is the usual owner, `bob` the usual grantee, `carol` the usual
/// emergency contact, and `mallory` never owns or is granted anything.
pub struct TestFixture<S: Store = MemoryStore> {
    pub registry: Registry<S>,
    pub clock: Arc<ManualClock>,
    pub alice: Identity,
    pub bob: Identity,
    pub carol: Identity,
    pub mallory: Identity,
}

impl TestFixture<MemoryStore> {
    /// Create a fixture over a fresh memory store with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a fixture over a fresh memory store.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }

    /// Create a fixture whose registry uses `policy` for emergency activation.
    pub fn with_policy(policy: EmergencyPolicy) -> Self {
        Self::with_config(RegistryConfig {
            emergency_policy: policy,
            ..RegistryConfig::default()
        })
    }
}

impl<S: Store> TestFixture<S> {
    /// Create a fixture over `store`, starting the clock at [`FIXTURE_EPOCH`].
    pub fn with_store(store: S, config: RegistryConfig) -> Self {
        let clock = Arc::new(ManualClock::new(FIXTURE_EPOCH));
        let registry =
            Registry::new(store, clock.clone(), config).expect("fixture config is valid");

        Self {
            registry,
            clock,
            alice: identity("0xa11ce"),
            bob: identity("0xb0b"),
            carol: identity("0xca401"),
            mallory: identity("0xbad"),
        }
    }

    /// Current fixture time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Move the clock forward by `secs`.
    pub fn advance(&self, secs: i64) -> Timestamp {
        self.clock.advance(secs)
    }

    /// Upload `name` as a document owned by alice and return its hash.
    pub async fn alice_uploads(&self, name: &str) -> ContentHash {
        let hash = content_hash(name);
        self.registry
            .upload_document(&self.alice, &hash, &format!("{}.pdf", name))
            .await
            .expect("alice can upload");
        hash
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an identity from a known-valid string.
pub fn identity(s: &str) -> Identity {
    Identity::new(s).expect("valid identity")
}

/// Build a content hash from a known-valid string.
pub fn content_hash(s: &str) -> ContentHash {
    ContentHash::new(s).expect("valid content hash")
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_upload() {
        let fixture = TestFixture::new();
        let hash = fixture.alice_uploads("lease").await;

        let doc = fixture.registry.get_document(&hash).await.unwrap();
        assert_eq!(doc.owner, fixture.alice);
        assert_eq!(doc.metadata, "lease.pdf");
        assert_eq!(doc.created_at, FIXTURE_EPOCH);
    }

    #[tokio::test]
    async fn test_fixture_clock() {
        let fixture = TestFixture::new();
        assert_eq!(fixture.advance(60), FIXTURE_EPOCH + 60);
        assert_eq!(fixture.registry.now(), FIXTURE_EPOCH + 60);
    }

    #[test]
    fn test_fixture_policy() {
        let fixture = TestFixture::with_policy(EmergencyPolicy::OwnerOnly);
        assert_eq!(
            fixture.registry.config().emergency_policy,
            EmergencyPolicy::OwnerOnly
        );
    }

    #[test]
    fn test_cast_is_distinct() {
        let fixture = TestFixture::new();
        let cast = [&fixture.alice, &fixture.bob, &fixture.carol, &fixture.mallory];
        for (i, a) in cast.iter().enumerate() {
            for b in &cast[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
