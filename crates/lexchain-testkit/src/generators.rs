//! Proptest generators for property-based testing.

use proptest::prelude::*;

use lexchain_core::{ContentHash, EmergencySecret, Identity, KeyHash, Timestamp};

/// Generate a valid ContentHash.
pub fn content_hash() -> impl Strategy<Value = ContentHash> {
    "[a-zA-Z0-9]{1,64}".prop_filter_map("valid content hash", |s| ContentHash::new(s).ok())
}

/// Generate a valid Identity, shaped like an account address.
pub fn identity() -> impl Strategy<Value = Identity> {
    "0x[0-9a-f]{40}".prop_filter_map("valid identity", |s| Identity::new(s).ok())
}

/// Generate a positive grant duration, up to ten years.
pub fn duration() -> impl Strategy<Value = i64> {
    1i64..=10 * 365 * 24 * 60 * 60
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    0i64..=4_102_444_800
}

/// Generate printable metadata of at most 64 bytes.
pub fn metadata() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._-]{0,64}".prop_map(String::from)
}

/// Generate an emergency secret.
pub fn secret() -> impl Strategy<Value = EmergencySecret> {
    prop::collection::vec(any::<u8>(), 1..=64).prop_map(EmergencySecret::new)
}

/// Generate an arbitrary key hash.
pub fn key_hash() -> impl Strategy<Value = KeyHash> {
    any::<[u8; 32]>().prop_map(KeyHash::from_bytes)
}

/// Parameters for a grant scenario: a document, a grantee, a duration, and
/// how long after the grant the access check happens.
#[derive(Debug, Clone)]
pub struct GrantParams {
    pub hash: ContentHash,
    pub grantee: Identity,
    pub duration: i64,
    pub elapsed: i64,
}

impl Arbitrary for GrantParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (content_hash(), identity(), 1i64..=100_000i64)
            .prop_flat_map(|(hash, grantee, duration)| {
                (Just(hash), Just(grantee), Just(duration), 0i64..=duration * 2)
            })
            .prop_map(|(hash, grantee, duration, elapsed)| GrantParams {
                hash,
                grantee,
                duration,
                elapsed,
            })
            .boxed()
    }
}

impl GrantParams {
    /// Whether the grant should still be in force after `elapsed` seconds.
    pub fn expect_active(&self) -> bool {
        self.elapsed < self.duration
    }
}
