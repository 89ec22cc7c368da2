//! Emergency key commitments.
//!
//! An emergency override stores only a [`KeyHash`], a BLAKE3 commitment to a
//! recovery secret held out of band. Presenting the secret later proves
//! knowledge of it without the registry ever storing the secret itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CoreError;

/// Domain separation prefix for emergency key commitments.
pub const KEY_COMMIT_DOMAIN: &[u8] = b"lexchain/emergency-key/v1";

/// A 32-byte commitment to an emergency secret.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyHash(pub [u8; 32]);

impl KeyHash {
    /// Compute the commitment for a secret.
    pub fn commit(secret: &[u8]) -> Self {
        Self(*commitment(secret).as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| CoreError::InvalidKeyHash(e.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            CoreError::InvalidKeyHash(format!("expected 32 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }

    /// Check whether `secret` opens this commitment.
    ///
    /// The digest comparison is constant-time.
    pub fn matches(&self, secret: &[u8]) -> bool {
        blake3::Hash::from(self.0) == commitment(secret)
    }
}

fn commitment(secret: &[u8]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(KEY_COMMIT_DOMAIN);
    hasher.update(secret);
    hasher.finalize()
}

impl fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for KeyHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::str::FromStr for KeyHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// A presented emergency secret. Zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EmergencySecret {
    inner: Vec<u8>,
}

impl EmergencySecret {
    /// Wrap secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: bytes.into(),
        }
    }

    /// Get the secret bytes. Do not hold on to the returned slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// The commitment this secret opens.
    pub fn commitment(&self) -> KeyHash {
        KeyHash::commit(&self.inner)
    }
}

impl fmt::Debug for EmergencySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmergencySecret(***)")
    }
}

impl From<&str> for EmergencySecret {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<Vec<u8>> for EmergencySecret {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_commit_and_match() {
        let key = KeyHash::commit(b"correct horse battery staple");
        assert!(key.matches(b"correct horse battery staple"));
        assert!(!key.matches(b"correct horse battery stapler"));
    }

    #[test]
    fn test_commitment_is_domain_separated() {
        let plain = blake3::hash(b"secret");
        assert_ne!(KeyHash::commit(b"secret").0, *plain.as_bytes());
    }

    #[test]
    fn test_hex_roundtrip_with_prefix() {
        let key = KeyHash::commit(b"s");
        let hex = key.to_hex();
        assert_eq!(KeyHash::from_hex(&hex).unwrap(), key);
        assert_eq!(KeyHash::from_hex(&format!("0x{}", hex)).unwrap(), key);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(matches!(
            KeyHash::from_hex("abcd"),
            Err(CoreError::InvalidKeyHash(_))
        ));
        assert!(KeyHash::from_hex("zz").is_err());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = EmergencySecret::from("hunter2");
        assert_eq!(format!("{:?}", secret), "EmergencySecret(***)");
        assert!(secret.commitment().matches(b"hunter2"));
    }

    proptest! {
        #[test]
        fn prop_only_the_committed_secret_matches(
            a in prop::collection::vec(any::<u8>(), 0..64),
            b in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let key = KeyHash::commit(&a);
            prop_assert!(key.matches(&a));
            prop_assert_eq!(key.matches(&b), a == b);
        }

        #[test]
        fn prop_hex_parse_inverts_display(bytes in any::<[u8; 32]>()) {
            let key = KeyHash::from_bytes(bytes);
            prop_assert_eq!(key.to_string().parse::<KeyHash>().unwrap(), key);
        }
    }
}
