//! Strong type definitions for LexChain identifiers.
//!
//! Content hashes and identities are opaque strings produced by external
//! collaborators (the storage network and the signing substrate). The registry
//! never interprets them beyond equality, but wraps them in newtypes so a hash
//! can never be passed where an identity is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Maximum length of a content hash, in bytes.
pub const MAX_CONTENT_HASH_LEN: usize = 256;

/// Maximum length of an identity, in bytes.
pub const MAX_IDENTITY_LEN: usize = 256;

/// Check an opaque token: non-empty, bounded, no surrounding whitespace.
fn check_token(value: &str, max_len: usize) -> Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".into());
    }
    if value.len() > max_len {
        return Err(format!("length {} exceeds maximum of {}", value.len(), max_len));
    }
    if value.trim() != value {
        return Err("must not have leading or trailing whitespace".into());
    }
    Ok(())
}

/// A content identifier for a document (e.g. an IPFS CID).
///
/// Produced by the external content-addressed storage layer and treated here
/// as an opaque unique string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Create a content hash, rejecting empty or oversized values.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        check_token(&value, MAX_CONTENT_HASH_LEN).map_err(CoreError::InvalidContentHash)?;
        Ok(Self(value))
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ContentHash {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An externally authenticated caller reference (e.g. a wallet address).
///
/// Authentication happens in the substrate; the registry only compares
/// identities for equality.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Create an identity, rejecting empty or oversized values.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        check_token(&value, MAX_IDENTITY_LEN).map_err(CoreError::InvalidIdentity)?;
        Ok(Self(value))
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identity {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identity {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_accepts_cid() {
        let cid = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";
        let hash = ContentHash::new(cid).unwrap();
        assert_eq!(hash.as_str(), cid);
        assert_eq!(hash.to_string(), cid);
    }

    #[test]
    fn test_content_hash_rejects_empty_and_padded() {
        assert!(matches!(
            ContentHash::new(""),
            Err(CoreError::InvalidContentHash(_))
        ));
        assert!(matches!(
            ContentHash::new(" abc"),
            Err(CoreError::InvalidContentHash(_))
        ));
    }

    #[test]
    fn test_content_hash_length_limit() {
        assert!(ContentHash::new("a".repeat(MAX_CONTENT_HASH_LEN)).is_ok());
        assert!(ContentHash::new("a".repeat(MAX_CONTENT_HASH_LEN + 1)).is_err());
    }

    #[test]
    fn test_identity_rejects_empty() {
        assert!(matches!(Identity::new(""), Err(CoreError::InvalidIdentity(_))));
    }

    #[test]
    fn test_serde_rejects_invalid_values() {
        let ok: Identity = serde_json::from_str("\"0xabc\"").unwrap();
        assert_eq!(ok.as_str(), "0xabc");

        let bad: Result<Identity, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
