//! Error types for the registry.

use lexchain_core::{ContentHash, CoreError};
use lexchain_perms::PermsError;
use lexchain_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The operation was rejected by the permission rules.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Malformed identifier or key hash.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RegistryError {
    pub(crate) fn not_found(hash: &ContentHash) -> Self {
        RegistryError::Permission(PermsError::NotFound(hash.clone()))
    }

    /// The permission rejection behind this error, if it is one.
    pub fn as_permission(&self) -> Option<&PermsError> {
        match self {
            RegistryError::Permission(e) => Some(e),
            _ => None,
        }
    }

    /// True for rejected input: bad identifiers, oversized metadata, bad durations.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            RegistryError::Core(_)
                | RegistryError::Permission(PermsError::InvalidInput(_))
                | RegistryError::Permission(PermsError::InvalidDuration(_))
        )
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
