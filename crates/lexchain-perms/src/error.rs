//! Error types for the permission rules.

use thiserror::Error;

use lexchain_core::{ContentHash, Identity};

/// Reasons a registry operation is rejected.
///
/// Each variant is distinct so callers can tell "not your document" from
/// "document does not exist" from "bad input".
#[derive(Debug, Error)]
pub enum PermsError {
    /// The referenced document is not registered.
    #[error("document not found: {0}")]
    NotFound(ContentHash),

    /// The caller does not own the document.
    #[error("{caller} is not the owner of {document}")]
    NotOwner {
        document: ContentHash,
        caller: Identity,
    },

    /// Grant duration was zero, negative, or overflowed the clock.
    #[error("invalid grant duration: {0} seconds")]
    InvalidDuration(i64),

    /// The document's emergency override is already active.
    #[error("emergency override already active for {0}")]
    AlreadyActive(ContentHash),

    /// The caller may not trigger the emergency override.
    #[error("{caller} is not authorized to activate the emergency override for {document}")]
    NotAuthorized {
        document: ContentHash,
        caller: Identity,
    },

    /// Malformed input (oversized metadata and similar).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Core error.
    #[error("core error: {0}")]
    CoreError(#[from] lexchain_core::CoreError),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
