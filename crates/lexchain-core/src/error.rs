//! Error types for LexChain Core.

use thiserror::Error;

/// Errors raised while constructing or encoding core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid content hash: {0}")]
    InvalidContentHash(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid key hash: {0}")]
    InvalidKeyHash(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
