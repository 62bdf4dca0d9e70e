//! Protocol error types.

use thiserror::Error;

/// Protocol-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Request body could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Paging parameters outside the bounds the caller accepts.
    #[error("invalid page request: {0}")]
    InvalidPage(String),
}
