//! Store error types.

use thiserror::Error;

/// Errors that can occur when using the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Document does not exist.
    #[error("Document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    /// A document with the same key already exists.
    #[error("Duplicate key: {collection}/{key}")]
    DuplicateKey { collection: String, key: String },

    /// Compare-and-swap lost against another writer.
    #[error("Version mismatch on {collection}/{key}: expected {expected}, found {found}")]
    VersionMismatch {
        collection: String,
        key: String,
        expected: u64,
        found: u64,
    },

    /// Retries exhausted while resolving version conflicts.
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Failed to serialize or deserialize a document body.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write a snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check if this error is a lost compare-and-swap or insert race.
    ///
    /// Such errors are resolved by re-reading and re-applying the change.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::VersionMismatch { .. } | StoreError::DuplicateKey { .. }
        )
    }
}
