//! The document store seam.

use async_trait::async_trait;

use crate::{Document, StoreError};

/// Generic CRUD over JSON documents grouped in collections.
///
/// Implementations must make each call atomic on its own: `replace` is a
/// compare-and-swap against `expected_version`, and `insert` fails with
/// [`StoreError::DuplicateKey`] if the key is taken. Those two guarantees are
/// all the higher layers need for one-record-per-owner and single-default
/// invariants.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by key.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a new document at version 1.
    async fn insert(
        &self,
        collection: &str,
        key: &str,
        owner: &str,
        body: serde_json::Value,
    ) -> Result<Document, StoreError>;

    /// Replace a document if its current version equals `expected_version`.
    async fn replace(
        &self,
        collection: &str,
        key: &str,
        expected_version: u64,
        body: serde_json::Value,
    ) -> Result<Document, StoreError>;

    /// Delete a document. Returns whether anything was removed.
    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError>;

    /// All documents in a collection owned by `owner`, ordered by key.
    async fn list_by_owner(&self, collection: &str, owner: &str)
        -> Result<Vec<Document>, StoreError>;

    /// All documents in a collection whose key starts with `prefix`, ordered by key.
    async fn list_by_prefix(
        &self,
        collection: &str,
        prefix: &str,
    ) -> Result<Vec<Document>, StoreError>;
}
