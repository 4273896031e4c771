//! In-memory document store.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{Document, DocumentStore, StoreError};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Document store held entirely in process memory.
///
/// Every call takes the store lock once, so `insert` and `replace` are atomic
/// with respect to each other. Contents can be exported as a
/// [`StoreSnapshot`] and reloaded later.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

/// Serializable copy of a [`MemoryStore`]'s contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Documents by collection, then by key.
    pub collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let collections = snapshot
            .collections
            .into_iter()
            .map(|(name, docs)| {
                let docs = docs.into_iter().map(|d| (d.key.clone(), d)).collect();
                (name, docs)
            })
            .collect();
        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Copy the current contents.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let collections = self.collections.read().await;
        StoreSnapshot {
            collections: collections
                .iter()
                .map(|(name, docs)| (name.clone(), docs.values().cloned().collect()))
                .collect(),
        }
    }

    /// Load a store from a JSON snapshot file.
    ///
    /// A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded store snapshot");
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the current contents to a JSON snapshot file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.snapshot().await)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn insert(
        &self,
        collection: &str,
        key: &str,
        owner: &str,
        body: serde_json::Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.contains_key(key) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }

        let now = Utc::now();
        let doc = Document {
            key: key.to_string(),
            owner: owner.to_string(),
            version: 1,
            body,
            created_at: now,
            updated_at: now,
        };
        docs.insert(key.to_string(), doc.clone());
        Ok(doc)
    }

    async fn replace(
        &self,
        collection: &str,
        key: &str,
        expected_version: u64,
        body: serde_json::Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(key))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })?;

        if doc.version != expected_version {
            return Err(StoreError::VersionMismatch {
                collection: collection.to_string(),
                key: key.to_string(),
                expected: expected_version,
                found: doc.version,
            });
        }

        doc.version += 1;
        doc.body = body;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .map(|docs| docs.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn list_by_owner(
        &self,
        collection: &str,
        owner: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().filter(|d| d.owner == owner).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_by_prefix(
        &self,
        collection: &str,
        prefix: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.range(prefix.to_string()..)
                    .take_while(|(k, _)| k.starts_with(prefix))
                    .map(|(_, d)| d.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        store
            .insert("carts", "u1", "u1", json!({"lines": []}))
            .await
            .unwrap();

        let doc = store.get("carts", "u1").await.unwrap().unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.owner, "u1");
        assert!(store.get("carts", "u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let store = MemoryStore::new();
        store.insert("carts", "u1", "u1", json!({})).await.unwrap();
        let err = store.insert("carts", "u1", "u1", json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_replace_checks_version() {
        let store = MemoryStore::new();
        store.insert("carts", "u1", "u1", json!({"n": 1})).await.unwrap();

        let doc = store.replace("carts", "u1", 1, json!({"n": 2})).await.unwrap();
        assert_eq!(doc.version, 2);

        let err = store
            .replace("carts", "u1", 1, json!({"n": 3}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.replace("carts", "nope", 1, json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_by_owner_and_prefix() {
        let store = MemoryStore::new();
        store.insert("reviews", "b1:u1", "u1", json!({})).await.unwrap();
        store.insert("reviews", "b1:u2", "u2", json!({})).await.unwrap();
        store.insert("reviews", "b2:u1", "u1", json!({})).await.unwrap();

        let by_owner = store.list_by_owner("reviews", "u1").await.unwrap();
        assert_eq!(by_owner.len(), 2);

        let by_book = store.list_by_prefix("reviews", "b1:").await.unwrap();
        let keys: Vec<_> = by_book.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["b1:u1", "b1:u2"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.insert("carts", "u1", "u1", json!({})).await.unwrap();
        assert!(store.delete("carts", "u1").await.unwrap());
        assert!(!store.delete("carts", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip() {
        let store = MemoryStore::new();
        store.insert("carts", "u1", "u1", json!({"n": 1})).await.unwrap();
        store.replace("carts", "u1", 1, json!({"n": 2})).await.unwrap();

        let restored = MemoryStore::from_snapshot(store.snapshot().await);
        let doc = restored.get("carts", "u1").await.unwrap().unwrap();
        assert_eq!(doc.version, 2);
        assert_eq!(doc.body, json!({"n": 2}));
    }
}
