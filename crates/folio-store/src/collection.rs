//! Typed access to a named collection with automatic serialization.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::{Document, DocumentStore, StoreError, Versioned};

/// Maximum retry attempts for optimistic concurrency control.
pub const MAX_UPDATE_RETRIES: u32 = 3;

/// A typed view of one collection.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. The value is a zero-sized handle, so
/// collections are usually declared as constants next to the type they store.
#[derive(Debug)]
pub struct Collection<T> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Collection<T> {}

impl<T> Collection<T> {
    /// Create a handle for the collection called `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    /// Collection name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Get a value. Returns `None` if the key doesn't exist.
    pub async fn get(
        &self,
        store: &dyn DocumentStore,
        key: &str,
    ) -> Result<Option<Versioned<T>>, StoreError> {
        match store.get(self.name, key).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Insert a value under a fresh key.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if the key is taken.
    pub async fn insert(
        &self,
        store: &dyn DocumentStore,
        key: &str,
        owner: &str,
        value: &T,
    ) -> Result<u64, StoreError> {
        let body = serde_json::to_value(value)?;
        let doc = store.insert(self.name, key, owner, body).await?;
        Ok(doc.version)
    }

    /// Replace a value read at `expected_version`.
    pub async fn replace(
        &self,
        store: &dyn DocumentStore,
        key: &str,
        expected_version: u64,
        value: &T,
    ) -> Result<u64, StoreError> {
        let body = serde_json::to_value(value)?;
        let doc = store.replace(self.name, key, expected_version, body).await?;
        Ok(doc.version)
    }

    /// Delete a value.
    pub async fn delete(&self, store: &dyn DocumentStore, key: &str) -> Result<bool, StoreError> {
        store.delete(self.name, key).await
    }

    /// All values owned by `owner`.
    pub async fn list_by_owner(
        &self,
        store: &dyn DocumentStore,
        owner: &str,
    ) -> Result<Vec<Versioned<T>>, StoreError> {
        store
            .list_by_owner(self.name, owner)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// All values whose key starts with `prefix`.
    pub async fn list_by_prefix(
        &self,
        store: &dyn DocumentStore,
        prefix: &str,
    ) -> Result<Vec<Versioned<T>>, StoreError> {
        store
            .list_by_prefix(self.name, prefix)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Update a value with a closure, using optimistic concurrency control.
    ///
    /// If the key is absent the closure receives `init()` and the result is
    /// inserted. The closure may reject the change by returning an error, in
    /// which case nothing is written. Lost compare-and-swap races are retried
    /// up to [`MAX_UPDATE_RETRIES`] times against a fresh read.
    ///
    /// # Returns
    /// - `Ok((value, out))` - The value as written and the closure's output
    /// - `Err(StoreError::ConcurrentModification)` - If all retries failed
    pub async fn update<F, R, E>(
        &self,
        store: &dyn DocumentStore,
        key: &str,
        owner: &str,
        init: impl Fn() -> T + Send,
        mut apply: F,
    ) -> Result<(T, R), E>
    where
        F: FnMut(&mut T) -> Result<R, E> + Send,
        R: Send,
        E: From<StoreError>,
    {
        for attempt in 0..MAX_UPDATE_RETRIES {
            let current = self.get(store, key).await?;

            let (mut value, expected_version) = match current {
                Some(versioned) => (versioned.value, Some(versioned.version)),
                None => (init(), None),
            };

            let out = apply(&mut value)?;
            let body = serde_json::to_value(&value).map_err(StoreError::from)?;

            let written = match expected_version {
                Some(version) => store.replace(self.name, key, version, body).await,
                None => store.insert(self.name, key, owner, body).await,
            };

            match written {
                Ok(_) => return Ok((value, out)),
                Err(e) if e.is_conflict() => {
                    tracing::debug!(collection = self.name, key, attempt, "write conflict, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::ConcurrentModification(format!(
            "{}/{}: max retries exceeded",
            self.name, key
        ))
        .into())
    }
}

fn decode<T: DeserializeOwned>(doc: Document) -> Result<Versioned<T>, StoreError> {
    Ok(Versioned {
        key: doc.key,
        version: doc.version,
        value: serde_json::from_value(doc.body)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    const COUNTERS: Collection<Counter> = Collection::new("counters");

    #[tokio::test]
    async fn test_update_inserts_when_missing() {
        let store = MemoryStore::new();
        let (value, ()) = COUNTERS
            .update(&store, "c1", "alice", Counter::default, |c| {
                c.hits += 1;
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();

        assert_eq!(value.hits, 1);
        let stored = COUNTERS.get(&store, "c1").await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.value, Counter { hits: 1 });
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            COUNTERS
                .update(&store, "c1", "alice", Counter::default, |c| {
                    c.hits += 1;
                    Ok::<_, StoreError>(())
                })
                .await
                .unwrap();
        }

        let stored = COUNTERS.get(&store, "c1").await.unwrap().unwrap();
        assert_eq!(stored.version, 3);
        assert_eq!(stored.value.hits, 3);
    }

    #[tokio::test]
    async fn test_rejected_update_writes_nothing() {
        let store = MemoryStore::new();
        let result: Result<(Counter, ()), StoreError> = COUNTERS
            .update(&store, "c1", "alice", Counter::default, |_| {
                Err(StoreError::ConcurrentModification("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(COUNTERS.get(&store, "c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_replace_is_rejected() {
        let store = MemoryStore::new();
        COUNTERS
            .insert(&store, "c1", "alice", &Counter { hits: 1 })
            .await
            .unwrap();
        COUNTERS
            .replace(&store, "c1", 1, &Counter { hits: 2 })
            .await
            .unwrap();

        let err = COUNTERS
            .replace(&store, "c1", 1, &Counter { hits: 9 })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
