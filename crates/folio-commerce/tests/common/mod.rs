#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use folio_commerce::checkout::PaymentGateway;
use folio_commerce::prelude::*;
use folio_store::{Document, DocumentStore, MemoryStore, StoreError};

/// Memory store whose writes to chosen collections can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn fail_writes(&self, collection: &str, fail: bool) {
        let mut failing = self.failing.lock().unwrap();
        if fail {
            failing.insert(collection.to_string());
        } else {
            failing.remove(collection);
        }
    }

    fn check(&self, collection: &str) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(collection) {
            return Err(StoreError::Io(std::io::Error::other(format!(
                "injected write failure on {collection}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, key).await
    }

    async fn insert(
        &self,
        collection: &str,
        key: &str,
        owner: &str,
        body: serde_json::Value,
    ) -> Result<Document, StoreError> {
        self.check(collection)?;
        self.inner.insert(collection, key, owner, body).await
    }

    async fn replace(
        &self,
        collection: &str,
        key: &str,
        expected_version: u64,
        body: serde_json::Value,
    ) -> Result<Document, StoreError> {
        self.check(collection)?;
        self.inner
            .replace(collection, key, expected_version, body)
            .await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        self.check(collection)?;
        self.inner.delete(collection, key).await
    }

    async fn list_by_owner(
        &self,
        collection: &str,
        owner: &str,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.list_by_owner(collection, owner).await
    }

    async fn list_by_prefix(
        &self,
        collection: &str,
        prefix: &str,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.list_by_prefix(collection, prefix).await
    }
}

pub fn catalog() -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::new([
        BookSnapshot::new("book1", "Dune", "Frank Herbert", Money::from_major(399)),
        BookSnapshot::new("book2", "Emma", "Jane Austen", Money::from_major(249)),
        BookSnapshot::new("book3", "Beloved", "Toni Morrison", Money::from_major(450)),
    ]))
}

pub fn storefront(gateway: Arc<dyn PaymentGateway>) -> Storefront {
    Storefront::new(
        Arc::new(MemoryStore::new()),
        catalog(),
        gateway,
        CommerceConfig::default(),
    )
}

pub fn flaky_storefront(store: Arc<FlakyStore>) -> Storefront {
    Storefront::new(
        store,
        catalog(),
        Arc::new(ScriptedGateway::approving()),
        CommerceConfig::default(),
    )
}

pub fn address(name: &str) -> NewAddress {
    NewAddress::new(PostalAddress::new(
        name,
        "221B MG Road",
        "Bengaluru",
        "KA",
        "560001",
        "9811111111",
    ))
}
