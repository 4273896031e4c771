//! Per-owner write serialization.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle entries are pruned once the table grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// A table of async mutexes keyed by owner.
///
/// Two writers for the same owner queue up behind each other; writers for
/// different owners never contend beyond the brief table lookup.
#[derive(Debug, Default)]
pub struct OwnerLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `owner`'s records.
    ///
    /// The returned guard releases the lock when dropped.
    pub async fn acquire(&self, owner: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().await;
            if table.len() > PRUNE_THRESHOLD {
                table.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            table
                .entry(owner.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of owners currently tracked.
    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }

    /// Check if no owner is tracked.
    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.is_empty()
    }
}
