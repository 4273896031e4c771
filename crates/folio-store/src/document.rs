//! Stored document envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw document as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Key, unique within its collection.
    pub key: String,
    /// Principal that owns the document.
    pub owner: String,
    /// Version for optimistic concurrency control. Starts at 1.
    pub version: u64,
    /// JSON body.
    pub body: serde_json::Value,
    /// When the document was first inserted.
    pub created_at: DateTime<Utc>,
    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
}

/// A decoded document body together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// Document key.
    pub key: String,
    /// Version the value was read at.
    pub version: u64,
    /// Decoded body.
    pub value: T,
}

impl<T> Versioned<T> {
    /// Discard the version and return the value.
    pub fn into_inner(self) -> T {
        self.value
    }
}
