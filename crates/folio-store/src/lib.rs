//! Versioned document store for Folio.
//!
//! Every record the storefront keeps (carts, wishlists, address books, orders,
//! reviews) is a JSON document living in a named collection. Documents are
//! owned by a single principal and carry a version number so that writers can
//! use compare-and-swap instead of read-modify-write races.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_store::{Collection, MemoryStore, store_key};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, Clone, Default)]
//! struct Cart {
//!     lines: Vec<(String, u32)>,
//! }
//!
//! const CARTS: Collection<Cart> = Collection::new("carts");
//!
//! let store = MemoryStore::new();
//!
//! // Read-modify-write with automatic retry on version conflicts
//! let cart = CARTS
//!     .update(&store, "user-1", "user-1", Cart::default, |cart| {
//!         cart.lines.push(("book-1".into(), 1));
//!         Ok::<_, folio_store::StoreError>(())
//!     })
//!     .await?;
//!
//! // Namespaced keys
//! let key = store_key!("user-1", "book-1");
//! assert_eq!(key, "user-1:book-1");
//! ```

mod collection;
mod document;
mod error;
mod locks;
mod memory;
mod store;

pub use collection::{Collection, MAX_UPDATE_RETRIES};
pub use document::{Document, Versioned};
pub use error::StoreError;
pub use locks::OwnerLocks;
pub use memory::{MemoryStore, StoreSnapshot};
pub use store::DocumentStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Collection, Document, DocumentStore, MemoryStore, OwnerLocks, StoreError, Versioned,
    };
}

/// Helper to build document keys with namespacing.
///
/// # Example
///
/// ```rust
/// use folio_store::store_key;
///
/// let key = store_key!("book-42", "user-7");
/// assert_eq!(key, "book-42:user-7");
/// ```
#[macro_export]
macro_rules! store_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = $prefix.to_string();
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
