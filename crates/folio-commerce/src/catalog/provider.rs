//! Catalog provider seam and an in-memory implementation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::catalog::BookSnapshot;
use crate::ids::BookId;

/// Errors a catalog provider can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no such book.
    #[error("Book not found: {0}")]
    NotFound(BookId),

    /// The catalog could not be reached.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only book catalog keyed by book ID.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Look up a single book.
    async fn resolve(&self, book_id: &BookId) -> Result<BookSnapshot, CatalogError>;

    /// Free-text search.
    async fn search(&self, query: &str) -> Result<Vec<BookSnapshot>, CatalogError>;
}

/// A fixed catalog held in memory.
///
/// Can be switched offline to exercise degraded paths.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    books: RwLock<BTreeMap<BookId, BookSnapshot>>,
    offline: AtomicBool,
}

impl StaticCatalog {
    /// Create a catalog from a list of books.
    pub fn new(books: impl IntoIterator<Item = BookSnapshot>) -> Self {
        Self {
            books: RwLock::new(books.into_iter().map(|b| (b.book_id.clone(), b)).collect()),
            offline: AtomicBool::new(false),
        }
    }

    /// Add or replace a book.
    pub async fn upsert(&self, book: BookSnapshot) {
        self.books.write().await.insert(book.book_id.clone(), book);
    }

    /// Remove a book.
    pub async fn remove(&self, book_id: &BookId) -> Option<BookSnapshot> {
        self.books.write().await.remove(book_id)
    }

    /// Make every subsequent call fail with [`CatalogError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of books.
    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    /// Check if the catalog is empty.
    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }

    fn check_online(&self) -> Result<(), CatalogError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable(
                "catalog service temporarily unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn resolve(&self, book_id: &BookId) -> Result<BookSnapshot, CatalogError> {
        self.check_online()?;
        self.books
            .read()
            .await
            .get(book_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(book_id.clone()))
    }

    async fn search(&self, query: &str) -> Result<Vec<BookSnapshot>, CatalogError> {
        self.check_online()?;
        let query = query.trim();
        let books = self.books.read().await;
        Ok(books
            .values()
            .filter(|b| query.is_empty() || b.matches(query))
            .cloned()
            .collect())
    }
}
