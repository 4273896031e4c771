//! Book metadata as returned by the catalog.

use serde::{Deserialize, Serialize};

use crate::ids::BookId;
use crate::money::Money;

/// Fallback title when the catalog omits one.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Fallback author when the catalog omits one.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A point-in-time view of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// Catalog identifier.
    pub book_id: BookId,
    /// Title.
    #[serde(default = "default_title")]
    pub title: String,
    /// First listed author.
    #[serde(default = "default_author")]
    pub author: String,
    /// Current price.
    pub price: Money,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

fn default_title() -> String {
    UNKNOWN_TITLE.to_string()
}

fn default_author() -> String {
    UNKNOWN_AUTHOR.to_string()
}

impl BookSnapshot {
    /// Create a snapshot.
    pub fn new(
        book_id: impl Into<BookId>,
        title: impl Into<String>,
        author: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            title: title.into(),
            author: author.into(),
            price,
            thumbnail: None,
        }
    }

    /// Set the cover image URL.
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    /// Case-insensitive match against title and author.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.author.to_lowercase().contains(&query)
    }
}
