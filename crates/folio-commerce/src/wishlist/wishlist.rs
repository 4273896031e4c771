//! Wishlist types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::BookSnapshot;
use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId};
use crate::money::Money;

/// A saved book.
///
/// Title, author and price are copied from the catalog when the line is
/// added and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistLine {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    /// Price when the book was saved.
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistLine {
    /// Snapshot a catalog entry now.
    pub fn snapshot(book: BookSnapshot) -> Self {
        Self {
            book_id: book.book_id,
            title: book.title,
            author: book.author,
            price: book.price,
            thumbnail: book.thumbnail,
            added_at: Utc::now(),
        }
    }
}

/// A shopper's wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wishlist {
    pub owner_id: OwnerId,
    #[serde(default)]
    pub lines: Vec<WishlistLine>,
    pub updated_at: DateTime<Utc>,
}

impl Wishlist {
    /// Create an empty wishlist.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            lines: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Append a line, rejecting a second line for the same book.
    pub fn add(&mut self, line: WishlistLine) -> Result<(), CommerceError> {
        if self.contains(&line.book_id) {
            return Err(CommerceError::Conflict(format!(
                "book {} is already in the wishlist",
                line.book_id
            )));
        }
        self.lines.push(line);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove(&mut self, book_id: &BookId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.book_id != book_id);
        let removed = self.lines.len() < len_before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.updated_at = Utc::now();
    }

    /// Check if a book is saved.
    pub fn contains(&self, book_id: &BookId) -> bool {
        self.lines.iter().any(|l| &l.book_id == book_id)
    }

    /// Number of saved books.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the wishlist is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
