//! Cart and cart line types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId};

/// One book in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Book being purchased.
    pub book_id: BookId,
    /// Quantity, always at least 1.
    pub quantity: i64,
}

impl CartLine {
    /// Create a line.
    pub fn new(book_id: impl Into<BookId>, quantity: i64) -> Self {
        Self {
            book_id: book_id.into(),
            quantity,
        }
    }
}

/// A shopper's cart.
///
/// Lines are kept in insertion order and hold at most one entry per book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Owner of the cart.
    pub owner_id: OwnerId,
    /// Lines in insertion order.
    #[serde(default)]
    pub lines: Vec<CartLine>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            lines: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Add `quantity` copies of a book, merging into an existing line.
    ///
    /// Returns the line's quantity after the change.
    pub fn add_item(&mut self, book_id: &BookId, quantity: i64) -> Result<i64, CommerceError> {
        let total = add_line(&mut self.lines, book_id, quantity)?;
        self.touch();
        Ok(total)
    }

    /// Set a line's quantity.
    pub fn set_quantity(&mut self, book_id: &BookId, quantity: i64) -> Result<(), CommerceError> {
        set_line_quantity(&mut self.lines, book_id, quantity)?;
        self.touch();
        Ok(())
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove_item(&mut self, book_id: &BookId) -> bool {
        let removed = remove_line(&mut self.lines, book_id);
        if removed {
            self.touch();
        }
        removed
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.touch();
    }

    /// Get the line for a book.
    pub fn line(&self, book_id: &BookId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.book_id == book_id)
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Add to a line list, merging with an existing line for the same book.
///
/// Returns the line's quantity after the change.
pub fn add_line(
    lines: &mut Vec<CartLine>,
    book_id: &BookId,
    quantity: i64,
) -> Result<i64, CommerceError> {
    validate_quantity(quantity)?;

    if let Some(existing) = lines.iter_mut().find(|l| &l.book_id == book_id) {
        let new_quantity = existing
            .quantity
            .checked_add(quantity)
            .ok_or(CommerceError::Overflow)?;
        validate_quantity(new_quantity)?;
        existing.quantity = new_quantity;
        return Ok(new_quantity);
    }

    lines.push(CartLine::new(book_id.clone(), quantity));
    Ok(quantity)
}

/// Overwrite a line's quantity.
///
/// Zero is not a quantity; callers remove the line instead.
pub fn set_line_quantity(
    lines: &mut [CartLine],
    book_id: &BookId,
    quantity: i64,
) -> Result<(), CommerceError> {
    validate_quantity(quantity)?;
    let line = lines
        .iter_mut()
        .find(|l| &l.book_id == book_id)
        .ok_or_else(|| CommerceError::NotFound(format!("book {book_id} is not in the cart")))?;
    line.quantity = quantity;
    Ok(())
}

/// Drop a line if present.
pub fn remove_line(lines: &mut Vec<CartLine>, book_id: &BookId) -> bool {
    let len_before = lines.len();
    lines.retain(|l| &l.book_id != book_id);
    lines.len() < len_before
}

fn validate_quantity(quantity: i64) -> Result<(), CommerceError> {
    if quantity < 1 {
        return Err(CommerceError::InvalidInput(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    Ok(())
}
