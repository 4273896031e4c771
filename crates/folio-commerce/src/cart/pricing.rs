//! Live cart pricing.

use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::catalog::{BookSnapshot, CatalogError, UNKNOWN_AUTHOR};
use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId};
use crate::money::Money;

/// Title shown for a line whose book the catalog no longer knows.
pub const NOT_AVAILABLE_TITLE: &str = "Book Not Available";

/// Title shown for a line whose lookup failed.
pub const LOAD_ERROR_TITLE: &str = "Error Loading Book";

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    /// Current unit price, zero for placeholders.
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub quantity: i64,
    /// `price * quantity`.
    pub subtotal: Money,
    /// False when the line is a placeholder.
    pub available: bool,
}

impl PricedLine {
    /// Price a line from a catalog lookup result.
    ///
    /// A failed lookup keeps the line with a zero price and a sentinel title.
    pub fn from_lookup(
        line: &CartLine,
        lookup: Result<BookSnapshot, CatalogError>,
    ) -> Result<Self, CommerceError> {
        match lookup {
            Ok(book) => {
                let subtotal = book
                    .price
                    .checked_mul(line.quantity)
                    .ok_or(CommerceError::Overflow)?;
                Ok(Self {
                    book_id: line.book_id.clone(),
                    title: book.title,
                    author: book.author,
                    price: book.price,
                    thumbnail: book.thumbnail,
                    quantity: line.quantity,
                    subtotal,
                    available: true,
                })
            }
            Err(e) => {
                let title = match e {
                    CatalogError::NotFound(_) => NOT_AVAILABLE_TITLE,
                    CatalogError::Unavailable(_) => LOAD_ERROR_TITLE,
                };
                Ok(Self::placeholder(line, title))
            }
        }
    }

    fn placeholder(line: &CartLine, title: &str) -> Self {
        Self {
            book_id: line.book_id.clone(),
            title: title.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
            price: Money::zero(),
            thumbnail: None,
            quantity: line.quantity,
            subtotal: Money::zero(),
            available: false,
        }
    }
}

/// A cart with every line priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedCart {
    pub owner_id: OwnerId,
    pub lines: Vec<PricedLine>,
    /// Sum of line subtotals.
    pub total: Money,
}

impl PricedCart {
    /// Build from priced lines, summing the subtotals.
    pub fn new(owner_id: OwnerId, lines: Vec<PricedLine>) -> Result<Self, CommerceError> {
        let total =
            Money::try_sum(lines.iter().map(|l| l.subtotal)).ok_or(CommerceError::Overflow)?;
        Ok(Self {
            owner_id,
            lines,
            total,
        })
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Lines that could not be resolved.
    pub fn unavailable(&self) -> impl Iterator<Item = &PricedLine> {
        self.lines.iter().filter(|l| !l.available)
    }

    /// Check if any line is a placeholder.
    pub fn has_unavailable(&self) -> bool {
        self.unavailable().next().is_some()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_line() {
        let line = CartLine::new("b1", 3);
        let book = BookSnapshot::new("b1", "Dune", "Frank Herbert", Money::from_major(399));
        let priced = PricedLine::from_lookup(&line, Ok(book)).unwrap();

        assert!(priced.available);
        assert_eq!(priced.subtotal, Money::from_major(1197));
    }

    #[test]
    fn test_failed_lookups_become_placeholders() {
        let line = CartLine::new("b1", 2);

        let missing =
            PricedLine::from_lookup(&line, Err(CatalogError::NotFound(BookId::new("b1")))).unwrap();
        assert_eq!(missing.title, NOT_AVAILABLE_TITLE);
        assert_eq!(missing.quantity, 2);
        assert!(missing.subtotal.is_zero());

        let down =
            PricedLine::from_lookup(&line, Err(CatalogError::Unavailable("timeout".into())))
                .unwrap();
        assert_eq!(down.title, LOAD_ERROR_TITLE);
        assert!(!down.available);
    }

    #[test]
    fn test_cart_total() {
        let lines = vec![
            PricedLine::from_lookup(
                &CartLine::new("b1", 2),
                Ok(BookSnapshot::new("b1", "A", "X", Money::new(25050))),
            )
            .unwrap(),
            PricedLine::from_lookup(
                &CartLine::new("b2", 1),
                Err(CatalogError::NotFound(BookId::new("b2"))),
            )
            .unwrap(),
        ];
        let cart = PricedCart::new(OwnerId::new("u1"), lines).unwrap();

        assert_eq!(cart.total, Money::new(50100));
        assert_eq!(cart.item_count(), 3);
        assert!(cart.has_unavailable());
    }
}
