//! Cart and wishlist contents as seen by a client.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::ids::BookId;
use crate::wishlist::{Wishlist, WishlistLine};

/// A client's copy of one shopper's cart and wishlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub cart: Vec<CartLine>,
    #[serde(default)]
    pub wishlist: Vec<WishlistLine>,
}

impl SessionState {
    /// Copy the server records.
    pub fn from_records(cart: Cart, wishlist: Wishlist) -> Self {
        Self {
            cart: cart.lines,
            wishlist: wishlist.lines,
        }
    }

    /// Quantity of a book in the cart, zero when absent.
    pub fn cart_quantity(&self, book_id: &BookId) -> i64 {
        self.cart
            .iter()
            .find(|l| &l.book_id == book_id)
            .map_or(0, |l| l.quantity)
    }

    /// Check if a book is saved.
    pub fn in_wishlist(&self, book_id: &BookId) -> bool {
        self.wishlist.iter().any(|l| &l.book_id == book_id)
    }

    /// Total item count in the cart.
    pub fn cart_item_count(&self) -> i64 {
        self.cart.iter().map(|l| l.quantity).sum()
    }

    /// Check if both cart and wishlist are empty.
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty() && self.wishlist.is_empty()
    }
}
