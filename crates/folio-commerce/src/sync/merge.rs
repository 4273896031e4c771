//! The login-time merge.

use serde::{Deserialize, Serialize};

use crate::ids::BookId;
use crate::sync::SessionState;

/// A server mutation the merge asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PushOp {
    AddToCart { book_id: BookId, quantity: i64 },
    AddToWishlist { book_id: BookId },
}

impl PushOp {
    pub fn book_id(&self) -> &BookId {
        match self {
            PushOp::AddToCart { book_id, .. } | PushOp::AddToWishlist { book_id } => book_id,
        }
    }
}

/// Result of merging a local cache into server state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergePlan {
    /// Server mutations for lines only the cache has.
    pub push: Vec<PushOp>,
    /// Server state after every push succeeds.
    pub final_state: SessionState,
    /// Books present on both sides. The server copy was kept.
    pub overlapping: Vec<BookId>,
}

/// Merge a local cache into the server's state.
///
/// Cache lines the server lacks become pushes. For books on both sides the
/// server wins outright; local quantities are never added to server ones.
/// Repeated cache lines for one book count once.
pub fn merge(local: &SessionState, server: &SessionState) -> MergePlan {
    let mut plan = MergePlan {
        final_state: server.clone(),
        ..Default::default()
    };

    for line in &local.cart {
        if server.cart_quantity(&line.book_id) > 0 {
            note_overlap(&mut plan.overlapping, &line.book_id);
        } else if plan.final_state.cart_quantity(&line.book_id) == 0 && line.quantity > 0 {
            plan.push.push(PushOp::AddToCart {
                book_id: line.book_id.clone(),
                quantity: line.quantity,
            });
            plan.final_state.cart.push(line.clone());
        }
    }

    for entry in &local.wishlist {
        if server.in_wishlist(&entry.book_id) {
            note_overlap(&mut plan.overlapping, &entry.book_id);
        } else if !plan.final_state.in_wishlist(&entry.book_id) {
            plan.push.push(PushOp::AddToWishlist {
                book_id: entry.book_id.clone(),
            });
            plan.final_state.wishlist.push(entry.clone());
        }
    }

    plan
}

fn note_overlap(overlapping: &mut Vec<BookId>, book_id: &BookId) {
    if !overlapping.contains(book_id) {
        overlapping.push(book_id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::catalog::BookSnapshot;
    use crate::money::Money;
    use crate::wishlist::WishlistLine;

    fn saved(id: &str, price: i64) -> WishlistLine {
        WishlistLine::snapshot(BookSnapshot::new(id, "T", "A", Money::from_major(price)))
    }

    #[test]
    fn test_server_wins_on_overlap() {
        let local = SessionState {
            cart: vec![CartLine::new("b1", 1)],
            ..Default::default()
        };
        let server = SessionState {
            cart: vec![CartLine::new("b1", 3)],
            ..Default::default()
        };

        let plan = merge(&local, &server);
        assert!(plan.push.is_empty());
        assert_eq!(plan.final_state.cart, vec![CartLine::new("b1", 3)]);
        assert_eq!(plan.overlapping, vec![BookId::new("b1")]);
    }

    #[test]
    fn test_local_only_lines_are_pushed() {
        let local = SessionState {
            cart: vec![CartLine::new("b1", 2), CartLine::new("b2", 1)],
            wishlist: vec![saved("b3", 100), saved("b4", 200)],
        };
        let server = SessionState {
            cart: vec![CartLine::new("b2", 5)],
            wishlist: vec![saved("b4", 150)],
        };

        let plan = merge(&local, &server);
        assert_eq!(
            plan.push,
            vec![
                PushOp::AddToCart {
                    book_id: BookId::new("b1"),
                    quantity: 2
                },
                PushOp::AddToWishlist {
                    book_id: BookId::new("b3")
                },
            ]
        );
        assert_eq!(
            plan.final_state.cart,
            vec![CartLine::new("b2", 5), CartLine::new("b1", 2)]
        );
        assert_eq!(plan.final_state.wishlist.len(), 2);
        assert_eq!(plan.final_state.wishlist[0].price, Money::from_major(150));
    }

    #[test]
    fn test_empty_cache_changes_nothing() {
        let server = SessionState {
            cart: vec![CartLine::new("b1", 1)],
            wishlist: vec![saved("b2", 10)],
        };
        let plan = merge(&SessionState::default(), &server);
        assert!(plan.push.is_empty());
        assert_eq!(plan.final_state, server);
    }

    #[test]
    fn test_duplicate_cache_lines_push_once() {
        let local = SessionState {
            cart: vec![CartLine::new("b1", 1), CartLine::new("b1", 4)],
            ..Default::default()
        };
        let plan = merge(&local, &SessionState::default());
        assert_eq!(plan.push.len(), 1);
        assert_eq!(plan.final_state.cart_quantity(&BookId::new("b1")), 1);
    }
}
