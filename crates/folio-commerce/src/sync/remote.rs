//! The server as seen by a client session.

use async_trait::async_trait;

use crate::cart::Cart;
use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId};
use crate::sync::SessionState;
use crate::wishlist::Wishlist;

/// Server-side cart and wishlist operations a client session calls.
///
/// Every mutation returns the record as the server stored it, so the client
/// mirror can be overwritten from a confirmed response.
#[async_trait]
pub trait RemoteCommerce: Send + Sync {
    /// Current cart and wishlist.
    async fn fetch_state(&self, owner_id: &OwnerId) -> Result<SessionState, CommerceError>;

    async fn add_to_cart(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<Cart, CommerceError>;

    async fn set_cart_quantity(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<Cart, CommerceError>;

    async fn remove_from_cart(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Cart, CommerceError>;

    async fn clear_cart(&self, owner_id: &OwnerId) -> Result<Cart, CommerceError>;

    async fn add_to_wishlist(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Wishlist, CommerceError>;

    async fn remove_from_wishlist(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Wishlist, CommerceError>;

    async fn move_to_cart(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<(Wishlist, Cart), CommerceError>;
}
