//! Per-owner wishlist persistence.

use std::sync::Arc;

use folio_store::{store_key, Collection, DocumentStore, OwnerLocks};
use tracing::instrument;

use crate::cart::{Cart, CartStore};
use crate::catalog::CatalogProvider;
use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId};
use crate::wishlist::{Wishlist, WishlistLine};

/// Wishlists, one document per owner keyed by owner ID.
pub const WISHLISTS: Collection<Wishlist> = Collection::new("wishlists");

/// Authoritative wishlist store.
#[derive(Clone)]
pub struct WishlistStore {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<dyn CatalogProvider>,
    locks: Arc<OwnerLocks>,
}

impl WishlistStore {
    /// Create a wishlist store.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<dyn CatalogProvider>,
        locks: Arc<OwnerLocks>,
    ) -> Self {
        Self {
            store,
            catalog,
            locks,
        }
    }

    /// Get the owner's wishlist, or an empty one if none exists yet.
    pub async fn get(&self, owner_id: &OwnerId) -> Result<Wishlist, CommerceError> {
        Ok(WISHLISTS
            .get(self.store.as_ref(), owner_id.as_str())
            .await?
            .map(|v| v.into_inner())
            .unwrap_or_else(|| Wishlist::new(owner_id.clone())))
    }

    /// Save a book.
    ///
    /// The book must resolve in the catalog; a catalog outage fails the call
    /// since there is no snapshot to store.
    #[instrument(skip(self), fields(owner = %owner_id, book = %book_id))]
    pub async fn add(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Wishlist, CommerceError> {
        let book = self.catalog.resolve(book_id).await?;
        let line = WishlistLine::snapshot(book);

        let _guard = self.lock(owner_id).await;
        let (wishlist, ()) = WISHLISTS
            .update(
                self.store.as_ref(),
                owner_id.as_str(),
                owner_id.as_str(),
                || Wishlist::new(owner_id.clone()),
                |wishlist| wishlist.add(line.clone()),
            )
            .await?;
        tracing::debug!("added to wishlist");
        Ok(wishlist)
    }

    /// Remove a book. Absent books are not an error.
    #[instrument(skip(self), fields(owner = %owner_id, book = %book_id))]
    pub async fn remove(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Wishlist, CommerceError> {
        let _guard = self.lock(owner_id).await;
        self.remove_locked(owner_id, book_id).await
    }

    /// Remove every saved book.
    #[instrument(skip(self), fields(owner = %owner_id))]
    pub async fn clear(&self, owner_id: &OwnerId) -> Result<Wishlist, CommerceError> {
        let _guard = self.lock(owner_id).await;
        let (wishlist, ()) = WISHLISTS
            .update(
                self.store.as_ref(),
                owner_id.as_str(),
                owner_id.as_str(),
                || Wishlist::new(owner_id.clone()),
                |wishlist| {
                    wishlist.clear();
                    Ok::<_, CommerceError>(())
                },
            )
            .await?;
        Ok(wishlist)
    }

    /// Move a saved book into the cart with quantity 1.
    ///
    /// Either both stores change or neither does. If the cart add fails the
    /// wishlist is left alone; if the wishlist removal fails afterwards the
    /// cart add is retracted.
    #[instrument(skip(self, carts), fields(owner = %owner_id, book = %book_id))]
    pub async fn move_to_cart(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        carts: &CartStore,
    ) -> Result<(Wishlist, Cart), CommerceError> {
        let _guard = self.lock(owner_id).await;

        if !self.get(owner_id).await?.contains(book_id) {
            return Err(CommerceError::NotFound(format!(
                "book {book_id} is not in the wishlist"
            )));
        }

        let cart = carts.add_item(owner_id, book_id, 1).await?;

        match self.remove_locked(owner_id, book_id).await {
            Ok(wishlist) => {
                tracing::debug!("moved to cart");
                Ok((wishlist, cart))
            }
            Err(e) => {
                tracing::warn!(error = %e, "wishlist removal failed, retracting cart add");
                if let Err(undo) = carts.retract(owner_id, book_id, 1).await {
                    tracing::error!(error = %undo, "failed to retract cart add");
                }
                Err(e)
            }
        }
    }

    async fn remove_locked(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Wishlist, CommerceError> {
        let current = self.get(owner_id).await?;
        if !current.contains(book_id) {
            return Ok(current);
        }
        let (wishlist, ()) = WISHLISTS
            .update(
                self.store.as_ref(),
                owner_id.as_str(),
                owner_id.as_str(),
                || Wishlist::new(owner_id.clone()),
                |wishlist| {
                    wishlist.remove(book_id);
                    Ok::<_, CommerceError>(())
                },
            )
            .await?;
        Ok(wishlist)
    }

    async fn lock(&self, owner_id: &OwnerId) -> tokio::sync::OwnedMutexGuard<()> {
        self.locks
            .acquire(&store_key!(WISHLISTS.name(), owner_id))
            .await
    }
}
