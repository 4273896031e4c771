//! Per-owner cart persistence.

use std::sync::Arc;

use folio_store::{store_key, Collection, DocumentStore, OwnerLocks};
use futures::future::join_all;
use tracing::instrument;

use crate::cart::{Cart, PricedCart, PricedLine};
use crate::catalog::CatalogProvider;
use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId};

/// Carts, one document per owner keyed by owner ID.
pub const CARTS: Collection<Cart> = Collection::new("carts");

/// Authoritative cart store.
///
/// Writes for one owner are serialized through the shared lock table, and
/// each write is a versioned replace so a lost race is retried rather than
/// overwritten.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<dyn CatalogProvider>,
    locks: Arc<OwnerLocks>,
}

impl CartStore {
    /// Create a cart store.
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

    /// Get the owner's cart, or an empty one if none exists yet.
    pub async fn get(&self, owner_id: &OwnerId) -> Result<Cart, CommerceError> {
        Ok(CARTS
            .get(self.store.as_ref(), owner_id.as_str())
            .await?
            .map(|v| v.into_inner())
            .unwrap_or_else(|| Cart::new(owner_id.clone())))
    }

    /// Add copies of a book, merging into an existing line.
    #[instrument(skip(self), fields(owner = %owner_id, book = %book_id))]
    pub async fn add_item(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        let cart = self
            .modify(owner_id, |cart| cart.add_item(book_id, quantity).map(|_| ()))
            .await?;
        tracing::debug!(quantity, "added to cart");
        Ok(cart)
    }

    /// Overwrite a line's quantity.
    #[instrument(skip(self), fields(owner = %owner_id, book = %book_id))]
    pub async fn set_quantity(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        // A missing cart has no lines to update.
        if CARTS
            .get(self.store.as_ref(), owner_id.as_str())
            .await?
            .is_none()
        {
            return Err(CommerceError::NotFound(format!(
                "book {book_id} is not in the cart"
            )));
        }
        let cart = self
            .modify(owner_id, |cart| cart.set_quantity(book_id, quantity))
            .await?;
        tracing::debug!(quantity, "cart quantity set");
        Ok(cart)
    }

    /// Remove a line. Absent lines are not an error.
    #[instrument(skip(self), fields(owner = %owner_id, book = %book_id))]
    pub async fn remove_item(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Cart, CommerceError> {
        let current = self.get(owner_id).await?;
        if current.line(book_id).is_none() {
            return Ok(current);
        }
        let cart = self
            .modify(owner_id, |cart| {
                cart.remove_item(book_id);
                Ok(())
            })
            .await?;
        tracing::debug!("removed from cart");
        Ok(cart)
    }

    /// Empty the cart, creating an empty record if none exists.
    #[instrument(skip(self), fields(owner = %owner_id))]
    pub async fn clear(&self, owner_id: &OwnerId) -> Result<Cart, CommerceError> {
        let cart = self
            .modify(owner_id, |cart| {
                cart.clear();
                Ok(())
            })
            .await?;
        tracing::debug!("cart cleared");
        Ok(cart)
    }

    /// Resolve every line against the catalog.
    ///
    /// Lookups run concurrently. A failed lookup degrades to a placeholder
    /// line instead of failing the whole cart.
    #[instrument(skip(self), fields(owner = %owner_id))]
    pub async fn price_cart(&self, owner_id: &OwnerId) -> Result<PricedCart, CommerceError> {
        let cart = self.get(owner_id).await?;
        let lookups = join_all(cart.lines.iter().map(|l| self.catalog.resolve(&l.book_id))).await;

        let mut lines = Vec::with_capacity(cart.lines.len());
        for (line, lookup) in cart.lines.iter().zip(lookups) {
            if let Err(e) = &lookup {
                tracing::warn!(book = %line.book_id, error = %e, "catalog lookup failed, using placeholder");
            }
            lines.push(PricedLine::from_lookup(line, lookup)?);
        }
        PricedCart::new(cart.owner_id, lines)
    }

    /// Undo an earlier `add_item` of `quantity` copies.
    ///
    /// Decrements the line, removing it when nothing would remain.
    pub(crate) async fn retract(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        self.modify(owner_id, |cart| take_copies(cart, book_id, quantity))
            .await
    }

    /// Take ordered copies out of the cart in one write.
    ///
    /// Lines added or topped up after the order was priced keep the
    /// difference.
    #[instrument(skip(self, ordered), fields(owner = %owner_id, lines = ordered.len()))]
    pub(crate) async fn remove_ordered(
        &self,
        owner_id: &OwnerId,
        ordered: &[(BookId, i64)],
    ) -> Result<Cart, CommerceError> {
        let cart = self
            .modify(owner_id, |cart| {
                ordered
                    .iter()
                    .try_for_each(|(book_id, quantity)| take_copies(cart, book_id, *quantity))
            })
            .await?;
        tracing::debug!(remaining = cart.lines.len(), "ordered lines taken from cart");
        Ok(cart)
    }

    async fn modify<F>(&self, owner_id: &OwnerId, mut apply: F) -> Result<Cart, CommerceError>
    where
        F: FnMut(&mut Cart) -> Result<(), CommerceError> + Send,
    {
        let _guard = self.locks.acquire(&store_key!(CARTS.name(), owner_id)).await;
        let (cart, ()) = CARTS
            .update(
                self.store.as_ref(),
                owner_id.as_str(),
                owner_id.as_str(),
                || Cart::new(owner_id.clone()),
                |cart| apply(cart),
            )
            .await?;
        Ok(cart)
    }
}

fn take_copies(cart: &mut Cart, book_id: &BookId, quantity: i64) -> Result<(), CommerceError> {
    let remaining = cart.line(book_id).map(|l| l.quantity - quantity);
    match remaining {
        Some(q) if q >= 1 => cart.set_quantity(book_id, q),
        Some(_) => {
            cart.remove_item(book_id);
            Ok(())
        }
        None => Ok(()),
    }
}
