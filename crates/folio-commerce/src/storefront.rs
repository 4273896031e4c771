//! All storefront services wired to one store and catalog.

use std::sync::Arc;

use async_trait::async_trait;
use folio_store::{DocumentStore, MemoryStore, OwnerLocks};
use tracing::instrument;

use crate::address::AddressBookStore;
use crate::cart::{Cart, CartStore};
use crate::catalog::{BookSnapshot, CatalogProvider};
use crate::checkout::{Checkout, OrderPipeline, PaymentGateway, SimulatedGateway};
use crate::config::CommerceConfig;
use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId};
use crate::review::ReviewStore;
use crate::sync::{RemoteCommerce, SessionState};
use crate::wishlist::{Wishlist, WishlistStore};

/// The storefront core.
///
/// Every service shares the same document store and per-owner lock table.
/// Cloning is cheap.
#[derive(Clone)]
pub struct Storefront {
    pub carts: CartStore,
    pub wishlists: WishlistStore,
    pub addresses: AddressBookStore,
    pub orders: OrderPipeline,
    pub checkout: Checkout,
    pub reviews: ReviewStore,
    catalog: Arc<dyn CatalogProvider>,
    config: CommerceConfig,
}

impl Storefront {
    /// Wire up every service.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<dyn CatalogProvider>,
        gateway: Arc<dyn PaymentGateway>,
        config: CommerceConfig,
    ) -> Self {
        let locks = Arc::new(OwnerLocks::new());
        let carts = CartStore::new(store.clone(), catalog.clone(), locks.clone());
        let wishlists = WishlistStore::new(store.clone(), catalog.clone(), locks.clone());
        let addresses = AddressBookStore::new(store.clone(), locks.clone());
        let orders = OrderPipeline::new(
            store.clone(),
            gateway,
            locks.clone(),
            config.payment.timeout(),
        );
        let checkout = Checkout::new(
            carts.clone(),
            addresses.clone(),
            orders.clone(),
            config.pricing.clone(),
            locks.clone(),
        );
        let reviews = ReviewStore::new(store, locks);

        Self {
            carts,
            wishlists,
            addresses,
            orders,
            checkout,
            reviews,
            catalog,
            config,
        }
    }

    /// A storefront over a fresh in-memory store with the simulated gateway.
    pub fn in_memory(catalog: Arc<dyn CatalogProvider>, config: CommerceConfig) -> Self {
        let gateway = Arc::new(SimulatedGateway::from_config(&config.payment));
        Self::new(Arc::new(MemoryStore::new()), catalog, gateway, config)
    }

    pub fn config(&self) -> &CommerceConfig {
        &self.config
    }

    /// Search the catalog. A blank query lists the default selection.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<BookSnapshot>, CommerceError> {
        Ok(self.catalog.search(query.trim()).await?)
    }

    /// Look up one book.
    pub async fn book(&self, book_id: &BookId) -> Result<BookSnapshot, CommerceError> {
        Ok(self.catalog.resolve(book_id).await?)
    }

    /// Move a saved book into the cart.
    pub async fn move_to_cart(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<(Wishlist, Cart), CommerceError> {
        self.wishlists
            .move_to_cart(owner_id, book_id, &self.carts)
            .await
    }
}

#[async_trait]
impl RemoteCommerce for Storefront {
    async fn fetch_state(&self, owner_id: &OwnerId) -> Result<SessionState, CommerceError> {
        let (cart, wishlist) =
            futures::try_join!(self.carts.get(owner_id), self.wishlists.get(owner_id))?;
        Ok(SessionState::from_records(cart, wishlist))
    }

    async fn add_to_cart(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        self.carts.add_item(owner_id, book_id, quantity).await
    }

    async fn set_cart_quantity(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        self.carts.set_quantity(owner_id, book_id, quantity).await
    }

    async fn remove_from_cart(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Cart, CommerceError> {
        self.carts.remove_item(owner_id, book_id).await
    }

    async fn clear_cart(&self, owner_id: &OwnerId) -> Result<Cart, CommerceError> {
        self.carts.clear(owner_id).await
    }

    async fn add_to_wishlist(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Wishlist, CommerceError> {
        self.wishlists.add(owner_id, book_id).await
    }

    async fn remove_from_wishlist(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Wishlist, CommerceError> {
        self.wishlists.remove(owner_id, book_id).await
    }

    async fn move_to_cart(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<(Wishlist, Cart), CommerceError> {
        Storefront::move_to_cart(self, owner_id, book_id).await
    }
}
