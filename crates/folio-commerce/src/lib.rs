//! Bookstore storefront core for Folio.
//!
//! - **Cart**: per-owner cart with live catalog pricing
//! - **Wishlist**: saved books with add-time price snapshots, move to cart
//! - **Address**: address book with exactly one default address
//! - **Checkout**: quotes, simulated payment, immutable orders
//! - **Review**: one review per owner per book
//! - **Sync**: merging an anonymous client cache into the server at login
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_commerce::prelude::*;
//!
//! let catalog = Arc::new(StaticCatalog::new([
//!     BookSnapshot::new("b1", "Dune", "Frank Herbert", Money::from_major(399)),
//! ]));
//! let shop = Storefront::in_memory(catalog, CommerceConfig::default());
//! let owner = OwnerId::new("user-1");
//!
//! shop.carts.add_item(&owner, &BookId::new("b1"), 2).await?;
//! let preview = shop.checkout.preview(&owner, PaymentMethod::Cod).await?;
//! println!("Total: {}", preview.quote.total);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod review;
pub mod storefront;
pub mod sync;
pub mod wishlist;

pub use error::{CommerceError, ErrorKind};
pub use ids::*;
pub use money::Money;
pub use storefront::Storefront;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, ErrorKind};
    pub use crate::ids::*;
    pub use crate::money::Money;
    pub use crate::storefront::Storefront;

    // Catalog
    pub use crate::catalog::{BookSnapshot, CatalogError, CatalogProvider, StaticCatalog};

    // Cart
    pub use crate::cart::{Cart, CartLine, CartStore, PricedCart, PricedLine};

    // Wishlist
    pub use crate::wishlist::{Wishlist, WishlistLine, WishlistStore};

    // Address
    pub use crate::address::{Address, AddressBookStore, AddressPatch, NewAddress, PostalAddress};

    // Checkout
    pub use crate::checkout::{
        Checkout, CheckoutPreview, CheckoutQuote, Order, OrderItem, OrderPipeline, OrderRequest,
        OrderStatus, PaymentGateway, PaymentMethod, PaymentStatus, ScriptedGateway,
        SimulatedGateway,
    };

    // Reviews
    pub use crate::review::{RatingSummary, Review, ReviewStore};

    // Sync
    pub use crate::sync::{merge, ClientSession, MergePlan, PushOp, RemoteCommerce, SessionState, SyncReport};

    // Config
    pub use crate::config::CommerceConfig;
}
