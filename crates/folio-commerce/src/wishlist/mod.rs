//! Wishlist module.

mod store;
mod wishlist;

pub use store::{WishlistStore, WISHLISTS};
pub use wishlist::{Wishlist, WishlistLine};
