//! Shopping cart module.
//!
//! Contains the cart document, live pricing against the catalog, and the
//! per-owner cart store.

mod cart;
mod pricing;
mod store;

pub use cart::{add_line, remove_line, set_line_quantity, Cart, CartLine};
pub use pricing::{PricedCart, PricedLine, LOAD_ERROR_TITLE, NOT_AVAILABLE_TITLE};
pub use store::{CartStore, CARTS};
