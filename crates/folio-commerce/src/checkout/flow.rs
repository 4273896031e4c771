//! Cart-to-order checkout.

use std::sync::Arc;

use folio_store::{store_key, OwnerLocks};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::address::{AddressBookStore, PostalAddress};
use crate::cart::{CartStore, PricedCart};
use crate::checkout::{CheckoutQuote, Order, OrderItem, OrderPipeline, OrderRequest, PaymentMethod};
use crate::config::PricingConfig;
use crate::error::CommerceError;
use crate::ids::{AddressId, BookId, OwnerId};

/// What the shopper would pay right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutPreview {
    pub cart: PricedCart,
    pub quote: CheckoutQuote,
}

/// Drives a checkout from the shopper's cart and address book.
#[derive(Clone)]
pub struct Checkout {
    carts: CartStore,
    addresses: AddressBookStore,
    orders: OrderPipeline,
    pricing: PricingConfig,
    locks: Arc<OwnerLocks>,
}

impl Checkout {
    /// Create a checkout.
    pub fn new(
        carts: CartStore,
        addresses: AddressBookStore,
        orders: OrderPipeline,
        pricing: PricingConfig,
        locks: Arc<OwnerLocks>,
    ) -> Self {
        Self {
            carts,
            addresses,
            orders,
            pricing,
            locks,
        }
    }

    /// Price the cart and quote charges without placing anything.
    pub async fn preview(
        &self,
        owner_id: &OwnerId,
        method: PaymentMethod,
    ) -> Result<CheckoutPreview, CommerceError> {
        let cart = self.carts.price_cart(owner_id).await?;
        let quote = CheckoutQuote::compute(&self.pricing, cart.total, method)?;
        Ok(CheckoutPreview { cart, quote })
    }

    /// Place an order for everything in the cart.
    ///
    /// Ships to `address_id`, or the default address when none is given. The
    /// ordered copies leave the cart only after the order is stored, and books
    /// added while payment is in flight stay behind. A failure to update the
    /// cart is logged and the order still returned.
    #[instrument(skip(self), fields(owner = %owner_id, method = %method))]
    pub async fn place_order(
        &self,
        owner_id: &OwnerId,
        address_id: Option<&AddressId>,
        method: PaymentMethod,
    ) -> Result<Order, CommerceError> {
        let _guard = self
            .locks
            .acquire(&store_key!("checkout", owner_id))
            .await;

        let shipping_address = self.shipping_address(owner_id, address_id).await?;
        let CheckoutPreview { cart, quote } = self.preview(owner_id, method).await?;

        if cart.is_empty() {
            return Err(CommerceError::InvalidInput("cart is empty".to_string()));
        }
        if cart.has_unavailable() {
            let missing: Vec<String> = cart.unavailable().map(|l| l.book_id.to_string()).collect();
            return Err(CommerceError::InvalidInput(format!(
                "cart has unavailable books: {}",
                missing.join(", ")
            )));
        }

        let ordered: Vec<(BookId, i64)> = cart
            .lines
            .iter()
            .map(|l| (l.book_id.clone(), l.quantity))
            .collect();
        let items = cart
            .lines
            .into_iter()
            .map(|l| OrderItem {
                book_id: l.book_id,
                title: l.title,
                author: l.author,
                price: l.price,
                quantity: l.quantity,
                thumbnail: l.thumbnail,
            })
            .collect();

        let request = OrderRequest {
            items,
            shipping_address,
            payment_method: method,
            subtotal: quote.subtotal,
            shipping: quote.shipping,
            tax: quote.tax,
            cod_charges: quote.cod_charges,
            total: quote.total,
        };
        let order = self.orders.create_order(owner_id, request).await?;

        if let Err(e) = self.carts.remove_ordered(owner_id, &ordered).await {
            tracing::warn!(order = %order.id, error = %e, "order placed but cart was not cleared");
        }
        Ok(order)
    }

    async fn shipping_address(
        &self,
        owner_id: &OwnerId,
        address_id: Option<&AddressId>,
    ) -> Result<PostalAddress, CommerceError> {
        let address = match address_id {
            Some(id) => self.addresses.get(owner_id, id).await?,
            None => self.addresses.default_address(owner_id).await?.ok_or_else(|| {
                CommerceError::InvalidInput("no shipping address on file".to_string())
            })?,
        };
        Ok(address.postal)
    }
}
