//! Order types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::PostalAddress;
use crate::error::CommerceError;
use crate::ids::{BookId, OrderId, OwnerId};
use crate::money::Money;

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
    Netbanking,
    /// Cash on delivery.
    Cod,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Netbanking => "netbanking",
            PaymentMethod::Cod => "cod",
        }
    }

    /// Whether the method is charged up front through the gateway.
    pub fn is_prepaid(&self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "netbanking" => Ok(PaymentMethod::Netbanking),
            "cod" => Ok(PaymentMethod::Cod),
            other => Err(CommerceError::InvalidInput(format!(
                "unrecognized payment method: {other}"
            ))),
        }
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not yet collected (cash on delivery).
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// Fulfillment status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// The next fulfillment step, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Confirmed => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Processing)
    }

    /// Check a transition is allowed.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        match target {
            OrderStatus::Cancelled => self.can_cancel(),
            _ => self.next() == Some(target),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(CommerceError::InvalidInput(format!(
                "unrecognized order status: {other}"
            ))),
        }
    }
}

/// A purchased book, copied at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    /// Unit price.
    pub price: Money,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl OrderItem {
    /// `price * quantity`.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }
}

/// Everything the caller supplies to create an order.
///
/// Amounts are precomputed by the caller and only checked for consistency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping_address: PostalAddress,
    pub payment_method: PaymentMethod,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub cod_charges: Money,
    pub total: Money,
}

impl OrderRequest {
    /// Reject malformed requests.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.items.is_empty() {
            return Err(CommerceError::InvalidInput(
                "order must contain at least one item".to_string(),
            ));
        }
        for item in &self.items {
            if item.quantity < 1 {
                return Err(CommerceError::InvalidInput(format!(
                    "item {} has quantity {}",
                    item.book_id, item.quantity
                )));
            }
            if item.price.is_negative() {
                return Err(CommerceError::InvalidInput(format!(
                    "item {} has a negative price",
                    item.book_id
                )));
            }
        }
        self.shipping_address.validate()?;

        let parts = [self.subtotal, self.shipping, self.tax, self.cod_charges];
        if parts.iter().any(Money::is_negative) {
            return Err(CommerceError::InvalidInput(
                "order amounts must not be negative".to_string(),
            ));
        }
        let line_totals = self
            .items
            .iter()
            .map(|item| item.line_total().ok_or(CommerceError::Overflow))
            .collect::<Result<Vec<_>, _>>()?;
        let items_subtotal = Money::try_sum(line_totals).ok_or(CommerceError::Overflow)?;
        if items_subtotal != self.subtotal {
            return Err(CommerceError::InvalidInput(format!(
                "subtotal {} does not match the items ({})",
                self.subtotal, items_subtotal
            )));
        }

        let expected = Money::try_sum(parts).ok_or(CommerceError::Overflow)?;
        if expected != self.total {
            return Err(CommerceError::InvalidInput(format!(
                "total {} does not equal subtotal + shipping + tax + cod charges ({})",
                self.total, expected
            )));
        }
        Ok(())
    }
}

/// A placed order.
///
/// Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner_id: OwnerId,
    pub items: Vec<OrderItem>,
    pub shipping_address: PostalAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub cod_charges: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build a confirmed order from a validated request.
    pub(crate) fn confirmed(
        owner_id: OwnerId,
        request: OrderRequest,
        payment_status: PaymentStatus,
    ) -> Self {
        Self {
            id: OrderId::generate(),
            owner_id,
            items: request.items,
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            payment_status,
            subtotal: request.subtotal,
            shipping: request.shipping,
            tax: request.tax,
            cod_charges: request.cod_charges,
            total: request.total,
            status: OrderStatus::Confirmed,
            created_at: Utc::now(),
        }
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
