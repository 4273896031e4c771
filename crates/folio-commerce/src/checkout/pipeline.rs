//! Order creation and fulfillment status.

use std::sync::Arc;
use std::time::Duration;

use folio_store::{store_key, Collection, DocumentStore, OwnerLocks};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::checkout::{
    Order, OrderRequest, OrderStatus, PaymentCharge, PaymentGateway, PaymentOutcome, PaymentStatus,
};
use crate::error::CommerceError;
use crate::ids::{OrderId, OwnerId};

/// Orders keyed by order ID, owned by the shopper.
pub const ORDERS: Collection<Order> = Collection::new("orders");

/// Where an order is while it is being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderPhase {
    Draft,
    PaymentSimulation,
    Confirmed,
    PaymentFailed,
}

impl OrderPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPhase::Draft => "draft",
            OrderPhase::PaymentSimulation => "payment_simulation",
            OrderPhase::Confirmed => "confirmed",
            OrderPhase::PaymentFailed => "payment_failed",
        }
    }

    /// Check if the phase is final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderPhase::Confirmed | OrderPhase::PaymentFailed)
    }
}

/// Turns validated requests into persisted orders.
///
/// Never touches the cart; clearing it is the checkout flow's job.
#[derive(Clone)]
pub struct OrderPipeline {
    store: Arc<dyn DocumentStore>,
    gateway: Arc<dyn PaymentGateway>,
    locks: Arc<OwnerLocks>,
    payment_timeout: Duration,
}

impl OrderPipeline {
    /// Create a pipeline.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gateway: Arc<dyn PaymentGateway>,
        locks: Arc<OwnerLocks>,
        payment_timeout: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            locks,
            payment_timeout,
        }
    }

    /// Create an order.
    ///
    /// Cash on delivery is confirmed at once with payment pending. Prepaid
    /// methods go through the gateway; a decline or timeout fails with
    /// `PaymentDeclined` and nothing is stored.
    #[instrument(skip(self, request), fields(owner = %owner_id, method = %request.payment_method, total = %request.total))]
    pub async fn create_order(
        &self,
        owner_id: &OwnerId,
        request: OrderRequest,
    ) -> Result<Order, CommerceError> {
        let mut phase = OrderPhase::Draft;
        tracing::debug!(phase = phase.as_str(), items = request.items.len(), "validating order");
        request.validate()?;

        let payment_status = if request.payment_method.is_prepaid() {
            phase = OrderPhase::PaymentSimulation;
            tracing::debug!(phase = phase.as_str(), "charging gateway");

            let charge = PaymentCharge {
                owner_id: owner_id.clone(),
                method: request.payment_method,
                amount: request.total,
            };
            match self.charge(&charge).await {
                PaymentOutcome::Completed => PaymentStatus::Completed,
                PaymentOutcome::Failed(reason) => {
                    phase = OrderPhase::PaymentFailed;
                    tracing::warn!(phase = phase.as_str(), %reason, "payment declined");
                    return Err(CommerceError::PaymentDeclined(reason));
                }
            }
        } else {
            PaymentStatus::Pending
        };

        let order = Order::confirmed(owner_id.clone(), request, payment_status);
        ORDERS
            .insert(
                self.store.as_ref(),
                order.id.as_str(),
                owner_id.as_str(),
                &order,
            )
            .await?;

        phase = OrderPhase::Confirmed;
        tracing::info!(
            phase = phase.as_str(),
            order = %order.id,
            payment_status = order.payment_status.as_str(),
            "order placed"
        );
        Ok(order)
    }

    /// The owner's orders, newest first.
    pub async fn list_orders(&self, owner_id: &OwnerId) -> Result<Vec<Order>, CommerceError> {
        let mut orders: Vec<Order> = ORDERS
            .list_by_owner(self.store.as_ref(), owner_id.as_str())
            .await?
            .into_iter()
            .map(|v| v.into_inner())
            .collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    /// One order. Orders belonging to someone else are reported as absent.
    pub async fn get_order(
        &self,
        owner_id: &OwnerId,
        order_id: &OrderId,
    ) -> Result<Order, CommerceError> {
        let order = ORDERS
            .get(self.store.as_ref(), order_id.as_str())
            .await?
            .map(|v| v.into_inner())
            .filter(|o| &o.owner_id == owner_id);
        order.ok_or_else(|| CommerceError::NotFound(format!("order {order_id}")))
    }

    /// Move an order to a new fulfillment status.
    ///
    /// Only `confirmed -> processing -> shipped -> delivered` and cancelling
    /// a confirmed or processing order are allowed.
    #[instrument(skip(self), fields(owner = %owner_id, order = %order_id))]
    pub async fn advance_status(
        &self,
        owner_id: &OwnerId,
        order_id: &OrderId,
        target: OrderStatus,
    ) -> Result<Order, CommerceError> {
        let _guard = self
            .locks
            .acquire(&store_key!(ORDERS.name(), owner_id))
            .await;

        let current = ORDERS
            .get(self.store.as_ref(), order_id.as_str())
            .await?
            .filter(|v| &v.value.owner_id == owner_id)
            .ok_or_else(|| CommerceError::NotFound(format!("order {order_id}")))?;

        let mut order = current.value;
        if !order.status.can_transition_to(target) {
            return Err(CommerceError::InvalidInput(format!(
                "cannot move order from {} to {}",
                order.status, target
            )));
        }
        let from = order.status;
        order.status = target;

        ORDERS
            .replace(
                self.store.as_ref(),
                order_id.as_str(),
                current.version,
                &order,
            )
            .await?;
        tracing::info!(from = from.as_str(), to = target.as_str(), "order status changed");
        Ok(order)
    }

    /// Cancel a confirmed or processing order.
    pub async fn cancel(
        &self,
        owner_id: &OwnerId,
        order_id: &OrderId,
    ) -> Result<Order, CommerceError> {
        self.advance_status(owner_id, order_id, OrderStatus::Cancelled)
            .await
    }

    async fn charge(&self, charge: &PaymentCharge) -> PaymentOutcome {
        match tokio::time::timeout(self.payment_timeout, self.gateway.charge(charge)).await {
            Ok(outcome) => outcome,
            Err(_) => PaymentOutcome::Failed(format!(
                "payment gateway timed out after {}ms",
                self.payment_timeout.as_millis()
            )),
        }
    }
}
