//! Simulated payment gateway.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::checkout::PaymentMethod;
use crate::config::PaymentConfig;
use crate::ids::OwnerId;
use crate::money::Money;

/// A prepaid charge sent to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCharge {
    pub owner_id: OwnerId,
    pub method: PaymentMethod,
    pub amount: Money,
}

/// Gateway verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Completed,
    Failed(String),
}

/// A payment gateway.
///
/// Must return exactly one outcome. Callers bound the wait with a timeout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, charge: &PaymentCharge) -> PaymentOutcome;
}

/// Approves a configurable share of charges after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    success_rate: f64,
    delay: Duration,
}

impl SimulatedGateway {
    /// Create a gateway.
    pub fn new(success_rate: f64, delay: Duration) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            delay,
        }
    }

    /// Create a gateway from configuration.
    pub fn from_config(config: &PaymentConfig) -> Self {
        Self::new(config.success_rate, config.processing_delay())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, charge: &PaymentCharge) -> PaymentOutcome {
        let approved = rand::thread_rng().gen_bool(self.success_rate);
        tokio::time::sleep(self.delay).await;

        if approved {
            PaymentOutcome::Completed
        } else {
            PaymentOutcome::Failed(format!("{} payment of {} declined", charge.method, charge.amount))
        }
    }
}

/// What a [`ScriptedGateway`] does once its queue is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedBehavior {
    Approve,
    Decline,
    /// Never answer.
    Hang,
}

/// Deterministic gateway for tests and demos.
///
/// Plays queued outcomes in order, then falls back to a fixed behavior.
#[derive(Debug)]
pub struct ScriptedGateway {
    queue: Mutex<VecDeque<PaymentOutcome>>,
    fallback: ScriptedBehavior,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    /// Create a gateway with an empty queue.
    pub fn new(fallback: ScriptedBehavior) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always approve.
    pub fn approving() -> Self {
        Self::new(ScriptedBehavior::Approve)
    }

    /// Always decline.
    pub fn declining() -> Self {
        Self::new(ScriptedBehavior::Decline)
    }

    /// Never respond.
    pub fn hanging() -> Self {
        Self::new(ScriptedBehavior::Hang)
    }

    /// Queue outcomes to return before the fallback.
    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = PaymentOutcome>) -> Self {
        if let Ok(mut queue) = self.queue.lock() {
            queue.extend(outcomes);
        }
        self
    }

    /// Number of charges received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn charge(&self, _charge: &PaymentCharge) -> PaymentOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let queued = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        if let Some(outcome) = queued {
            return outcome;
        }

        match self.fallback {
            ScriptedBehavior::Approve => PaymentOutcome::Completed,
            ScriptedBehavior::Decline => PaymentOutcome::Failed("scripted decline".to_string()),
            ScriptedBehavior::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge() -> PaymentCharge {
        PaymentCharge {
            owner_id: OwnerId::new("u1"),
            method: PaymentMethod::Card,
            amount: Money::from_major(100),
        }
    }

    #[tokio::test]
    async fn test_simulated_extremes() {
        let always = SimulatedGateway::new(1.0, Duration::ZERO);
        assert_eq!(always.charge(&charge()).await, PaymentOutcome::Completed);

        let never = SimulatedGateway::new(0.0, Duration::ZERO);
        assert!(matches!(never.charge(&charge()).await, PaymentOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_scripted_queue_then_fallback() {
        let gateway = ScriptedGateway::approving()
            .with_outcomes([PaymentOutcome::Failed("first".into())]);

        assert_eq!(
            gateway.charge(&charge()).await,
            PaymentOutcome::Failed("first".into())
        );
        assert_eq!(gateway.charge(&charge()).await, PaymentOutcome::Completed);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_hanging_gateway_never_answers() {
        let gateway = ScriptedGateway::hanging();
        let result =
            tokio::time::timeout(Duration::from_millis(20), gateway.charge(&charge())).await;
        assert!(result.is_err());
    }
}
