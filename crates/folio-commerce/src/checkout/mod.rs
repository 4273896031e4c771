//! Checkout module.
//!
//! Quotes charges, simulates payment, persists orders, and ties them to the
//! cart and address book.

mod flow;
mod order;
mod payment;
mod pipeline;
mod quote;

pub use flow::{Checkout, CheckoutPreview};
pub use order::{
    Order, OrderItem, OrderRequest, OrderStatus, PaymentMethod, PaymentStatus,
};
pub use payment::{
    PaymentCharge, PaymentGateway, PaymentOutcome, ScriptedBehavior, ScriptedGateway,
    SimulatedGateway,
};
pub use pipeline::{OrderPhase, OrderPipeline, ORDERS};
pub use quote::CheckoutQuote;
