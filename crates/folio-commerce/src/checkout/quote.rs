//! Checkout charge computation.

use serde::{Deserialize, Serialize};

use crate::checkout::PaymentMethod;
use crate::config::PricingConfig;
use crate::error::CommerceError;
use crate::money::Money;

/// The amounts a shopper will be charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutQuote {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub cod_charges: Money,
    /// `subtotal + shipping + tax + cod_charges`.
    pub total: Money,
}

impl CheckoutQuote {
    /// Quote a cart subtotal for a payment method.
    ///
    /// Shipping is free strictly above the threshold. Tax is a percentage of
    /// the subtotal rounded to the nearest whole rupee.
    pub fn compute(
        pricing: &PricingConfig,
        subtotal: Money,
        method: PaymentMethod,
    ) -> Result<Self, CommerceError> {
        if subtotal.is_negative() {
            return Err(CommerceError::InvalidInput(
                "subtotal must not be negative".to_string(),
            ));
        }

        let shipping = if subtotal > pricing.free_shipping_threshold {
            Money::zero()
        } else {
            pricing.shipping_fee
        };
        let tax = subtotal
            .percentage_whole(pricing.tax_rate_percent)
            .ok_or(CommerceError::Overflow)?;
        let cod_charges = if method == PaymentMethod::Cod {
            pricing.cod_charge
        } else {
            Money::zero()
        };
        let total = Money::try_sum([subtotal, shipping, tax, cod_charges])
            .ok_or(CommerceError::Overflow)?;

        Ok(Self {
            subtotal,
            shipping,
            tax,
            cod_charges,
            total,
        })
    }
}
