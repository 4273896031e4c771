//! Storefront configuration.
//!
//! Loaded from TOML or JSON. Every field has a default, so an empty file (or
//! no file) yields the storefront's standard pricing and payment behavior.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the file.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to parse JSON.
    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid config value for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// Checkout pricing rules.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Payment simulation.
    #[serde(default)]
    pub payment: PaymentConfig,
}

impl CommerceConfig {
    /// Load config from a file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: CommerceConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing.validate()?;
        self.payment.validate()
    }
}

/// Shipping, tax and cash-on-delivery pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Orders with a subtotal strictly above this ship free.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Money,

    /// Flat shipping fee below the threshold.
    #[serde(default = "default_shipping_fee")]
    pub shipping_fee: Money,

    /// Tax as a whole percentage of the subtotal.
    #[serde(default = "default_tax_rate_percent")]
    pub tax_rate_percent: u32,

    /// Surcharge for cash on delivery.
    #[serde(default = "default_cod_charge")]
    pub cod_charge: Money,
}

fn default_free_shipping_threshold() -> Money {
    Money::from_major(500)
}

fn default_shipping_fee() -> Money {
    Money::from_major(50)
}

fn default_tax_rate_percent() -> u32 {
    18
}

fn default_cod_charge() -> Money {
    Money::from_major(25)
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: default_free_shipping_threshold(),
            shipping_fee: default_shipping_fee(),
            tax_rate_percent: default_tax_rate_percent(),
            cod_charge: default_cod_charge(),
        }
    }
}

impl PricingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("pricing.free_shipping_threshold", self.free_shipping_threshold),
            ("pricing.shipping_fee", self.shipping_fee),
            ("pricing.cod_charge", self.cod_charge),
        ] {
            if value.is_negative() {
                return Err(ConfigError::InvalidInput {
                    field,
                    reason: format!("must not be negative, got {}", value.amount_minor),
                });
            }
        }
        if self.tax_rate_percent > 100 {
            return Err(ConfigError::InvalidInput {
                field: "pricing.tax_rate_percent",
                reason: format!("must be at most 100, got {}", self.tax_rate_percent),
            });
        }
        Ok(())
    }
}

/// Simulated payment gateway behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Probability in `[0, 1]` that a prepaid charge succeeds.
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,

    /// Artificial processing delay.
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,

    /// Upper bound on a gateway call; exceeding it fails the payment.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_success_rate() -> f64 {
    0.85
}

fn default_processing_delay_ms() -> u64 {
    2000
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            success_rate: default_success_rate(),
            processing_delay_ms: default_processing_delay_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PaymentConfig {
    /// Processing delay as a duration.
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    /// Gateway timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(ConfigError::InvalidInput {
                field: "payment.success_rate",
                reason: format!("must be within [0, 1], got {}", self.success_rate),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidInput {
                field: "payment.timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Generate a default folio.toml config file.
pub fn generate_default_config() -> String {
    r#"# Folio storefront configuration
# Amounts are in paise (1/100 rupee).

[pricing]
free_shipping_threshold = 50000
shipping_fee = 5000
tax_rate_percent = 18
cod_charge = 2500

[payment]
success_rate = 0.85
processing_delay_ms = 2000
timeout_ms = 5000
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CommerceConfig = toml::from_str("").unwrap();
        assert_eq!(config, CommerceConfig::default());
        assert_eq!(config.pricing.shipping_fee, Money::from_major(50));
        assert_eq!(config.payment.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_generated_config_matches_defaults() {
        let config: CommerceConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, CommerceConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config: CommerceConfig = toml::from_str(
            r#"
            [payment]
            success_rate = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.payment.success_rate, 1.0);
        assert_eq!(config.payment.timeout_ms, 5000);
        assert_eq!(config.pricing, PricingConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CommerceConfig::default();
        config.payment.success_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = CommerceConfig::default();
        config.pricing.tax_rate_percent = 101;
        assert!(config.validate().is_err());

        let mut config = CommerceConfig::default();
        config.payment.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_is_invalid_input() {
        let mut config = CommerceConfig::default();
        config.pricing.shipping_fee = Money::new(-1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInput {
                field: "pricing.shipping_fee",
                ..
            })
        ));
    }
}
