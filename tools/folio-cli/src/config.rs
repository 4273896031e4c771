//! CLI configuration.

use anyhow::{Context, Result};
use folio_commerce::config::CommerceConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
///
/// The `[pricing]` and `[payment]` tables are the storefront's own config;
/// `[store]` says where the CLI keeps its files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Local file locations.
    #[serde(default)]
    pub store: StoreConfig,

    /// Storefront pricing and payment settings.
    #[serde(flatten)]
    pub commerce: CommerceConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: CliConfig = if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))?
        };

        config
            .commerce
            .validate()
            .with_context(|| format!("Invalid config: {}", path))?;
        Ok(config)
    }
}

/// Where state, catalog and the anonymous cache live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON snapshot of every stored document.
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// TOML file with `[[books]]` entries.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// JSON file holding the signed-out cart and wishlist.
    #[serde(default = "default_cache_file")]
    pub cache_file: String,

    /// Shopper to act as when `--owner` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

fn default_state_file() -> String {
    "folio-state.json".to_string()
}

fn default_catalog_file() -> String {
    "books.toml".to_string()
}

fn default_cache_file() -> String {
    "folio-cache.json".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            catalog_file: default_catalog_file(),
            cache_file: default_cache_file(),
            owner: None,
        }
    }
}

/// Generate a default folio.toml config file.
pub fn generate_default_config(owner: Option<&str>) -> String {
    let owner_line = match owner {
        Some(owner) => format!("owner = \"{}\"\n", owner),
        None => "# owner = \"shopper-1\"\n".to_string(),
    };

    format!(
        r#"[store]
state_file = "folio-state.json"
catalog_file = "books.toml"
cache_file = "folio-cache.json"
{owner_line}
{commerce}"#,
        commerce = folio_commerce::config::generate_default_config()
    )
}

/// Sample catalog written by `folio config init`.
pub fn generate_sample_catalog() -> String {
    r#"# Prices are in paise.

[[books]]
book_id = "dune"
title = "Dune"
author = "Frank Herbert"
price = 39900

[[books]]
book_id = "emma"
title = "Emma"
author = "Jane Austen"
price = 24900

[[books]]
book_id = "beloved"
title = "Beloved"
author = "Toni Morrison"
price = 45000
"#
    .to_string()
}
