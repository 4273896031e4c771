//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use folio_commerce::catalog::{BookSnapshot, StaticCatalog};
use folio_commerce::checkout::SimulatedGateway;
use folio_commerce::sync::SessionState;
use folio_commerce::{OwnerId, Storefront};
use folio_store::MemoryStore;
use serde::Deserialize;

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, in lookup order.
const CONFIG_NAMES: [&str; 3] = ["folio.toml", ".folio.toml", "folio.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Directory relative paths in the config resolve against.
    pub root: PathBuf,
    /// Config file in use, if any.
    pub config_file: Option<PathBuf>,
    owner: Option<String>,
}

/// A storefront opened over the state file.
pub struct Shop {
    pub storefront: Storefront,
    store: Arc<MemoryStore>,
    state_file: PathBuf,
}

impl Shop {
    /// Persist every document back to the state file.
    pub async fn save(&self) -> Result<()> {
        self.store
            .save(&self.state_file)
            .await
            .with_context(|| format!("Failed to write state file: {}", self.state_file.display()))
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    books: Vec<BookSnapshot>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, owner: Option<String>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_file) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        let root = config_file
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());

        Ok(Self {
            config,
            output,
            cwd,
            root,
            config_file,
            owner,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// The shopper commands act as.
    pub fn owner(&self) -> Result<OwnerId> {
        match self.owner.as_ref().or(self.config.store.owner.as_ref()) {
            Some(owner) if !owner.trim().is_empty() => Ok(OwnerId::new(owner.trim())),
            _ => bail!("No shopper given. Pass --owner or set store.owner in folio.toml."),
        }
    }

    /// Resolve a path relative to the config root.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        }
    }

    /// Read the catalog file. A missing file is an empty catalog.
    pub fn load_catalog(&self) -> Result<StaticCatalog> {
        let path = self.resolve_path(&self.config.store.catalog_file);
        if !path.exists() {
            self.output
                .debug(&format!("No catalog at {}, starting empty", path.display()));
            return Ok(StaticCatalog::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let file: CatalogFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
        self.output
            .debug(&format!("Loaded {} books from {}", file.books.len(), path.display()));
        Ok(StaticCatalog::new(file.books))
    }

    /// Open the storefront over the state file.
    pub fn open(&self) -> Result<Shop> {
        let state_file = self.resolve_path(&self.config.store.state_file);
        let store = Arc::new(
            MemoryStore::load(&state_file)
                .with_context(|| format!("Failed to load state file: {}", state_file.display()))?,
        );
        let catalog = Arc::new(self.load_catalog()?);
        let commerce = self.config.commerce.clone();
        let gateway = Arc::new(SimulatedGateway::from_config(&commerce.payment));
        let storefront = Storefront::new(store.clone(), catalog, gateway, commerce);
        tracing::debug!(state = %state_file.display(), "storefront opened");

        Ok(Shop {
            storefront,
            store,
            state_file,
        })
    }

    /// Read the signed-out cache. A missing file is an empty cache.
    pub fn load_cache(&self) -> Result<SessionState> {
        let path = self.resolve_path(&self.config.store.cache_file);
        if !path.exists() {
            return Ok(SessionState::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache: {}", path.display()))
    }

    /// Overwrite the signed-out cache.
    pub fn save_cache(&self, state: &SessionState) -> Result<()> {
        let path = self.resolve_path(&self.config.store.cache_file);
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write cache: {}", path.display()))
    }
}
