//! Book catalog module.
//!
//! The catalog is an external, read-only collaborator. The core only sees it
//! through [`CatalogProvider`].

mod book;
mod provider;

pub use book::{BookSnapshot, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
pub use provider::{CatalogError, CatalogProvider, StaticCatalog};
