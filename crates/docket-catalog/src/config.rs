//! Catalog configuration.

use serde::{Deserialize, Serialize};

use crate::page::DEFAULT_PAGE_SIZE;

/// Tunables for a [`Catalog`](crate::Catalog).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Page size applied when a request asks for a size `<= 0`.
    pub default_page_size: u64,
    /// Counter value written by `init` when no explicit value is given.
    pub initial_count: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            initial_count: 0,
        }
    }
}
