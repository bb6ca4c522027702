use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use docket_catalog::CatalogConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Settings read from the optional TOML file.
///
/// ```toml
/// store_path = "ledger.json"
///
/// [catalog]
/// default_page_size = 15
/// initial_count = 0
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store_path: PathBuf,
    pub catalog: CatalogConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("docket.json"),
            catalog: CatalogConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config file (if any) with command-line overrides applied.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(store) = &cli.store {
            config.store_path = store.clone();
        }
        Ok(config)
    }
}
