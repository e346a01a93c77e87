//! Optional YAML configuration for one dashboard run.
//!
//! Everything has a built-in default; a config file only overrides.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::ingest::{AliasTable, Role};

fn default_top_products() -> usize {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dashboard")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Extra header spellings per logical column, layered over the built-ins.
    /// Keys are the canonical column names (`date`, `category`, ...).
    #[serde(default)]
    pub columns: HashMap<String, Vec<String>>,

    /// How many rows the top-products view keeps.
    #[serde(default = "default_top_products")]
    pub top_products: usize,

    /// Where charts, page and series export land.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: HashMap::new(),
            top_products: default_top_products(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if config.top_products == 0 {
            bail!("top_products must be at least 1");
        }
        debug!(?config, "loaded config");
        Ok(config)
    }

    /// Built-in aliases plus the config's extra spellings.
    pub fn alias_table(&self) -> Result<AliasTable> {
        let mut aliases = AliasTable::builtin();
        for (name, headers) in &self.columns {
            let Some(role) = Role::from_name(name) else {
                bail!("unknown column '{name}' in config (expected one of date, category, product, quantity, amount)");
            };
            for header in headers {
                aliases.insert(role, header);
            }
        }
        Ok(aliases)
    }
}
