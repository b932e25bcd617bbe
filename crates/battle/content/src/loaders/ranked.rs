//! Ranked ladder configuration loader.

use std::path::Path;

use battle_core::RankedConfig;

use crate::loaders::{LoadResult, read_file};

const EMBEDDED_RANKED: &str = include_str!("../../data/ranked.toml");

/// Loader for [`RankedConfig`] from TOML files.
pub struct RankedLoader;

impl RankedLoader {
    /// Parses and validates a ranked configuration. Missing keys fall back to
    /// the defaults.
    pub fn parse(content: &str) -> LoadResult<RankedConfig> {
        let config: RankedConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ranked TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid ranked config: {}", e))?;
        Ok(config)
    }

    pub fn load(path: &Path) -> LoadResult<RankedConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn embedded() -> LoadResult<RankedConfig> {
        Self::parse(EMBEDDED_RANKED)
    }
}
