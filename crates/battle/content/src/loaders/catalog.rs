//! Jutsu and item catalog loader.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;

use battle_core::{CatalogSnapshot, CombatAction, ItemId, JutsuId};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::loaders::{LoadResult, read_file};

const EMBEDDED_JUTSU: &str = include_str!("../../data/jutsu.ron");
const EMBEDDED_ITEMS: &str = include_str!("../../data/items.ron");

/// One catalog entry as written in a RON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord<I> {
    pub id: I,
    pub action: CombatAction,
}

/// Loader for jutsu and item catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parses a RON list of catalog records.
    ///
    /// Rejects duplicate ids and effect templates the engine could not
    /// resolve, so a bad catalog fails at load time instead of mid-battle.
    pub fn parse<I>(content: &str, label: &str) -> LoadResult<BTreeMap<I, CombatAction>>
    where
        I: DeserializeOwned + Ord + Copy + Debug,
    {
        let records: Vec<CatalogRecord<I>> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {} catalog RON: {}", label, e))?;

        let mut catalog = BTreeMap::new();
        for record in records {
            for (index, template) in record.action.effects.iter().enumerate() {
                template.validate().map_err(|e| {
                    anyhow::anyhow!(
                        "{} {:?} ({}) effect #{} is invalid: {}",
                        label,
                        record.id,
                        record.action.name,
                        index,
                        e
                    )
                })?;
            }
            if catalog.insert(record.id, record.action).is_some() {
                anyhow::bail!("Duplicate {} id {:?}", label, record.id);
            }
        }

        tracing::debug!(label, entries = catalog.len(), "parsed catalog");
        Ok(catalog)
    }

    /// Load jutsu definitions from a RON file.
    pub fn load_jutsu(path: &Path) -> LoadResult<BTreeMap<JutsuId, CombatAction>> {
        let content = read_file(path)?;
        Self::parse(&content, "jutsu")
    }

    /// Load item definitions from a RON file.
    pub fn load_items(path: &Path) -> LoadResult<BTreeMap<ItemId, CombatAction>> {
        let content = read_file(path)?;
        Self::parse(&content, "item")
    }

    /// Combines both catalogs into the snapshot the engine reads.
    pub fn build(jutsu_path: &Path, items_path: &Path) -> LoadResult<CatalogSnapshot> {
        Ok(CatalogSnapshot {
            jutsu: Self::load_jutsu(jutsu_path)?,
            items: Self::load_items(items_path)?,
        })
    }

    /// Catalog compiled into the crate.
    pub fn embedded() -> LoadResult<CatalogSnapshot> {
        Ok(CatalogSnapshot {
            jutsu: Self::parse(EMBEDDED_JUTSU, "jutsu")?,
            items: Self::parse(EMBEDDED_ITEMS, "item")?,
        })
    }
}
