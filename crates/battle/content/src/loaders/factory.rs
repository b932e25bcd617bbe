//! Content factory for building catalogs and ladder config from data files.

use std::path::{Path, PathBuf};

use battle_core::{CatalogSnapshot, RankedConfig};

use crate::loaders::{CatalogLoader, LoadResult, RankedLoader};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── jutsu.ron
/// ├── items.ron
/// └── ranked.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load jutsu and items from `jutsu.ron` and `items.ron`.
    pub fn load_catalog(&self) -> LoadResult<CatalogSnapshot> {
        CatalogLoader::build(
            &self.data_dir.join("jutsu.ron"),
            &self.data_dir.join("items.ron"),
        )
    }

    /// Load the ladder configuration from `ranked.toml`.
    pub fn load_ranked(&self) -> LoadResult<RankedConfig> {
        RankedLoader::load(&self.data_dir.join("ranked.toml"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_reads_the_shipped_data_dir() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let catalog = factory.load_catalog().unwrap();
        assert_eq!(catalog, CatalogLoader::embedded().unwrap());
        assert_eq!(factory.load_ranked().unwrap(), RankedConfig::default());
    }

    #[test]
    fn missing_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        let err = factory.load_catalog().unwrap_err();
        assert!(err.to_string().contains("jutsu.ron"));
    }
}
