//! Read-only collaborators of the engine.
//!
//! The catalog exposes jutsu and item definitions, the RNG oracle provides
//! deterministic chance rolls and [`BattleConfig`] carries tunables. The
//! [`BattleEnv`] aggregate bundles them so the engine and the action filter
//! can reach everything without coupling to concrete implementations.
mod catalog;
mod rng;

pub use catalog::{ActionCatalog, CatalogSnapshot};
pub use rng::{PcgRng, RngOracle, compute_seed};

use crate::config::BattleConfig;

/// Aggregates the read-only oracles needed by resolution.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    catalog: &'a dyn ActionCatalog,
    rng: &'a dyn RngOracle,
    config: &'a BattleConfig,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        catalog: &'a dyn ActionCatalog,
        rng: &'a dyn RngOracle,
        config: &'a BattleConfig,
    ) -> Self {
        Self {
            catalog,
            rng,
            config,
        }
    }

    pub fn catalog(&self) -> &'a dyn ActionCatalog {
        self.catalog
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }

    pub fn config(&self) -> &'a BattleConfig {
        self.config
    }
}

impl core::fmt::Debug for BattleEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BattleEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
