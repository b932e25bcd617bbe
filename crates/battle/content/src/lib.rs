//! Data-driven battle content and its loaders.
//!
//! Jutsu and item catalogs are RON files, the ranked ladder configuration is
//! TOML. Default tables ship embedded in the crate; hosts may point a
//! [`ContentFactory`] at their own data directory instead.
//!
//! Content is consumed by the engine through [`battle_core::ActionCatalog`]
//! and [`battle_core::RankedConfig`] and never appears in battle state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, CatalogRecord, ContentFactory, LoadResult, RankedLoader};
