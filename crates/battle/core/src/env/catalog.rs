//! Read-only jutsu and item definitions.

use std::collections::BTreeMap;

use crate::action::CombatAction;
use crate::state::{ItemId, JutsuId};

/// Oracle providing jutsu and item definitions.
///
/// Definitions are configuration data supplied by the host; the engine never
/// mutates them.
pub trait ActionCatalog: Send + Sync {
    fn jutsu(&self, id: JutsuId) -> Option<&CombatAction>;

    fn item(&self, id: ItemId) -> Option<&CombatAction>;
}

/// In-memory catalog, typically built by a content loader.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogSnapshot {
    pub jutsu: BTreeMap<JutsuId, CombatAction>,
    pub items: BTreeMap<ItemId, CombatAction>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jutsu(mut self, id: JutsuId, action: CombatAction) -> Self {
        self.jutsu.insert(id, action);
        self
    }

    pub fn with_item(mut self, id: ItemId, action: CombatAction) -> Self {
        self.items.insert(id, action);
        self
    }
}

impl ActionCatalog for CatalogSnapshot {
    fn jutsu(&self, id: JutsuId) -> Option<&CombatAction> {
        self.jutsu.get(&id)
    }

    fn item(&self, id: ItemId) -> Option<&CombatAction> {
        self.items.get(&id)
    }
}
