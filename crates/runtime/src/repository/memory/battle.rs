//! In-memory BattleRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use battle_core::{BattleId, BattleState};
use tracing::warn;

use crate::repository::{BattleRepository, RepositoryError, Result};

/// Stores battle snapshots keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryBattleRepo {
    battles: RwLock<HashMap<BattleId, BattleState>>,
}

impl InMemoryBattleRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_battle(state: BattleState) -> Self {
        let mut battles = HashMap::new();
        battles.insert(state.id, state);
        Self {
            battles: RwLock::new(battles),
        }
    }
}

impl BattleRepository for InMemoryBattleRepo {
    fn insert(&self, state: &BattleState) -> Result<()> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if battles.contains_key(&state.id) {
            return Err(RepositoryError::AlreadyExists { battle: state.id });
        }
        battles.insert(state.id, state.clone());
        Ok(())
    }

    fn load(&self, battle: BattleId) -> Result<Option<BattleState>> {
        let battles = self
            .battles
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(battles.get(&battle).cloned())
    }

    fn save_if_version(&self, state: &BattleState, expected: u64) -> Result<()> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let stored = battles
            .get_mut(&state.id)
            .ok_or(RepositoryError::NotFound { battle: state.id })?;
        if stored.version != expected {
            warn!(
                battle = %state.id,
                expected,
                found = stored.version,
                "rejected stale battle write"
            );
            return Err(RepositoryError::ConcurrencyConflict {
                battle: state.id,
                expected,
                found: stored.version,
            });
        }
        *stored = state.clone();
        Ok(())
    }

    fn delete(&self, battle: BattleId) -> Result<()> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        battles.remove(&battle);
        Ok(())
    }
}
