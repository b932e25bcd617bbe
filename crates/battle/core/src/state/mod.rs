//! Authoritative battle state representation.
//!
//! A [`BattleState`] is the arena for one fight: combatants, the effects
//! attached to them and the effects bound to tiles. Effects reference users
//! by [`UserId`] only, so the whole structure is a plain tree that can be
//! cloned, serialized and compared.
mod common;
mod user;

pub use common::{BattleId, BloodlineId, GridSize, ItemId, JutsuId, Position, UserId, VillageId};
pub use user::{
    BattleUserState, Element, GeneralType, LoadoutEntry, Modifier, Pool, PoolKind, Pools,
    StatBlock, StatModifiers, StatType, UserFlags, UserRank,
};

use crate::config::BattleConfig;
use crate::effect::{EffectId, GroundEffect, UserEffect};

/// Kind of fight, used by callers to pick reward and ladder flows.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BattleType {
    Arena,
    Combat,
    ShrineWar,
    Ranked,
    Spar,
    Tournament,
}

/// Canonical snapshot of one battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    pub id: BattleId,
    pub battle_type: BattleType,
    pub background: String,
    pub grid: GridSize,

    /// Seed for every chance roll in this battle.
    ///
    /// Set once when the battle is created. Combined with the round and the
    /// effect id so that re-resolving the same round gives the same result.
    pub seed: u64,

    /// Round counter, incremented once per resolved action.
    pub round: u32,

    /// Optimistic-concurrency token, incremented together with `round`.
    pub version: u64,

    /// Sequential effect id allocator. Ids are never reused within a battle.
    next_effect_id: u32,

    pub users: Vec<BattleUserState>,
    pub user_effects: Vec<UserEffect>,
    pub ground_effects: Vec<GroundEffect>,
}

impl BattleState {
    pub fn new(id: BattleId, battle_type: BattleType, seed: u64) -> Self {
        let config = BattleConfig::default();
        Self {
            id,
            battle_type,
            background: String::new(),
            grid: GridSize::new(config.default_cols, config.default_rows),
            seed,
            round: 1,
            version: 0,
            next_effect_id: 1,
            users: Vec::new(),
            user_effects: Vec::new(),
            ground_effects: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: BattleUserState) -> Self {
        self.users.push(user);
        self
    }

    /// Allocates a fresh effect id.
    pub fn allocate_effect_id(&mut self) -> EffectId {
        let id = EffectId(self.next_effect_id);
        self.next_effect_id = self.next_effect_id.wrapping_add(1);
        id
    }

    /// Id for a combatant spawned mid-battle: one above the highest in use.
    pub fn next_user_id(&self) -> UserId {
        let highest = self.users.iter().map(|user| user.user_id.0).max();
        UserId(highest.map_or(1, |id| id.saturating_add(1)))
    }

    pub fn user(&self, id: UserId) -> Option<&BattleUserState> {
        self.users.iter().find(|user| user.user_id == id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut BattleUserState> {
        self.users.iter_mut().find(|user| user.user_id == id)
    }

    /// Combatant standing on `position`, ignoring those who left or died.
    pub fn occupant(&self, position: Position) -> Option<&BattleUserState> {
        self.users
            .iter()
            .find(|user| user.is_active() && user.position == position)
    }

    pub fn effects_on(&self, id: UserId) -> impl Iterator<Item = &UserEffect> {
        self.user_effects
            .iter()
            .filter(move |effect| effect.target == id)
    }

    pub fn barrier_at(&self, position: Position) -> Option<&GroundEffect> {
        self.ground_effects
            .iter()
            .find(|effect| effect.position == position && effect.is_barrier())
    }

    /// Tile has neither a combatant nor a barrier on it.
    pub fn is_empty_tile(&self, position: Position) -> bool {
        self.grid.contains(position)
            && self.occupant(position).is_none()
            && self.barrier_at(position).is_none()
    }

    /// The battle is over once every remaining combatant is allied with the
    /// first one, or nobody is left.
    pub fn is_finished(&self) -> bool {
        let mut active = self.users.iter().filter(|user| user.is_active());
        match active.next() {
            None => true,
            Some(first) => active.all(|other| other.is_allied_with(first)),
        }
    }

    pub fn survivors(&self) -> impl Iterator<Item = &BattleUserState> {
        self.users.iter().filter(|user| user.is_active())
    }

    /// SHA-256 over the bincode encoding of this state.
    ///
    /// Used by hosts to recognise a retried submission against a round that
    /// was already persisted.
    #[cfg(feature = "serde")]
    pub fn digest(&self) -> Result<[u8; 32], bincode::Error> {
        use sha2::{Digest, Sha256};

        let bytes = bincode::serialize(self)?;
        Ok(Sha256::digest(&bytes).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duel() -> BattleState {
        let mut a = BattleUserState::new(UserId(1), "alice");
        a.position = Position::new(2, 2);
        let mut b = BattleUserState::new(UserId(2), "bob");
        b.position = Position::new(3, 2);
        BattleState::new(BattleId(9), BattleType::Combat, 42)
            .with_user(a)
            .with_user(b)
    }

    #[test]
    fn effect_ids_are_sequential() {
        let mut state = duel();
        assert_eq!(state.allocate_effect_id(), EffectId(1));
        assert_eq!(state.allocate_effect_id(), EffectId(2));
    }

    #[test]
    fn battle_finishes_when_one_side_remains() {
        let mut state = duel();
        assert!(!state.is_finished());

        if let Some(bob) = state.user_mut(UserId(2)) {
            bob.pools.health.current = 0.0;
        }
        assert!(state.is_finished());
        let survivors: Vec<_> = state.survivors().map(|u| u.user_id).collect();
        assert_eq!(survivors, vec![UserId(1)]);
    }

    #[test]
    fn fled_users_free_their_tile() {
        let mut state = duel();
        assert!(!state.is_empty_tile(Position::new(3, 2)));
        if let Some(bob) = state.user_mut(UserId(2)) {
            bob.flags.insert(UserFlags::FLED_BATTLE);
        }
        assert!(state.is_empty_tile(Position::new(3, 2)));
        assert!(!state.is_empty_tile(Position::new(13, 0)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn digest_is_stable_for_equal_states() {
        let a = duel();
        let b = duel();
        let da = a.digest().expect("digest");
        let db = b.digest().expect("digest");
        assert_eq!(hex::encode(da), hex::encode(db));
    }
}
