//! Per-pass accumulation of numeric outcomes, committed atomically.
//!
//! Effect handlers never touch [`BattleUserState`] directly. They record
//! damage and heal amounts in ledgers and per-target deltas in
//! [`Consequence`] entries; [`ConsequenceMap::commit`] then writes everything
//! into the state in one step. Keeping the two phases apart is what lets the
//! engine order "damage, then death flags, then lifesteal" explicitly.

use std::collections::BTreeMap;

use crate::effect::EffectId;
use crate::state::{
    BattleState, BattleUserState, ItemId, JutsuId, PoolKind, Position, UserFlags, UserId,
};

/// Signed amounts per resource pool.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PoolDelta {
    pub health: f64,
    pub chakra: f64,
    pub stamina: f64,
}

impl PoolDelta {
    pub fn add(&mut self, pool: PoolKind, amount: f64) {
        match pool {
            PoolKind::Health => self.health += amount,
            PoolKind::Chakra => self.chakra += amount,
            PoolKind::Stamina => self.stamina += amount,
        }
    }

    pub fn total(&self) -> f64 {
        self.health + self.chakra + self.stamina
    }
}

/// Loadout slot consumed by the action of this pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadoutUse {
    Jutsu(JutsuId),
    Item(ItemId),
}

/// Pending deltas for one target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Consequence {
    /// Damage not tied to a ledger entry (one-hit kills, reflected damage).
    pub extra_damage: f64,
    pub absorb: PoolDelta,
    /// Action costs paid by the actor.
    pub cost: PoolDelta,
    pub money: f64,
    pub moved_to: Option<Position>,
    pub died: bool,
    pub fled: bool,
    pub used: Option<LoadoutUse>,
}

/// Damage dealt by one effect to one target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageRecord {
    pub effect: EffectId,
    /// Index of the effect in the pass's working list.
    pub slot: usize,
    pub source: UserId,
    pub target: UserId,
    pub amount: f64,
}

/// Healing granted by one effect to one target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealRecord {
    pub effect: EffectId,
    pub slot: usize,
    pub source: UserId,
    pub target: UserId,
    pub amount: f64,
}

/// Clone requested by a ground effect, created on commit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spawn {
    pub creator: UserId,
    pub position: Position,
    /// Share of pools and stats both halves keep.
    pub ratio: f64,
}

/// Net result of a commit for one combatant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Applied {
    pub user: UserId,
    pub damage: f64,
    pub heal: f64,
    pub absorbed: f64,
    pub died: bool,
}

/// Scratch structure for one resolution pass. Never persisted.
#[derive(Clone, Debug, Default)]
pub struct ConsequenceMap {
    entries: BTreeMap<UserId, Consequence>,
    damage: Vec<DamageRecord>,
    heals: Vec<HealRecord>,
    spawns: Vec<Spawn>,
}

impl ConsequenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, user: UserId) -> &mut Consequence {
        self.entries.entry(user).or_default()
    }

    pub fn get(&self, user: UserId) -> Option<&Consequence> {
        self.entries.get(&user)
    }

    pub fn record_damage(&mut self, record: DamageRecord) {
        self.damage.push(record);
    }

    pub fn damage_records(&self) -> &[DamageRecord] {
        &self.damage
    }

    pub fn damage_records_mut(&mut self) -> &mut [DamageRecord] {
        &mut self.damage
    }

    pub fn record_heal(&mut self, record: HealRecord) {
        self.heals.push(record);
    }

    pub fn heal_records_mut(&mut self) -> &mut [HealRecord] {
        &mut self.heals
    }

    pub fn record_spawn(&mut self, spawn: Spawn) {
        self.spawns.push(spawn);
    }

    pub fn is_dead(&self, user: UserId) -> bool {
        self.entries.get(&user).is_some_and(|c| c.died)
    }

    /// Total damage `user` takes this pass.
    pub fn damage_taken(&self, user: UserId) -> f64 {
        let ledger: f64 = self
            .damage
            .iter()
            .filter(|r| r.target == user)
            .map(|r| r.amount.max(0.0))
            .sum();
        ledger + self.entries.get(&user).map_or(0.0, |c| c.extra_damage)
    }

    pub fn heal_received(&self, user: UserId) -> f64 {
        self.heals
            .iter()
            .filter(|r| r.target == user)
            .map(|r| r.amount.max(0.0))
            .sum()
    }

    /// Health `user` would have if the pass ended now, before healing.
    pub fn projected_health(&self, user: &BattleUserState) -> f64 {
        let (cost, absorb) = self
            .entries
            .get(&user.user_id)
            .map_or((0.0, 0.0), |c| (c.cost.health, c.absorb.health));
        user.pools.health.current - self.damage_taken(user.user_id) - cost + absorb
    }

    /// Writes every pending delta into `state`.
    ///
    /// Pools are clamped to `[0, max]` and dead combatants end at zero health.
    /// Clones are created last, once moves have freed or taken their tiles.
    pub fn commit(self, state: &mut BattleState) -> Vec<Applied> {
        let untouched = Consequence::default();
        let mut applied = Vec::new();
        for index in 0..state.users.len() {
            let user_id = state.users[index].user_id;
            let damage = self.damage_taken(user_id);
            let consequence = match self.entries.get(&user_id) {
                Some(consequence) => consequence,
                None if damage > 0.0 || self.heal_received(user_id) > 0.0 => &untouched,
                None => continue,
            };
            let heal = if consequence.died {
                0.0
            } else {
                self.heal_received(user_id)
            };
            let destination = consequence
                .moved_to
                .filter(|tile| state.is_empty_tile(*tile));

            let user = &mut state.users[index];
            if consequence.died {
                user.pools.health.current = 0.0;
            } else {
                user.pools.health.apply(
                    heal + consequence.absorb.health - damage - consequence.cost.health,
                );
            }
            user.pools
                .chakra
                .apply(consequence.absorb.chakra - consequence.cost.chakra);
            user.pools
                .stamina
                .apply(consequence.absorb.stamina - consequence.cost.stamina);
            user.money = (user.money + consequence.money).max(0.0);
            if consequence.fled {
                user.flags.insert(UserFlags::FLED_BATTLE);
            }
            if let Some(tile) = destination {
                user.position = tile;
            }
            match consequence.used {
                Some(LoadoutUse::Jutsu(id)) => {
                    if let Some(entry) = user.jutsus.iter_mut().find(|e| e.id == id) {
                        entry.last_used_round = Some(state.round);
                    }
                }
                Some(LoadoutUse::Item(id)) => {
                    if let Some(entry) = user.items.iter_mut().find(|e| e.id == id) {
                        entry.last_used_round = Some(state.round);
                        entry.quantity = entry.quantity.map(|q| q.saturating_sub(1));
                    }
                }
                None => {}
            }

            applied.push(Applied {
                user: user_id,
                damage,
                heal,
                absorbed: consequence.absorb.total(),
                died: consequence.died,
            });
        }

        for spawn in &self.spawns {
            let Some(index) = state.users.iter().position(|u| u.user_id == spawn.creator) else {
                continue;
            };
            if !state.users[index].is_active() || !state.is_empty_tile(spawn.position) {
                continue;
            }
            let id = state.next_user_id();
            let creator = &mut state.users[index];
            creator.scale(spawn.ratio);
            let copy = creator.spawn_clone(id, spawn.position);
            state.users.push(copy);
        }
        applied
    }
}
