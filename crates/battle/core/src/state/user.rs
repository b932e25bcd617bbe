//! Combatant snapshot owned by a [`BattleState`](super::BattleState).

use bitflags::bitflags;

use super::{BloodlineId, ItemId, JutsuId, Position, UserId, VillageId};

/// Offensive/defensive stat families.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatType {
    Ninjutsu,
    Genjutsu,
    Taijutsu,
    Bukijutsu,
}

impl StatType {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// General attributes that every combatant carries.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GeneralType {
    Strength,
    Speed,
    Intelligence,
    Willpower,
}

impl GeneralType {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Elemental affinity of an effect. Only used to match adjusters against
/// the effects they modify.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    Fire,
    Water,
    Wind,
    Earth,
    Lightning,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PoolKind {
    Health,
    Chakra,
    Stamina,
}

/// Ninja rank gating jutsu access. Ordered from lowest to highest.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UserRank {
    #[default]
    Student,
    Genin,
    Chunin,
    Jonin,
    Commander,
    Elder,
}

bitflags! {
    /// Lifecycle markers of a combatant inside one battle.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UserFlags: u8 {
        const IS_AI        = 1 << 0;
        const IS_SUMMON    = 1 << 1;
        const FLED_BATTLE  = 1 << 2;
        const LEFT_BATTLE  = 1 << 3;
        const IS_ORIGINAL  = 1 << 4;
    }
}

/// Current and maximum value of a resource pool.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pool {
    pub current: f64,
    pub max: f64,
}

impl Pool {
    pub const fn full(max: f64) -> Self {
        Self { current: max, max }
    }

    /// Applies a signed delta and clamps the result to `[0, max]`.
    pub fn apply(&mut self, delta: f64) {
        self.current = (self.current + delta).clamp(0.0, self.max.max(0.0));
    }

    /// `pct` percent of the maximum.
    pub fn percent_of_max(&self, pct: f64) -> f64 {
        self.max * pct / 100.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pools {
    pub health: Pool,
    pub chakra: Pool,
    pub stamina: Pool,
}

impl Pools {
    pub fn get(&self, kind: PoolKind) -> &Pool {
        match kind {
            PoolKind::Health => &self.health,
            PoolKind::Chakra => &self.chakra,
            PoolKind::Stamina => &self.stamina,
        }
    }

    pub fn get_mut(&mut self, kind: PoolKind) -> &mut Pool {
        match kind {
            PoolKind::Health => &mut self.health,
            PoolKind::Chakra => &mut self.chakra,
            PoolKind::Stamina => &mut self.stamina,
        }
    }
}

/// Offence/defence per stat family plus the four generals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    /// Indexed by [`StatType::index`].
    pub offence: [f64; 4],
    pub defence: [f64; 4],
    /// Indexed by [`GeneralType::index`].
    pub generals: [f64; 4],
}

impl StatBlock {
    pub fn offence(&self, stat: StatType) -> f64 {
        self.offence[stat.index()]
    }

    pub fn defence(&self, stat: StatType) -> f64 {
        self.defence[stat.index()]
    }

    pub fn general(&self, general: GeneralType) -> f64 {
        self.generals[general.index()]
    }

    pub fn highest_offence(&self) -> f64 {
        self.offence.iter().copied().fold(0.0, f64::max)
    }

    pub fn highest_defence(&self) -> f64 {
        self.defence.iter().copied().fold(0.0, f64::max)
    }

    pub fn highest_generals(&self) -> f64 {
        self.generals.iter().copied().fold(0.0, f64::max)
    }
}

/// Flat and percentage adjustment applied on top of a base value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub flat: f64,
    pub percent: f64,
}

impl Modifier {
    pub fn apply(&self, base: f64) -> f64 {
        ((base + self.flat) * (100.0 + self.percent) / 100.0).max(0.0)
    }

    pub fn is_identity(&self) -> bool {
        self.flat == 0.0 && self.percent == 0.0
    }
}

/// Stat adjustments produced by active stat/armor adjusters.
///
/// Rebuilt at the start of every pass from the adjusters active in it, and
/// again after aging so a stored battle carries the layer of its next pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifiers {
    /// Applies to both offence and defence of the stat family.
    pub stats: [Modifier; 4],
    pub generals: [Modifier; 4],
    pub armor: Modifier,
}

impl StatModifiers {
    pub fn effective(&self, base: &StatBlock) -> StatBlock {
        let mut out = *base;
        for idx in 0..4 {
            out.offence[idx] = self.stats[idx].apply(base.offence[idx]);
            out.defence[idx] = self.stats[idx].apply(base.defence[idx]);
            out.generals[idx] = self.generals[idx].apply(base.generals[idx]);
        }
        out
    }
}

/// Jutsu or item slot in a combatant's loadout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadoutEntry<I> {
    pub id: I,
    pub level: u32,
    pub last_used_round: Option<u32>,
    /// Remaining uses; `None` for unlimited entries such as jutsu.
    pub quantity: Option<u32>,
}

impl<I> LoadoutEntry<I> {
    pub fn new(id: I, level: u32) -> Self {
        Self {
            id,
            level,
            last_used_round: None,
            quantity: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Rounds left before the entry can be used again.
    pub fn cooldown_remaining(&self, round: u32, cooldown: u32) -> u32 {
        match self.last_used_round {
            Some(last) => last.saturating_add(cooldown).saturating_sub(round),
            None => 0,
        }
    }

    pub fn has_uses(&self) -> bool {
        self.quantity.is_none_or(|q| q > 0)
    }
}

/// Snapshot of a combatant inside one battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleUserState {
    pub user_id: UserId,
    pub username: String,
    /// Player that controls this unit (summons and clones share the owner).
    pub controller_id: UserId,
    pub village_id: Option<VillageId>,
    pub bloodline_id: Option<BloodlineId>,
    pub level: u32,
    pub rank: UserRank,
    pub experience: f64,
    pub pools: Pools,
    pub money: f64,
    pub armor: f64,
    pub position: Position,
    pub sector: u32,
    pub stats: StatBlock,
    pub modifiers: StatModifiers,
    pub jutsus: Vec<LoadoutEntry<JutsuId>>,
    pub items: Vec<LoadoutEntry<ItemId>>,
    pub flags: UserFlags,
}

impl BattleUserState {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            controller_id: user_id,
            village_id: None,
            bloodline_id: None,
            level: 1,
            rank: UserRank::Student,
            experience: 0.0,
            pools: Pools {
                health: Pool::full(100.0),
                chakra: Pool::full(100.0),
                stamina: Pool::full(100.0),
            },
            money: 0.0,
            armor: 0.0,
            position: Position::default(),
            sector: 0,
            stats: StatBlock::default(),
            modifiers: StatModifiers::default(),
            jutsus: Vec::new(),
            items: Vec::new(),
            flags: UserFlags::IS_ORIGINAL,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.pools.health.current > 0.0
    }

    /// Alive and still on the battlefield.
    pub fn is_active(&self) -> bool {
        self.is_alive() && !self.has_left()
    }

    pub fn has_left(&self) -> bool {
        self.flags
            .intersects(UserFlags::FLED_BATTLE | UserFlags::LEFT_BATTLE)
    }

    /// Stats after this round's modifier layer.
    pub fn effective_stats(&self) -> StatBlock {
        self.modifiers.effective(&self.stats)
    }

    pub fn effective_armor(&self) -> f64 {
        self.modifiers.armor.apply(self.armor)
    }

    /// Scales pools and stats by `ratio`, as when a combatant splits into
    /// clones.
    pub fn scale(&mut self, ratio: f64) {
        for pool in [
            &mut self.pools.health,
            &mut self.pools.chakra,
            &mut self.pools.stamina,
        ] {
            pool.max *= ratio;
            pool.current *= ratio;
        }
        let stats = &mut self.stats;
        for value in stats
            .offence
            .iter_mut()
            .chain(stats.defence.iter_mut())
            .chain(stats.generals.iter_mut())
        {
            *value *= ratio;
        }
    }

    /// Copy of this combatant under a new id, standing on `position`.
    ///
    /// The copy keeps the controller, so it fights on the same side.
    pub fn spawn_clone(&self, id: UserId, position: Position) -> Self {
        let mut copy = self.clone();
        copy.user_id = id;
        copy.position = position;
        copy.flags.remove(UserFlags::IS_ORIGINAL);
        copy
    }

    /// Two combatants fight on the same side when they share a controller or
    /// belong to the same village.
    pub fn is_allied_with(&self, other: &BattleUserState) -> bool {
        self.controller_id == other.controller_id
            || matches!((self.village_id, other.village_id), (Some(a), Some(b)) if a == b)
    }

    pub fn jutsu(&self, id: JutsuId) -> Option<&LoadoutEntry<JutsuId>> {
        self.jutsus.iter().find(|entry| entry.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&LoadoutEntry<ItemId>> {
        self.items.iter().find(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_apply_clamps_to_bounds() {
        let mut pool = Pool::full(50.0);
        pool.apply(-80.0);
        assert_eq!(pool.current, 0.0);
        pool.apply(500.0);
        assert_eq!(pool.current, 50.0);
    }

    #[test]
    fn modifiers_combine_flat_then_percent() {
        let mut base = StatBlock::default();
        base.offence[StatType::Ninjutsu.index()] = 100.0;
        let mut modifiers = StatModifiers::default();
        modifiers.stats[StatType::Ninjutsu.index()] = Modifier {
            flat: 20.0,
            percent: 50.0,
        };
        // (100 + 20) * 1.5
        assert_eq!(modifiers.effective(&base).offence(StatType::Ninjutsu), 180.0);
        assert_eq!(modifiers.effective(&base).defence(StatType::Ninjutsu), 30.0);
    }

    #[test]
    fn cooldown_counts_down_from_last_use() {
        let mut entry = LoadoutEntry::new(JutsuId(1), 1);
        assert_eq!(entry.cooldown_remaining(4, 3), 0);
        entry.last_used_round = Some(2);
        assert_eq!(entry.cooldown_remaining(3, 3), 2);
        assert_eq!(entry.cooldown_remaining(5, 3), 0);
    }

    #[test]
    fn allies_share_controller_or_village() {
        let mut a = BattleUserState::new(UserId(1), "a");
        let mut b = BattleUserState::new(UserId(2), "b");
        assert!(!a.is_allied_with(&b));
        a.village_id = Some(VillageId(7));
        b.village_id = Some(VillageId(7));
        assert!(a.is_allied_with(&b));
    }
}
