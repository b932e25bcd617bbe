//! Effect model: every status, consequence and tile hazard in a battle.
//!
//! An effect is a common [`EffectEnvelope`] (id, creator, power, duration,
//! bookkeeping flags) plus one [`EffectKind`] variant carrying the fields only
//! that kind needs. Generic engine code (duration aging, logging, prevention
//! lookups) works on the envelope; behavior is dispatched by an exhaustive
//! match on the kind.
mod kinds;
mod template;

pub use kinds::{EffectKind, EffectTag, Polarity, ResolutionPhase};
pub use template::{EffectTemplate, TemplateTarget};

use core::fmt;

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::BattleConfig;
use crate::state::{
    BattleUserState, BloodlineId, Element, GeneralType, ItemId, JutsuId, PoolKind, Position,
    StatType, UserId,
};

/// Identifier of an effect, unique within its battle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EffectId(pub u32);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// How the effective power of an effect is interpreted.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Calculation {
    /// Power is an absolute amount.
    #[default]
    Static,
    /// Power is a percentage of the relevant maximum or referenced amount.
    Percentage,
    /// Power feeds the stat-driven damage formula.
    Formula,
}

/// What produced an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSource {
    Basic,
    Jutsu(JutsuId),
    Item(ItemId),
    Bloodline(BloodlineId),
}

impl EffectSource {
    pub const fn is_bloodline(&self) -> bool {
        matches!(self, Self::Bloodline(_))
    }
}

/// Who a tile hazard may affect relative to its creator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FriendlyFire {
    #[default]
    All,
    Friendly,
    Enemies,
}

impl FriendlyFire {
    pub fn allows(self, creator: &BattleUserState, occupant: &BattleUserState) -> bool {
        match self {
            Self::All => true,
            Self::Friendly => creator.is_allied_with(occupant),
            Self::Enemies => !creator.is_allied_with(occupant),
        }
    }
}

bitflags! {
    /// Resource pools an absorb or pool-cost effect works on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PoolMask: u8 {
        const HEALTH  = 1 << 0;
        const CHAKRA  = 1 << 1;
        const STAMINA = 1 << 2;
    }
}

impl PoolMask {
    pub fn kinds(self) -> impl Iterator<Item = PoolKind> {
        [
            (Self::HEALTH, PoolKind::Health),
            (Self::CHAKRA, PoolKind::Chakra),
            (Self::STAMINA, PoolKind::Stamina),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, kind)| kind)
    }

    pub fn len(self) -> u32 {
        self.bits().count_ones()
    }
}

/// Stats, generals and elements an effect works with.
///
/// Damage effects list what they attack with; adjusters list what they
/// modify. The overlap of the two decides how much of an adjuster applies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatFilter {
    pub stats: ArrayVec<StatType, { BattleConfig::MAX_STAT_FILTERS }>,
    pub generals: ArrayVec<GeneralType, { BattleConfig::MAX_GENERAL_FILTERS }>,
    pub elements: ArrayVec<Element, { BattleConfig::MAX_ELEMENT_FILTERS }>,
}

impl StatFilter {
    pub fn with_stats(mut self, stats: impl IntoIterator<Item = StatType>) -> Self {
        for stat in stats {
            if self.stats.try_push(stat).is_err() {
                break;
            }
        }
        self
    }

    pub fn with_generals(mut self, generals: impl IntoIterator<Item = GeneralType>) -> Self {
        for general in generals {
            if self.generals.try_push(general).is_err() {
                break;
            }
        }
        self
    }

    pub fn with_elements(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        for element in elements {
            if self.elements.try_push(element).is_err() {
                break;
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty() && self.generals.is_empty() && self.elements.is_empty()
    }

    /// Share of this filter's entries that `adjuster` also lists, in `[0, 1]`.
    ///
    /// An effect without any stats is matched fully.
    pub fn efficiency_ratio(&self, adjuster: &StatFilter) -> f64 {
        let attacks = self.stats.len() + self.generals.len() + self.elements.len();
        if attacks == 0 {
            return 1.0;
        }
        let defended = self
            .stats
            .iter()
            .filter(|s| adjuster.stats.contains(s))
            .count()
            + self
                .generals
                .iter()
                .filter(|g| adjuster.generals.contains(g))
                .count()
            + self
                .elements
                .iter()
                .filter(|e| adjuster.elements.contains(e))
                .count();
        defended as f64 / attacks as f64
    }
}

/// Fields shared by every effect regardless of kind.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectEnvelope {
    pub id: EffectId,
    pub creator: UserId,
    /// Level the effect was realized at (jutsu level or user level).
    pub level: u32,
    pub power: f64,
    pub power_per_level: f64,
    pub calculation: Calculation,
    /// Remaining passes after the current one. Zero means the effect is
    /// dropped at the end of the pass it last applied in.
    pub rounds: u32,
    /// Created during the current pass and not yet aged.
    pub is_new: bool,
    /// Created by the action resolved in the current pass.
    pub cast_this_round: bool,
    pub created_round: u32,
    pub source: EffectSource,
    pub friendly_fire: FriendlyFire,
    pub filter: StatFilter,
    /// Transient copy of a tile hazard applied to its occupant.
    pub from_ground: bool,
}

impl EffectEnvelope {
    /// Power scaled by level: `power + power_per_level * (level - 1)`.
    pub fn power(&self) -> f64 {
        self.power + self.power_per_level * f64::from(self.level.saturating_sub(1))
    }

    /// Whether this effect was already active before the current pass.
    pub fn was_active_before(&self) -> bool {
        !self.is_new && !self.cast_this_round
    }
}

/// Effect attached to a combatant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserEffect {
    pub envelope: EffectEnvelope,
    pub target: UserId,
    pub kind: EffectKind,
}

impl UserEffect {
    pub fn id(&self) -> EffectId {
        self.envelope.id
    }

    pub fn tag(&self) -> EffectTag {
        self.kind.tag()
    }

    pub fn power(&self) -> f64 {
        self.envelope.power()
    }

    pub fn polarity(&self) -> Polarity {
        self.kind.polarity(self.power())
    }

    /// Checks that stored effect data is something the engine can resolve.
    pub fn validate(&self) -> Result<(), MalformedEffect> {
        let tag = self.tag();
        if self.kind.is_ground_only() {
            return Err(MalformedEffect::GroundOnly { tag });
        }
        validate_envelope(tag, &self.envelope)
    }
}

/// Effect bound to a battlefield tile.
///
/// Barriers, move markers and clones live only on the ground. Every other kind is a
/// hazard that is applied to whoever stands on the tile each pass.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroundEffect {
    pub envelope: EffectEnvelope,
    pub position: Position,
    pub kind: EffectKind,
}

impl GroundEffect {
    pub fn id(&self) -> EffectId {
        self.envelope.id
    }

    pub fn tag(&self) -> EffectTag {
        self.kind.tag()
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, EffectKind::Barrier { .. })
    }

    pub fn validate(&self) -> Result<(), MalformedEffect> {
        validate_envelope(self.tag(), &self.envelope)
    }

    /// Copy of this hazard targeting the tile's occupant for one pass.
    pub fn to_user_effect(&self, target: UserId) -> UserEffect {
        let mut envelope = self.envelope.clone();
        envelope.from_ground = true;
        envelope.rounds = 0;
        UserEffect {
            envelope,
            target,
            kind: self.kind.clone(),
        }
    }
}

fn validate_envelope(tag: EffectTag, envelope: &EffectEnvelope) -> Result<(), MalformedEffect> {
    if !envelope.power.is_finite() || !envelope.power_per_level.is_finite() {
        return Err(MalformedEffect::NonFinitePower { tag });
    }
    if envelope.calculation == Calculation::Formula && !tag.supports_formula() {
        return Err(MalformedEffect::FormulaUnsupported { tag });
    }
    if tag == EffectTag::Clear && envelope.rounds != 0 {
        return Err(MalformedEffect::LingeringClear);
    }
    Ok(())
}

/// Stored effect data that cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEffect {
    #[error("unknown effect tag `{0}`")]
    UnknownTag(String),

    #[error("{tag} effects can only be placed on the ground")]
    GroundOnly { tag: EffectTag },

    #[error("{tag} effects do not support formula calculation")]
    FormulaUnsupported { tag: EffectTag },

    #[error("{tag} effect has a non-finite power")]
    NonFinitePower { tag: EffectTag },

    #[error("clear effects must be instantaneous")]
    LingeringClear,
}
