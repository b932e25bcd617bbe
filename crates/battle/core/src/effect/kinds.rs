//! Effect kind enum and its static classification.
//!
//! [`EffectKind`] is closed: adding a variant forces every match in the
//! engine to decide how the new kind resolves.

use core::str::FromStr;

use super::{MalformedEffect, PoolMask};

/// The behavior of an effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    // ========================================================================
    // Damage & Healing
    // ========================================================================
    Damage,
    Heal,
    /// Heals the target by a share of the damage it dealt this pass.
    Lifesteal,
    /// Converts a share of incoming damage into the listed pools.
    Absorb { pools: PoolMask },
    /// Sends a share of incoming damage back to its source.
    Reflect,

    // ========================================================================
    // Adjusters
    // ========================================================================
    ArmorAdjust,
    StatAdjust,
    DamageGivenAdjust,
    DamageTakenAdjust,
    HealAdjust,
    PoolCostAdjust { pools: PoolMask },

    // ========================================================================
    // Control
    // ========================================================================
    Clear,
    Flee,
    Stun,
    Seal,
    OneHitKill,
    Rob,
    Stealth,

    // ========================================================================
    // Prevention
    // ========================================================================
    FleePrevent,
    StunPrevent,
    SealPrevent,
    OneHitKillPrevent,
    RobPrevent,
    BuffPrevent,
    DebuffPrevent,
    HealPrevent,

    // ========================================================================
    // Ground
    // ========================================================================
    /// Blocks a tile until `remaining` damage has been dealt to it.
    Barrier { remaining: f64 },
    /// Relocates the creator to the tile.
    Move,
    /// Splits the creator: both it and a copy on the tile keep `power`
    /// percent of their pools and stats.
    Clone,
}

/// Payload-free discriminant of [`EffectKind`], used for logging, data tags
/// and classification.
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
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EffectTag {
    Damage,
    Heal,
    Lifesteal,
    Absorb,
    Reflect,
    ArmorAdjust,
    StatAdjust,
    DamageGivenAdjust,
    DamageTakenAdjust,
    HealAdjust,
    PoolCostAdjust,
    Clear,
    Flee,
    Stun,
    Seal,
    OneHitKill,
    Rob,
    Stealth,
    FleePrevent,
    StunPrevent,
    SealPrevent,
    OneHitKillPrevent,
    RobPrevent,
    BuffPrevent,
    DebuffPrevent,
    HealPrevent,
    Barrier,
    Move,
    Clone,
}

impl EffectTag {
    /// Parses a data tag such as `"healprevent"`.
    pub fn parse(tag: &str) -> Result<Self, MalformedEffect> {
        Self::from_str(tag).map_err(|_| MalformedEffect::UnknownTag(tag.to_owned()))
    }

    pub const fn supports_formula(self) -> bool {
        matches!(self, Self::Damage | Self::Barrier | Self::Rob)
    }

    /// Resolution pass this kind belongs to.
    pub const fn phase(self) -> ResolutionPhase {
        match self {
            Self::FleePrevent
            | Self::StunPrevent
            | Self::SealPrevent
            | Self::OneHitKillPrevent
            | Self::RobPrevent
            | Self::BuffPrevent
            | Self::DebuffPrevent
            | Self::HealPrevent
            | Self::Seal => ResolutionPhase::Prevention,
            Self::Damage
            | Self::OneHitKill
            | Self::DamageGivenAdjust
            | Self::DamageTakenAdjust
            | Self::Absorb
            | Self::Reflect => ResolutionPhase::Damage,
            Self::Lifesteal => ResolutionPhase::DeathDependent,
            Self::Heal
            | Self::HealAdjust
            | Self::ArmorAdjust
            | Self::StatAdjust
            | Self::PoolCostAdjust
            | Self::Stealth
            | Self::Clear
            | Self::Stun
            | Self::Flee
            | Self::Rob => ResolutionPhase::Remaining,
            Self::Barrier | Self::Move | Self::Clone => ResolutionPhase::Ground,
        }
    }
}

/// Fixed order in which effect kinds resolve within one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolutionPhase {
    /// (a) record what is blocked for each target.
    Prevention,
    /// (b) compute damage and flag deaths.
    Damage,
    /// (c) effects that read death flags.
    DeathDependent,
    /// (d) everything else, gated by the prevention map.
    Remaining,
    /// Tile bookkeeping: barriers, movement and clones.
    Ground,
}

/// Whether an effect helps or hinders its target, for buff/debuff prevention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    Buff,
    Debuff,
    Neutral,
}

impl EffectKind {
    pub const fn tag(&self) -> EffectTag {
        match self {
            Self::Damage => EffectTag::Damage,
            Self::Heal => EffectTag::Heal,
            Self::Lifesteal => EffectTag::Lifesteal,
            Self::Absorb { .. } => EffectTag::Absorb,
            Self::Reflect => EffectTag::Reflect,
            Self::ArmorAdjust => EffectTag::ArmorAdjust,
            Self::StatAdjust => EffectTag::StatAdjust,
            Self::DamageGivenAdjust => EffectTag::DamageGivenAdjust,
            Self::DamageTakenAdjust => EffectTag::DamageTakenAdjust,
            Self::HealAdjust => EffectTag::HealAdjust,
            Self::PoolCostAdjust { .. } => EffectTag::PoolCostAdjust,
            Self::Clear => EffectTag::Clear,
            Self::Flee => EffectTag::Flee,
            Self::Stun => EffectTag::Stun,
            Self::Seal => EffectTag::Seal,
            Self::OneHitKill => EffectTag::OneHitKill,
            Self::Rob => EffectTag::Rob,
            Self::Stealth => EffectTag::Stealth,
            Self::FleePrevent => EffectTag::FleePrevent,
            Self::StunPrevent => EffectTag::StunPrevent,
            Self::SealPrevent => EffectTag::SealPrevent,
            Self::OneHitKillPrevent => EffectTag::OneHitKillPrevent,
            Self::RobPrevent => EffectTag::RobPrevent,
            Self::BuffPrevent => EffectTag::BuffPrevent,
            Self::DebuffPrevent => EffectTag::DebuffPrevent,
            Self::HealPrevent => EffectTag::HealPrevent,
            Self::Barrier { .. } => EffectTag::Barrier,
            Self::Move => EffectTag::Move,
            Self::Clone => EffectTag::Clone,
        }
    }

    pub const fn phase(&self) -> ResolutionPhase {
        self.tag().phase()
    }

    pub const fn is_ground_only(&self) -> bool {
        matches!(self, Self::Barrier { .. } | Self::Move | Self::Clone)
    }

    /// Polarity for an effect with the given effective `power`.
    ///
    /// Adjusters flip with the sign of their power. A positive pool-cost
    /// adjustment makes actions more expensive and therefore hinders.
    pub fn polarity(&self, power: f64) -> Polarity {
        let by_sign = |helpful: bool| {
            if helpful {
                Polarity::Buff
            } else {
                Polarity::Debuff
            }
        };
        match self {
            Self::Absorb { .. }
            | Self::Reflect
            | Self::Stealth
            | Self::StunPrevent
            | Self::SealPrevent
            | Self::OneHitKillPrevent
            | Self::RobPrevent => Polarity::Buff,
            Self::Stun | Self::Seal | Self::FleePrevent => Polarity::Debuff,
            Self::ArmorAdjust
            | Self::StatAdjust
            | Self::DamageGivenAdjust
            | Self::DamageTakenAdjust
            | Self::HealAdjust => by_sign(power >= 0.0),
            Self::PoolCostAdjust { .. } => by_sign(power <= 0.0),
            Self::Damage
            | Self::Heal
            | Self::Lifesteal
            | Self::Clear
            | Self::Flee
            | Self::OneHitKill
            | Self::Rob
            | Self::BuffPrevent
            | Self::DebuffPrevent
            | Self::HealPrevent
            | Self::Barrier { .. }
            | Self::Move
            | Self::Clone => Polarity::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_strings() {
        assert_eq!(EffectTag::HealPrevent.as_ref(), "healprevent");
        assert_eq!(EffectTag::parse("damagegivenadjust"), Ok(EffectTag::DamageGivenAdjust));
        assert_eq!(EffectTag::parse("OneHitKill"), Ok(EffectTag::OneHitKill));
        assert_eq!(EffectTag::parse("clone"), Ok(EffectTag::Clone));
        assert_eq!(
            EffectTag::parse("summon"),
            Err(MalformedEffect::UnknownTag("summon".into()))
        );
    }

    #[test]
    fn phases_follow_fixed_order() {
        assert!(EffectTag::HealPrevent.phase() < EffectTag::Damage.phase());
        assert!(EffectTag::Damage.phase() < EffectTag::Lifesteal.phase());
        assert!(EffectTag::Lifesteal.phase() < EffectTag::Heal.phase());
        assert_eq!(EffectTag::Clone.phase(), ResolutionPhase::Ground);
        assert!(EffectKind::Clone.is_ground_only());
    }

    #[test]
    fn adjuster_polarity_follows_power_sign() {
        assert_eq!(EffectKind::StatAdjust.polarity(10.0), Polarity::Buff);
        assert_eq!(EffectKind::StatAdjust.polarity(-10.0), Polarity::Debuff);
        let cost = EffectKind::PoolCostAdjust {
            pools: PoolMask::CHAKRA,
        };
        assert_eq!(cost.polarity(25.0), Polarity::Debuff);
        assert_eq!(EffectKind::HealPrevent.polarity(100.0), Polarity::Neutral);
    }
}
