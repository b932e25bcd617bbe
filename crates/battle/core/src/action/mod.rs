//! Action domain: what a combatant may submit and what it costs.
//!
//! - `profile`: [`CombatAction`] definitions (targeting, range, costs,
//!   requirements, effect templates) for jutsu, items and basic actions
//! - `available`: the legal-action filter consulted before resolution

mod available;
mod profile;

pub use available::legal_actions;
pub use profile::{CombatAction, PoolCosts, Requirements, TargetRule};

use crate::config::BattleConfig;
use crate::effect::{Calculation, EffectKind, EffectTemplate, StatFilter, TemplateTarget};
use crate::state::{GeneralType, ItemId, JutsuId, Position, StatType, UserId};

/// Actions every combatant has regardless of loadout.
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
pub enum BasicAction {
    BasicAttack,
    BasicHeal,
    Move,
    Flee,
    Wait,
}

impl BasicAction {
    pub const ALL: [BasicAction; 5] = [
        Self::BasicAttack,
        Self::BasicHeal,
        Self::Move,
        Self::Flee,
        Self::Wait,
    ];

    /// Basic actions that harm another combatant.
    pub const fn is_offensive(self) -> bool {
        matches!(self, Self::BasicAttack)
    }

    /// Built-in definition of this basic action.
    pub fn profile(self) -> CombatAction {
        match self {
            Self::BasicAttack => CombatAction::new("Basic Attack", TargetRule::OtherUser, 1)
                .with_description("%user performs a basic physical strike against %target")
                .with_costs(PoolCosts {
                    stamina_pct: BattleConfig::BASIC_ATTACK_STAMINA_PCT,
                    ..PoolCosts::default()
                })
                .with_effect(
                    EffectTemplate::new(EffectKind::Damage, BattleConfig::BASIC_ATTACK_POWER)
                        .with_calculation(Calculation::Formula)
                        .with_power_per_level(BattleConfig::BASIC_POWER_PER_LEVEL)
                        .with_filter(
                            StatFilter::default().with_generals([GeneralType::Strength]),
                        ),
                ),
            Self::BasicHeal => CombatAction::new("Basic Heal", TargetRule::Character, 1)
                .with_description("%user performs basic healing of %target")
                .with_costs(PoolCosts {
                    chakra_pct: BattleConfig::BASIC_HEAL_CHAKRA_PCT,
                    ..PoolCosts::default()
                })
                .with_effect(
                    EffectTemplate::new(EffectKind::Heal, BattleConfig::BASIC_HEAL_POWER)
                        .with_power_per_level(BattleConfig::BASIC_POWER_PER_LEVEL)
                        .with_filter(
                            StatFilter::default()
                                .with_stats([StatType::Ninjutsu, StatType::Genjutsu])
                                .with_generals([GeneralType::Willpower, GeneralType::Intelligence]),
                        ),
                ),
            Self::Move => CombatAction::new("Move", TargetRule::EmptyGround, 1)
                .with_description("%user moves to %location")
                .with_effect(EffectTemplate::new(EffectKind::Move, 100.0)),
            Self::Flee => CombatAction::new("Flee", TargetRule::OnSelf, 0)
                .with_description("%user attempts to flee the battle")
                .with_costs(PoolCosts {
                    health_pct: BattleConfig::FLEE_HEALTH_PCT,
                    ..PoolCosts::default()
                })
                .with_effect(EffectTemplate {
                    target: TemplateTarget::Caster,
                    ..EffectTemplate::new(EffectKind::Flee, BattleConfig::FLEE_CHANCE)
                }),
            Self::Wait => CombatAction::new("Wait", TargetRule::OnSelf, 0)
                .with_description("%user stands and waits"),
        }
    }
}

/// Which loadout or built-in action is being used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionId {
    Basic(BasicAction),
    Jutsu(JutsuId),
    Item(ItemId),
}

/// What an action is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionTarget {
    User(UserId),
    Tile(Position),
}

/// A submitted action: action id plus target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub id: ActionId,
    pub target: ActionTarget,
}

impl Action {
    pub const fn new(id: ActionId, target: ActionTarget) -> Self {
        Self { id, target }
    }

    pub const fn basic(action: BasicAction, target: ActionTarget) -> Self {
        Self::new(ActionId::Basic(action), target)
    }

    /// The no-op action: wait in place.
    pub const fn wait(actor: UserId) -> Self {
        Self::basic(BasicAction::Wait, ActionTarget::User(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_profiles_match_their_roles() {
        let attack = BasicAction::BasicAttack.profile();
        assert_eq!(attack.target, TargetRule::OtherUser);
        assert_eq!(attack.costs.stamina_pct, 10.0);
        assert_eq!(attack.effects.len(), 1);
        assert_eq!(attack.effects[0].calculation, Calculation::Formula);

        let flee = BasicAction::Flee.profile();
        assert_eq!(flee.effects[0].target, TemplateTarget::Caster);
        assert!(BasicAction::Wait.profile().effects.is_empty());
    }

    #[test]
    fn only_basic_attack_is_offensive() {
        let offensive: Vec<_> = BasicAction::ALL
            .into_iter()
            .filter(|a| a.is_offensive())
            .collect();
        assert_eq!(offensive, vec![BasicAction::BasicAttack]);
    }
}
