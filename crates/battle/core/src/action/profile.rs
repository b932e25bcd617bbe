//! Combat action definitions: complete specification of a jutsu, item or
//! basic action. Jutsu and item definitions are loaded from catalog data.

use crate::consequence::PoolDelta;
use crate::effect::{Calculation, EffectKind, EffectTemplate, UserEffect};
use crate::state::{BattleUserState, BloodlineId, PoolKind, UserRank, VillageId};

/// Which combatants or tiles an action may be aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetRule {
    /// The acting combatant only.
    #[default]
    OnSelf,
    /// A combatant on the other side.
    Opponent,
    /// A combatant on the same side, other than the actor.
    Ally,
    /// Any combatant other than the actor.
    OtherUser,
    /// Any combatant, including the actor.
    Character,
    /// Any tile.
    Ground,
    /// A tile with no combatant and no barrier on it.
    EmptyGround,
}

impl TargetRule {
    pub const fn targets_ground(self) -> bool {
        matches!(self, Self::Ground | Self::EmptyGround)
    }
}

/// Pool costs as percentages of the actor's maximum pools.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolCosts {
    pub health_pct: f64,
    pub chakra_pct: f64,
    pub stamina_pct: f64,
}

impl PoolCosts {
    /// Absolute costs for `user`, after every pool-cost adjuster on them.
    pub fn resolve<'a>(
        &self,
        user: &BattleUserState,
        effects_on_user: impl IntoIterator<Item = &'a UserEffect>,
    ) -> PoolDelta {
        let mut cost = PoolDelta {
            health: user.pools.health.percent_of_max(self.health_pct),
            chakra: user.pools.chakra.percent_of_max(self.chakra_pct),
            stamina: user.pools.stamina.percent_of_max(self.stamina_pct),
        };
        for effect in effects_on_user {
            let EffectKind::PoolCostAdjust { pools } = effect.kind else {
                continue;
            };
            let power = effect.power();
            for pool in pools.kinds() {
                let current = match pool {
                    PoolKind::Health => &mut cost.health,
                    PoolKind::Chakra => &mut cost.chakra,
                    PoolKind::Stamina => &mut cost.stamina,
                };
                *current = match effect.envelope.calculation {
                    Calculation::Static => *current + power,
                    _ => *current * (100.0 + power) / 100.0,
                }
                .max(0.0);
            }
        }
        cost
    }

    /// Whether `user` can currently pay `cost`.
    pub fn affordable(cost: &PoolDelta, user: &BattleUserState) -> bool {
        user.pools.health.current >= cost.health
            && user.pools.chakra.current >= cost.chakra
            && user.pools.stamina.current >= cost.stamina
    }
}

/// Eligibility of a combatant for a loadout entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Requirements {
    pub min_rank: UserRank,
    pub village: Option<VillageId>,
    pub bloodline: Option<BloodlineId>,
}

impl Requirements {
    pub fn allows(&self, user: &BattleUserState) -> bool {
        user.rank >= self.min_rank
            && self.village.is_none_or(|v| user.village_id == Some(v))
            && self.bloodline.is_none_or(|b| user.bloodline_id == Some(b))
    }
}

/// Complete definition of something a combatant can do in a round.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatAction {
    pub name: String,
    /// Battle log template; `%user`, `%target` and `%location` are replaced.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub target: TargetRule,
    /// Maximum hex distance from the actor to the target.
    pub range: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub costs: PoolCosts,
    /// Rounds that must pass before the entry can be used again.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: Requirements,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<EffectTemplate>,
}

impl CombatAction {
    pub fn new(name: impl Into<String>, target: TargetRule, range: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            target,
            range,
            costs: PoolCosts::default(),
            cooldown: 0,
            requirements: Requirements::default(),
            effects: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_costs(mut self, costs: PoolCosts) -> Self {
        self.costs = costs;
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_effect(mut self, effect: EffectTemplate) -> Self {
        self.effects.push(effect);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectEnvelope, EffectId, EffectSource, FriendlyFire, PoolMask, StatFilter};
    use crate::state::UserId;

    fn cost_adjust(power: f64, calculation: Calculation) -> UserEffect {
        UserEffect {
            envelope: EffectEnvelope {
                id: EffectId(1),
                creator: UserId(2),
                level: 1,
                power,
                power_per_level: 0.0,
                calculation,
                rounds: 2,
                is_new: false,
                cast_this_round: false,
                created_round: 1,
                source: EffectSource::Basic,
                friendly_fire: FriendlyFire::All,
                filter: StatFilter::default(),
                from_ground: false,
            },
            target: UserId(1),
            kind: EffectKind::PoolCostAdjust {
                pools: PoolMask::CHAKRA,
            },
        }
    }

    #[test]
    fn costs_scale_with_max_pools_and_adjusters() {
        let mut user = BattleUserState::new(UserId(1), "a");
        user.pools.chakra.max = 200.0;
        let costs = PoolCosts {
            chakra_pct: 10.0,
            ..PoolCosts::default()
        };
        let none: [UserEffect; 0] = [];
        // 10% of 200
        assert_eq!(costs.resolve(&user, &none).chakra, 20.0);

        let doubled = cost_adjust(100.0, Calculation::Percentage);
        assert_eq!(costs.resolve(&user, [&doubled]).chakra, 40.0);

        let flat = cost_adjust(-5.0, Calculation::Static);
        assert_eq!(costs.resolve(&user, [&doubled, &flat]).chakra, 35.0);
    }

    #[test]
    fn requirements_check_rank_village_and_bloodline() {
        let mut user = BattleUserState::new(UserId(1), "a");
        let req = Requirements {
            min_rank: UserRank::Chunin,
            village: Some(VillageId(3)),
            bloodline: None,
        };
        assert!(!req.allows(&user));
        user.rank = UserRank::Jonin;
        user.village_id = Some(VillageId(3));
        assert!(req.allows(&user));
    }
}
