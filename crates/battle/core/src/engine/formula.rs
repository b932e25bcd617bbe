//! Stat-driven amounts for damage and robbery.

use crate::config::BattleConfig;
use crate::effect::{Calculation, UserEffect};
use crate::state::BattleUserState;

/// `DMG_BASE + attack^ATK / defence^DEF * experience^EXP`.
fn power_effect(attack: f64, defence: f64, experience: f64) -> f64 {
    BattleConfig::DMG_BASE
        + attack.max(0.0).powf(BattleConfig::ATK_SCALING)
            / defence.max(1.0).powf(BattleConfig::DEF_SCALING)
            * experience.max(0.0).powf(BattleConfig::EXP_SCALING)
}

/// Raw damage of `effect` against `target`, before armor and adjusters.
///
/// Formula damage without a creator on the field (a hazard whose creator
/// is gone) falls back to the effect's power.
pub(crate) fn raw_damage(
    effect: &UserEffect,
    origin: Option<&BattleUserState>,
    target: &BattleUserState,
) -> f64 {
    let power = effect.power();
    match effect.envelope.calculation {
        Calculation::Static => power,
        Calculation::Percentage => target.pools.health.max * power / 100.0,
        Calculation::Formula => match origin {
            Some(origin) => formula_damage(effect, origin, target),
            None => power,
        },
    }
}

fn formula_damage(effect: &UserEffect, origin: &BattleUserState, target: &BattleUserState) -> f64 {
    let attacker = origin.effective_stats();
    let defender = target.effective_stats();
    let experience = (origin.experience + target.experience) / 2.0;
    let filter = &effect.envelope.filter;

    let calcs: Vec<f64> = filter
        .stats
        .iter()
        .map(|stat| power_effect(attacker.offence(*stat), defender.defence(*stat), experience))
        .chain(filter.generals.iter().map(|general| {
            BattleConfig::GEN_SCALING
                * power_effect(
                    attacker.general(*general),
                    defender.general(*general),
                    experience,
                )
        }))
        .collect();

    let power = effect.power();
    if calcs.is_empty() {
        return power;
    }
    let mean = calcs.iter().sum::<f64>() / calcs.len() as f64;
    let base = 1.0 + power * BattleConfig::POWER_SCALING;
    base * mean * BattleConfig::DMG_SCALING + BattleConfig::DMG_BASE
}

/// Share of the target's money a formula robbery takes, in percent.
///
/// Power is multiplied by the attacker/defender ratio of every stat and
/// general the effect lists.
pub(crate) fn rob_ratio(
    effect: &UserEffect,
    origin: &BattleUserState,
    target: &BattleUserState,
) -> f64 {
    let attacker = origin.effective_stats();
    let defender = target.effective_stats();
    let filter = &effect.envelope.filter;
    let mut ratio = effect.power();
    for stat in &filter.stats {
        ratio *= attacker.offence(*stat) / defender.defence(*stat).max(1.0);
    }
    for general in &filter.generals {
        ratio *= attacker.general(*general) / defender.general(*general).max(1.0);
    }
    ratio.max(0.0)
}
