//! Legal action set for a combatant.
//!
//! [`legal_actions`] is a pure read of the battle state. The engine calls it
//! to validate submissions, and hosts use it to present choices and to drive
//! AI controllers.

use std::collections::BTreeSet;

use tracing::warn;

use super::{Action, ActionId, ActionTarget, BasicAction, CombatAction, PoolCosts, TargetRule};
use crate::effect::EffectKind;
use crate::env::BattleEnv;
use crate::state::{BattleState, BattleUserState, UserId};

/// Every action `actor` may submit right now, each paired with a concrete
/// target.
///
/// * Combatants that are missing, dead, fled or left get an empty set.
/// * Stunned combatants may only wait.
/// * Stealth removes offensive basic actions and keeps the rest, including
///   basic healing of oneself.
/// * Jutsu and items must be off cooldown, affordable, within range of a
///   valid target and allowed for the actor's rank, village and bloodline.
///   Bloodline jutsu are unavailable while the actor is sealed; items need
///   uses left.
pub fn legal_actions(state: &BattleState, actor: UserId, env: &BattleEnv<'_>) -> BTreeSet<Action> {
    let mut actions = BTreeSet::new();
    let Some(user) = state.user(actor) else {
        return actions;
    };
    if !user.is_active() {
        return actions;
    }

    let mut stunned = false;
    let mut stealthed = false;
    let mut sealed = false;
    for effect in state.effects_on(actor) {
        match effect.kind {
            EffectKind::Stun => stunned = true,
            EffectKind::Stealth => stealthed = true,
            EffectKind::Seal => sealed = true,
            _ => {}
        }
    }

    if stunned {
        actions.insert(Action::wait(actor));
        return actions;
    }

    for basic in BasicAction::ALL {
        if stealthed && basic.is_offensive() {
            continue;
        }
        let profile = basic.profile();
        if is_affordable(state, user, &profile) {
            push_targets(&mut actions, ActionId::Basic(basic), &profile, state, user);
        }
    }

    let catalog = env.catalog();
    for entry in &user.jutsus {
        let Some(profile) = catalog.jutsu(entry.id) else {
            warn!(jutsu = entry.id.0, user = %actor, "loadout jutsu missing from catalog");
            continue;
        };
        if entry.cooldown_remaining(state.round, profile.cooldown) > 0
            || !profile.requirements.allows(user)
            || (sealed && profile.requirements.bloodline.is_some())
            || !is_affordable(state, user, profile)
        {
            continue;
        }
        push_targets(&mut actions, ActionId::Jutsu(entry.id), profile, state, user);
    }

    for entry in &user.items {
        let Some(profile) = catalog.item(entry.id) else {
            warn!(item = entry.id.0, user = %actor, "loadout item missing from catalog");
            continue;
        };
        if !entry.has_uses()
            || entry.cooldown_remaining(state.round, profile.cooldown) > 0
            || !profile.requirements.allows(user)
            || !is_affordable(state, user, profile)
        {
            continue;
        }
        push_targets(&mut actions, ActionId::Item(entry.id), profile, state, user);
    }

    actions
}

fn is_affordable(state: &BattleState, user: &BattleUserState, profile: &CombatAction) -> bool {
    let cost = profile.costs.resolve(user, state.effects_on(user.user_id));
    PoolCosts::affordable(&cost, user)
}

fn push_targets(
    actions: &mut BTreeSet<Action>,
    id: ActionId,
    profile: &CombatAction,
    state: &BattleState,
    user: &BattleUserState,
) {
    let origin = user.position;
    let in_range = |other: &BattleUserState| origin.distance(other.position) <= profile.range;

    match profile.target {
        TargetRule::OnSelf => {
            actions.insert(Action::new(id, ActionTarget::User(user.user_id)));
        }
        TargetRule::Ground | TargetRule::EmptyGround => {
            let need_empty = profile.target == TargetRule::EmptyGround;
            for tile in state.grid.tiles_within(origin, profile.range) {
                if tile == origin || (need_empty && !state.is_empty_tile(tile)) {
                    continue;
                }
                actions.insert(Action::new(id, ActionTarget::Tile(tile)));
            }
        }
        rule => {
            for other in state.users.iter().filter(|u| u.is_active() && in_range(*u)) {
                let is_self = other.user_id == user.user_id;
                let allowed = match rule {
                    TargetRule::Opponent => !user.is_allied_with(other),
                    TargetRule::Ally => !is_self && user.is_allied_with(other),
                    TargetRule::OtherUser => !is_self,
                    TargetRule::Character => true,
                    TargetRule::OnSelf | TargetRule::Ground | TargetRule::EmptyGround => false,
                };
                if allowed {
                    actions.insert(Action::new(id, ActionTarget::User(other.user_id)));
                }
            }
        }
    }
}
