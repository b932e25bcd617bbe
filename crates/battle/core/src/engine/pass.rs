//! Working data of one resolution pass and the steps around the phases:
//! materializing the submitted action, applying tile hazards, committing
//! and aging durations.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::log::LogLine;
use super::prevention::PreventionMap;
use super::{ResolveError, SkipReason};
use crate::action::{Action, ActionId, ActionTarget, CombatAction};
use crate::consequence::{Applied, ConsequenceMap, LoadoutUse};
use crate::effect::{
    Calculation, EffectEnvelope, EffectId, EffectKind, EffectSource, EffectTemplate,
    FriendlyFire, GroundEffect, TemplateTarget, UserEffect,
};
use crate::env::{BattleEnv, compute_seed};
use crate::error::ErrorContext;
use crate::state::{BattleState, Modifier, Position, StatModifiers, UserId};

/// Where an effect of the working list stands in the current pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Slot {
    Live,
    /// Dropped at the end of the pass without resolving further.
    Expired,
    Skipped(SkipReason),
}

pub(super) struct RoundPass<'e> {
    pub(super) env: BattleEnv<'e>,
    pub(super) state: BattleState,
    pub(super) effects: Vec<UserEffect>,
    pub(super) slots: Vec<Slot>,
    pub(super) consequences: ConsequenceMap,
    pub(super) prevented: PreventionMap,
    pub(super) log: Vec<LogLine>,
    pub(super) deaths: Vec<UserId>,
}

impl<'e> RoundPass<'e> {
    pub(super) fn new(env: BattleEnv<'e>, mut state: BattleState) -> Self {
        let effects = std::mem::take(&mut state.user_effects);
        let slots = vec![Slot::Live; effects.len()];
        Self {
            env,
            state,
            effects,
            slots,
            consequences: ConsequenceMap::new(),
            prevented: PreventionMap::default(),
            log: Vec::new(),
            deaths: Vec::new(),
        }
    }

    pub(super) fn context(&self) -> ErrorContext {
        ErrorContext::new(self.state.round).with_battle(self.state.id)
    }

    pub(super) fn push_effect(&mut self, effect: UserEffect) {
        self.effects.push(effect);
        self.slots.push(Slot::Live);
    }

    pub(super) fn is_live(&self, slot: usize) -> bool {
        self.slots[slot] == Slot::Live
    }

    pub(super) fn expire(&mut self, slot: usize) {
        self.slots[slot] = Slot::Expired;
    }

    /// Live slots in list order. Collected up front so handlers may push
    /// log lines and expire other slots while iterating.
    pub(super) fn live_slots(&self, matches: impl Fn(&EffectKind) -> bool) -> Vec<usize> {
        (0..self.effects.len())
            .filter(|slot| self.is_live(*slot) && matches(&self.effects[*slot].kind))
            .collect()
    }

    pub(super) fn name(&self, user: UserId) -> String {
        self.state
            .user(user)
            .map_or_else(|| user.to_string(), |u| u.username.clone())
    }

    /// Deterministic roll for `effect`; `context` separates several rolls
    /// by the same effect.
    pub(super) fn roll(&self, effect: EffectId, context: u32, chance: f64) -> bool {
        let seed = compute_seed(self.state.seed, self.state.round, effect.0, context);
        self.env.rng().chance(seed, chance)
    }

    // ========================================================================
    // Action materialization
    // ========================================================================

    fn definition(&self, id: ActionId) -> Option<CombatAction> {
        let catalog = self.env.catalog();
        match id {
            ActionId::Basic(basic) => Some(basic.profile()),
            ActionId::Jutsu(jutsu) => catalog.jutsu(jutsu).cloned(),
            ActionId::Item(item) => catalog.item(item).cloned(),
        }
    }

    /// Charges the actor and turns the action's templates into effects.
    pub(super) fn materialize(&mut self, actor: UserId, action: &Action) -> Result<(), ResolveError> {
        let profile = self
            .definition(action.id)
            .ok_or_else(|| ResolveError::MissingDefinition {
                id: action.id,
                context: self.context().with_actor(actor),
            })?;
        let user = self
            .state
            .user(actor)
            .ok_or_else(|| ResolveError::actor_not_found(self.context().with_actor(actor)))?;

        let (level, source, used) = match action.id {
            ActionId::Basic(_) => (user.level, EffectSource::Basic, None),
            ActionId::Jutsu(id) => (
                user.jutsu(id).map_or(user.level, |entry| entry.level),
                profile
                    .requirements
                    .bloodline
                    .map_or(EffectSource::Jutsu(id), EffectSource::Bloodline),
                Some(LoadoutUse::Jutsu(id)),
            ),
            ActionId::Item(id) => (user.level, EffectSource::Item(id), Some(LoadoutUse::Item(id))),
        };
        let cost = profile
            .costs
            .resolve(user, self.effects.iter().filter(|e| e.target == actor));
        let actor_name = user.username.clone();

        let target_text = match action.target {
            ActionTarget::User(id) => self.name(id),
            ActionTarget::Tile(tile) => tile.to_string(),
        };
        let description = if profile.description.is_empty() {
            format!("{actor_name} uses {}", profile.name)
        } else {
            profile
                .description
                .replace("%user", &actor_name)
                .replace("%target", &target_text)
                .replace("%location", &target_text)
        };
        self.log.push(LogLine::info(description));

        let entry = self.consequences.entry(actor);
        entry.cost = cost;
        entry.used = used;

        let round = self.state.round;
        for template in &profile.effects {
            let id = self.state.allocate_effect_id();
            let envelope = template.envelope(id, actor, level, round, source);
            match (template.target, action.target) {
                (TemplateTarget::Caster, _) => self.place_on_user(template, envelope, actor),
                (TemplateTarget::Inherit, ActionTarget::User(target)) => {
                    self.place_on_user(template, envelope, target)
                }
                (TemplateTarget::Inherit, ActionTarget::Tile(tile)) => {
                    self.place_on_tile(template, envelope, tile)
                }
            }
        }
        debug!(
            battle = %self.state.id,
            actor = %actor,
            action = ?action.id,
            effects = profile.effects.len(),
            "action materialized"
        );
        Ok(())
    }

    fn place_on_user(&mut self, template: &EffectTemplate, envelope: EffectEnvelope, target: UserId) {
        if template.kind.is_ground_only() {
            if let Some(position) = self.state.user(target).map(|u| u.position) {
                self.state
                    .ground_effects
                    .push(template.realize_on_ground(envelope, position));
            }
            return;
        }
        self.push_effect(template.realize_on_user(envelope, target));
    }

    /// Lingering effects stay on the tile; instant ones hit whoever stands
    /// there, or the barrier blocking it.
    fn place_on_tile(&mut self, template: &EffectTemplate, envelope: EffectEnvelope, tile: Position) {
        if template.kind.is_ground_only() || envelope.rounds > 0 {
            self.state
                .ground_effects
                .push(template.realize_on_ground(envelope, tile));
            return;
        }
        let occupant = self.state.occupant(tile).map(|u| u.user_id);
        match occupant {
            Some(occupant) => {
                if self.friendly_fire_allows(envelope.friendly_fire, envelope.creator, occupant) {
                    self.push_effect(template.realize_on_user(envelope, occupant));
                }
            }
            None if template.kind == EffectKind::Damage => self.hit_barrier(&envelope, tile),
            None => {}
        }
    }

    fn friendly_fire_allows(&self, rule: FriendlyFire, creator: UserId, occupant: UserId) -> bool {
        match (self.state.user(creator), self.state.user(occupant)) {
            (Some(creator), Some(occupant)) => rule.allows(creator, occupant),
            _ => rule == FriendlyFire::All,
        }
    }

    fn hit_barrier(&mut self, envelope: &EffectEnvelope, tile: Position) {
        let amount = envelope.power().max(0.0);
        let Some(barrier) = self
            .state
            .ground_effects
            .iter_mut()
            .find(|g| g.position == tile && g.is_barrier())
        else {
            return;
        };
        let EffectKind::Barrier { remaining } = &mut barrier.kind else {
            return;
        };
        *remaining -= amount;
        let destroyed = *remaining <= 0.0;
        self.log.push(LogLine::damage(format!(
            "The barrier at {tile} takes {amount:.2} damage"
        )));
        if destroyed {
            self.log
                .push(LogLine::info(format!("The barrier at {tile} was destroyed")));
            self.state.ground_effects.retain(|g| !is_broken_barrier(g));
        }
    }

    // ========================================================================
    // Before the phases
    // ========================================================================

    /// Copies every tile hazard onto the combatant standing on it. Damage
    /// hazards on an empty tile wear down the barrier there instead.
    pub(super) fn apply_hazards(&mut self) {
        let mut transient = Vec::new();
        let mut barrier_hits = Vec::new();
        for ground in self
            .state
            .ground_effects
            .iter()
            .filter(|ground| !ground.kind.is_ground_only())
        {
            match self.state.occupant(ground.position) {
                Some(occupant) => {
                    let occupant = occupant.user_id;
                    if self.friendly_fire_allows(
                        ground.envelope.friendly_fire,
                        ground.envelope.creator,
                        occupant,
                    ) {
                        transient.push(ground.to_user_effect(occupant));
                    }
                }
                None if ground.kind == EffectKind::Damage => {
                    barrier_hits.push((ground.envelope.clone(), ground.position));
                }
                None => {}
            }
        }
        for effect in transient {
            self.push_effect(effect);
        }
        for (envelope, tile) in barrier_hits {
            self.hit_barrier(&envelope, tile);
        }
    }

    /// Leaves out effects whose target cannot be affected this pass.
    pub(super) fn screen_targets(&mut self) {
        for slot in 0..self.effects.len() {
            let effect = &self.effects[slot];
            let reason = match self.state.user(effect.target) {
                None => SkipReason::UnknownTarget,
                Some(user) if !user.is_active() => SkipReason::TargetInactive,
                Some(_) => continue,
            };
            if reason == SkipReason::UnknownTarget {
                warn!(
                    battle = %self.state.id,
                    effect = %effect.id(),
                    target = %effect.target,
                    "effect targets a user outside the battle"
                );
                self.log.push(LogLine::info(format!(
                    "{} was skipped: {} is not part of this battle",
                    effect.tag(),
                    effect.target
                )));
            }
            self.slots[slot] = Slot::Skipped(reason);
        }
    }

    // ========================================================================
    // After the phases
    // ========================================================================

    /// Writes the consequence map into the working state and logs the net
    /// result per combatant.
    pub(super) fn commit(&mut self) {
        let consequences = std::mem::take(&mut self.consequences);
        for Applied {
            user,
            damage,
            heal,
            absorbed,
            died,
        } in consequences.commit(&mut self.state)
        {
            let name = self.name(user);
            if absorbed > 0.0 {
                self.log
                    .push(LogLine::heal(format!("{name} absorbs {absorbed:.2} damage")));
            }
            if damage > 0.0 {
                self.log
                    .push(LogLine::damage(format!("{name} takes {damage:.2} damage")));
            }
            if heal > 0.0 {
                self.log.push(LogLine::heal(format!("{name} heals {heal:.2} HP")));
            }
            if died {
                self.log
                    .push(LogLine::damage(format!("{name} has been defeated")));
            }
        }
    }

    /// Ages durations and returns the surviving effects to the state.
    ///
    /// Effects that were already active lose one round; effects cast this
    /// pass keep their full duration. Instant and transient effects, expired
    /// slots and effects on combatants who are gone are dropped.
    pub(super) fn age(&mut self) {
        let effects = std::mem::take(&mut self.effects);
        let mut kept = Vec::with_capacity(effects.len());
        for (mut effect, slot) in effects.into_iter().zip(self.slots.drain(..)) {
            if slot != Slot::Live || effect.envelope.from_ground {
                continue;
            }
            if !self.state.user(effect.target).is_some_and(|u| u.is_active()) {
                continue;
            }
            if !age_envelope(&mut effect.envelope) {
                continue;
            }
            kept.push(effect);
        }
        self.state.user_effects = kept;
        let layers = modifier_layers(&self.state.user_effects);
        install_modifiers(&mut self.state, layers);

        let grounds = std::mem::take(&mut self.state.ground_effects);
        self.state.ground_effects = grounds
            .into_iter()
            .filter_map(|mut ground| {
                (!is_broken_barrier(&ground) && age_envelope(&mut ground.envelope))
                    .then_some(ground)
            })
            .collect();
    }
}

/// Sums stat and armor adjusters into one modifier layer per target.
pub(super) fn modifier_layers<'a>(
    effects: impl IntoIterator<Item = &'a UserEffect>,
) -> BTreeMap<UserId, StatModifiers> {
    let mut layers: BTreeMap<UserId, StatModifiers> = BTreeMap::new();
    for effect in effects {
        if !matches!(effect.kind, EffectKind::ArmorAdjust | EffectKind::StatAdjust) {
            continue;
        }
        let power = effect.power();
        let percent = effect.envelope.calculation != Calculation::Static;
        let bump = |modifier: &mut Modifier| {
            if percent {
                modifier.percent += power;
            } else {
                modifier.flat += power;
            }
        };
        let layer = layers.entry(effect.target).or_default();
        if effect.kind == EffectKind::ArmorAdjust {
            bump(&mut layer.armor);
            continue;
        }
        for stat in &effect.envelope.filter.stats {
            bump(&mut layer.stats[stat.index()]);
        }
        for general in &effect.envelope.filter.generals {
            bump(&mut layer.generals[general.index()]);
        }
    }
    layers
}

/// Replaces every combatant's modifier layer; those missing from `layers`
/// go back to their base values.
pub(super) fn install_modifiers(
    state: &mut BattleState,
    mut layers: BTreeMap<UserId, StatModifiers>,
) {
    for user in &mut state.users {
        user.modifiers = layers.remove(&user.user_id).unwrap_or_default();
    }
}

/// Returns whether the effect survives into the next pass.
fn age_envelope(envelope: &mut EffectEnvelope) -> bool {
    if envelope.was_active_before() {
        envelope.rounds = envelope.rounds.saturating_sub(1);
    }
    envelope.is_new = false;
    envelope.cast_this_round = false;
    envelope.rounds > 0
}

fn is_broken_barrier(ground: &GroundEffect) -> bool {
    matches!(ground.kind, EffectKind::Barrier { remaining } if remaining <= 0.0)
}
