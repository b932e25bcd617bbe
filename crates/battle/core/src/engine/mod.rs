//! Round resolution pipeline.
//!
//! The [`BattleEngine`] is the authoritative reducer for [`BattleState`]. One
//! call to [`BattleEngine::resolve`] validates a submitted action, runs every
//! effect through the fixed phase order and returns the next snapshot:
//!
//! 1. materialize the action (costs, new user and ground effects)
//! 2. copy tile hazards onto occupants
//! 3. (a) prevention and the stat modifier layer, (b) damage and death
//!    flags, (c) death-dependent effects, (d) everything else, then ground
//!    bookkeeping
//! 4. commit the consequence map, age durations, bump round and version
//!
//! The input snapshot is never mutated. A failed resolution leaves the caller
//! with exactly the state it submitted.

mod errors;
mod formula;
mod log;
mod pass;
mod phases;
mod prevention;

pub use errors::{ResolveError, SkipReason};
pub use log::{LogLine, LogTone};

use tracing::{debug, info};

use crate::action::{Action, legal_actions};
use crate::effect::EffectId;
use crate::env::BattleEnv;
use crate::error::ErrorContext;
use crate::state::{BattleState, UserId};
use pass::{RoundPass, Slot};

/// Everything one resolved action produced.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundOutcome {
    /// Snapshot to persist, with `round` and `version` incremented.
    pub state: BattleState,
    pub log: Vec<LogLine>,
    /// Combatants that died during this pass.
    pub deaths: Vec<UserId>,
    /// Effects left out of the pass without failing it.
    pub skipped: Vec<(EffectId, SkipReason)>,
}

/// Pure resolution engine bound to a catalog, RNG and configuration.
#[derive(Clone, Copy, Debug)]
pub struct BattleEngine<'e> {
    env: BattleEnv<'e>,
}

impl<'e> BattleEngine<'e> {
    pub fn new(env: BattleEnv<'e>) -> Self {
        Self { env }
    }

    pub fn env(&self) -> BattleEnv<'e> {
        self.env
    }

    /// Resolves `action` submitted by `actor` against `state`.
    ///
    /// Fails without side effects when stored effect data is malformed, the
    /// actor is not in the battle, or the action is not in the actor's legal
    /// set.
    pub fn resolve(
        &self,
        state: &BattleState,
        action: &Action,
        actor: UserId,
    ) -> Result<RoundOutcome, ResolveError> {
        let context = ErrorContext::new(state.round)
            .with_battle(state.id)
            .with_actor(actor);

        validate_effects(state, &context)?;
        if state.user(actor).is_none() {
            return Err(ResolveError::actor_not_found(context));
        }
        if !legal_actions(state, actor, &self.env).contains(action) {
            debug!(battle = %state.id, actor = %actor, ?action, "rejected unavailable action");
            return Err(ResolveError::invalid_action(*action, context));
        }

        let mut pass = RoundPass::new(self.env, state.clone());
        pass.materialize(actor, action)?;
        pass.apply_hazards();
        pass.screen_targets();

        pass.resolve_prevention();
        pass.resolve_modifiers();
        pass.resolve_damage();
        pass.resolve_lifesteal();
        pass.resolve_remaining();
        pass.resolve_ground();

        let skipped = pass
            .effects
            .iter()
            .zip(&pass.slots)
            .filter_map(|(effect, slot)| match slot {
                Slot::Skipped(reason) => Some((effect.id(), *reason)),
                _ => None,
            })
            .collect();

        pass.commit();
        pass.age();

        let RoundPass {
            mut state,
            log,
            deaths,
            ..
        } = pass;
        state.round += 1;
        state.version += 1;

        info!(
            battle = %state.id,
            round = state.round,
            version = state.version,
            deaths = deaths.len(),
            "round resolved"
        );
        Ok(RoundOutcome {
            state,
            log,
            deaths,
            skipped,
        })
    }
}

fn validate_effects(state: &BattleState, context: &ErrorContext) -> Result<(), ResolveError> {
    for effect in &state.user_effects {
        effect
            .validate()
            .map_err(|source| ResolveError::malformed(effect.id(), source, context.clone()))?;
    }
    for effect in &state.ground_effects {
        effect
            .validate()
            .map_err(|source| ResolveError::malformed(effect.id(), source, context.clone()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionId, ActionTarget, BasicAction, CombatAction, TargetRule};
    use crate::config::BattleConfig;
    use crate::effect::{
        Calculation, EffectKind, EffectSource, EffectTemplate, MalformedEffect, PoolMask,
        StatFilter,
    };
    use crate::env::{CatalogSnapshot, PcgRng, RngOracle};
    use crate::error::{BattleError, ErrorSeverity};
    use crate::state::{
        BattleId, BattleType, BattleUserState, JutsuId, LoadoutEntry, Position, StatModifiers,
        StatType, UserFlags,
    };

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    /// Always rolls the lowest d100 value.
    struct LuckyRng;

    impl RngOracle for LuckyRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            0
        }
    }

    fn duel() -> BattleState {
        let mut a = BattleUserState::new(ALICE, "alice");
        a.position = Position::new(2, 2);
        a.jutsus = (1..=7).map(|id| LoadoutEntry::new(JutsuId(id), 1)).collect();
        let mut b = BattleUserState::new(BOB, "bob");
        b.position = Position::new(3, 2);
        BattleState::new(BattleId(7), BattleType::Combat, 99)
            .with_user(a)
            .with_user(b)
    }

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new()
            .with_jutsu(
                JutsuId(1),
                CombatAction::new("Drain", TargetRule::Opponent, 1)
                    .with_effect(EffectTemplate::new(EffectKind::Damage, 100.0))
                    .with_effect(EffectTemplate::new(EffectKind::Lifesteal, 50.0).on_caster()),
            )
            .with_jutsu(
                JutsuId(2),
                CombatAction::new("Stunner", TargetRule::Opponent, 1).with_effect(
                    EffectTemplate::new(EffectKind::Stun, 100.0).with_rounds(2),
                ),
            )
            .with_jutsu(
                JutsuId(3),
                CombatAction::new("Mend", TargetRule::Character, 1)
                    .with_effect(EffectTemplate::new(EffectKind::HealPrevent, 100.0).with_rounds(2))
                    .with_effect(EffectTemplate::new(EffectKind::Heal, 30.0)),
            )
            .with_jutsu(
                JutsuId(4),
                CombatAction::new("Strike", TargetRule::Opponent, 1)
                    .with_effect(EffectTemplate::new(EffectKind::Damage, 40.0)),
            )
            .with_jutsu(
                JutsuId(5),
                CombatAction::new("Bolster", TargetRule::Character, 1).with_effect(
                    EffectTemplate::new(EffectKind::StatAdjust, 20.0)
                        .with_rounds(2)
                        .with_filter(StatFilter::default().with_stats([StatType::Ninjutsu])),
                ),
            )
            .with_jutsu(
                JutsuId(6),
                CombatAction::new("Curse", TargetRule::Opponent, 1).with_effect(
                    EffectTemplate::new(EffectKind::HealPrevent, 100.0).with_rounds(2),
                ),
            )
            .with_jutsu(
                JutsuId(7),
                CombatAction::new("Shadow Clone", TargetRule::EmptyGround, 2)
                    .with_effect(EffectTemplate::new(EffectKind::Clone, 50.0)),
            )
    }

    fn use_jutsu(id: u32, target: UserId) -> Action {
        Action::new(ActionId::Jutsu(JutsuId(id)), ActionTarget::User(target))
    }

    /// Adds an effect that has been active since an earlier round.
    fn persisted(
        state: &mut BattleState,
        template: EffectTemplate,
        creator: UserId,
        target: UserId,
    ) -> EffectId {
        let id = state.allocate_effect_id();
        let mut envelope = template.envelope(id, creator, 1, 0, EffectSource::Basic);
        envelope.is_new = false;
        envelope.cast_this_round = false;
        state.user_effects.push(template.realize_on_user(envelope, target));
        id
    }

    /// Adds a tile effect that has been in place since an earlier round.
    fn persisted_ground(state: &mut BattleState, template: EffectTemplate, tile: Position) {
        let id = state.allocate_effect_id();
        let mut envelope = template.envelope(id, ALICE, 1, 0, EffectSource::Basic);
        envelope.is_new = false;
        envelope.cast_this_round = false;
        state
            .ground_effects
            .push(template.realize_on_ground(envelope, tile));
    }

    fn health(state: &BattleState, user: UserId) -> f64 {
        state.user(user).map_or(f64::NAN, |u| u.pools.health.current)
    }

    fn logged(outcome: &RoundOutcome, needle: &str) -> bool {
        outcome.log.iter().any(|line| line.text.contains(needle))
    }

    #[test]
    fn lifesteal_is_suppressed_when_the_victim_dies() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        if let Some(bob) = state.user_mut(BOB) {
            bob.pools.health.current = 50.0;
        }

        let outcome = engine
            .resolve(&state, &use_jutsu(1, BOB), ALICE)
            .expect("resolve");
        assert_eq!(health(&outcome.state, BOB), 0.0);
        assert_eq!(outcome.deaths, vec![BOB]);
        assert_eq!(health(&outcome.state, ALICE), 100.0);
        assert!(!logged(&outcome, "steals"));
        assert!(outcome.state.is_finished());
    }

    #[test]
    fn lifesteal_heals_from_surviving_victims() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        if let Some(bob) = state.user_mut(BOB) {
            bob.pools.health.max = 300.0;
            bob.pools.health.current = 300.0;
        }
        if let Some(alice) = state.user_mut(ALICE) {
            alice.pools.health.current = 20.0;
        }

        let outcome = engine
            .resolve(&state, &use_jutsu(1, BOB), ALICE)
            .expect("resolve");
        assert_eq!(health(&outcome.state, BOB), 200.0);
        assert_eq!(health(&outcome.state, ALICE), 70.0);
        assert!(logged(&outcome, "alice steals 50.00 HP"));
    }

    #[test]
    fn prevention_counts_down_and_blocks_until_it_runs_out() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        let guard = persisted(
            &mut state,
            EffectTemplate::new(EffectKind::StunPrevent, 100.0).with_rounds(2),
            BOB,
            BOB,
        );

        let first = engine
            .resolve(&state, &use_jutsu(2, BOB), ALICE)
            .expect("first");
        assert!(logged(&first, "bob resisted being stunned"));
        let remaining: Vec<_> = first.state.effects_on(BOB).collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), guard);
        assert_eq!(remaining[0].envelope.rounds, 1);

        let second = engine
            .resolve(&first.state, &use_jutsu(2, BOB), ALICE)
            .expect("second");
        assert!(logged(&second, "bob resisted being stunned"));
        assert_eq!(second.state.effects_on(BOB).count(), 0);

        let third = engine
            .resolve(&second.state, &use_jutsu(2, BOB), ALICE)
            .expect("third");
        let stun: Vec<_> = third.state.effects_on(BOB).collect();
        assert_eq!(stun.len(), 1);
        assert_eq!(stun[0].kind, EffectKind::Stun);
        assert!(logged(&third, "bob is stunned for the next 2 rounds"));
    }

    #[test]
    fn heal_prevent_cast_this_round_does_not_block_the_same_heal() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        if let Some(bob) = state.user_mut(BOB) {
            bob.pools.health.current = 50.0;
        }

        let outcome = engine
            .resolve(&state, &use_jutsu(3, BOB), ALICE)
            .expect("resolve");
        assert_eq!(health(&outcome.state, BOB), 80.0);
        assert!(logged(&outcome, "bob cannot be healed for the next 2 rounds"));

        let heal = Action::basic(BasicAction::BasicHeal, ActionTarget::User(BOB));
        let next = engine
            .resolve(&outcome.state, &heal, ALICE)
            .expect("basic heal");
        assert_eq!(health(&next.state, BOB), 80.0);
        assert!(logged(&next, "bob is prevented from healing"));
    }

    #[test]
    fn absorb_turns_part_of_a_hit_into_health() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        persisted(
            &mut state,
            EffectTemplate::new(
                EffectKind::Absorb {
                    pools: PoolMask::HEALTH,
                },
                10.0,
            )
            .with_rounds(3),
            BOB,
            BOB,
        );

        let outcome = engine
            .resolve(&state, &use_jutsu(4, BOB), ALICE)
            .expect("resolve");
        // 100 - (40 - 10) + 10
        assert_eq!(health(&outcome.state, BOB), 80.0);
    }

    #[test]
    fn reflect_returns_damage_to_its_source() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        persisted(
            &mut state,
            EffectTemplate::new(EffectKind::Reflect, 50.0)
                .with_calculation(Calculation::Percentage)
                .with_rounds(3),
            BOB,
            BOB,
        );

        let outcome = engine
            .resolve(&state, &use_jutsu(4, BOB), ALICE)
            .expect("resolve");
        assert_eq!(health(&outcome.state, BOB), 80.0);
        assert_eq!(health(&outcome.state, ALICE), 80.0);
        assert!(logged(&outcome, "bob reflects 20.00 damage back to alice"));
    }

    #[test]
    fn successful_flee_removes_the_combatant() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &LuckyRng, &config));
        let state = duel();

        let flee = Action::basic(BasicAction::Flee, ActionTarget::User(ALICE));
        let outcome = engine.resolve(&state, &flee, ALICE).expect("resolve");
        let alice = outcome.state.user(ALICE).expect("alice");
        assert!(alice.flags.contains(UserFlags::FLED_BATTLE));
        assert!(logged(&outcome, "alice manages to flee the battle!"));
        assert!(outcome.state.is_finished());
    }

    #[test]
    fn moving_relocates_the_actor() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let state = duel();
        let destination = legal_actions(&state, ALICE, &engine.env())
            .into_iter()
            .find_map(|action| match (action.id, action.target) {
                (ActionId::Basic(BasicAction::Move), ActionTarget::Tile(tile)) => Some(tile),
                _ => None,
            })
            .expect("a free neighbouring tile");

        let step = Action::basic(BasicAction::Move, ActionTarget::Tile(destination));
        let outcome = engine.resolve(&state, &step, ALICE).expect("resolve");
        assert_eq!(outcome.state.user(ALICE).map(|u| u.position), Some(destination));
        assert!(outcome.state.ground_effects.is_empty());
        assert_eq!(outcome.state.round, state.round + 1);
        assert_eq!(outcome.state.version, state.version + 1);
    }

    #[test]
    fn unavailable_actions_are_rejected() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let state = duel();
        let before = state.clone();

        let err = engine
            .resolve(&state, &use_jutsu(9, BOB), ALICE)
            .expect_err("unknown jutsu");
        assert!(matches!(err, ResolveError::InvalidAction { .. }));
        assert_eq!(err.error_code(), "RESOLVE_INVALID_ACTION");
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert_eq!(state, before);

        let err = engine
            .resolve(&state, &use_jutsu(4, BOB), UserId(42))
            .expect_err("stranger");
        assert!(matches!(err, ResolveError::ActorNotFound { .. }));
    }

    #[test]
    fn malformed_stored_effects_fail_the_pass() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        let bad = persisted(
            &mut state,
            EffectTemplate::new(EffectKind::Clear, 100.0).with_rounds(3),
            BOB,
            ALICE,
        );

        let err = engine
            .resolve(&state, &Action::wait(ALICE), ALICE)
            .expect_err("lingering clear");
        match err {
            ResolveError::MalformedEffect { effect, source, .. } => {
                assert_eq!(effect, bad);
                assert_eq!(source, MalformedEffect::LingeringClear);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn effects_on_strangers_are_skipped_and_dropped() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        let stray = persisted(
            &mut state,
            EffectTemplate::new(EffectKind::Damage, 10.0).with_rounds(3),
            ALICE,
            UserId(77),
        );

        let outcome = engine
            .resolve(&state, &Action::wait(ALICE), ALICE)
            .expect("resolve");
        assert_eq!(outcome.skipped, vec![(stray, SkipReason::UnknownTarget)]);
        assert!(outcome.state.user_effects.is_empty());
        assert_eq!(health(&outcome.state, ALICE), 100.0);
    }

    #[test]
    fn armor_adjust_counts_only_while_it_is_active() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        persisted(
            &mut state,
            EffectTemplate::new(EffectKind::ArmorAdjust, 10.0).with_rounds(1),
            BOB,
            BOB,
        );

        let first = engine
            .resolve(&state, &use_jutsu(4, BOB), ALICE)
            .expect("first");
        // 40 damage less 10 armor.
        assert_eq!(health(&first.state, BOB), 70.0);
        assert_eq!(first.state.effects_on(BOB).count(), 0);
        assert_eq!(
            first.state.user(BOB).map(|u| u.modifiers),
            Some(StatModifiers::default())
        );

        let second = engine
            .resolve(&first.state, &use_jutsu(4, BOB), ALICE)
            .expect("second");
        assert_eq!(health(&second.state, BOB), 30.0);
    }

    #[test]
    fn lingering_hazards_wear_down_barriers() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        let tile = Position::new(5, 2);
        persisted_ground(
            &mut state,
            EffectTemplate::new(EffectKind::Barrier { remaining: 0.0 }, 50.0).with_rounds(5),
            tile,
        );
        persisted_ground(
            &mut state,
            EffectTemplate::new(EffectKind::Damage, 25.0).with_rounds(3),
            tile,
        );

        let first = engine
            .resolve(&state, &Action::wait(ALICE), ALICE)
            .expect("first");
        assert_eq!(
            first.state.barrier_at(tile).map(|b| b.kind.clone()),
            Some(EffectKind::Barrier { remaining: 25.0 })
        );
        assert!(logged(&first, "The barrier at [2, 5] takes 25.00 damage"));

        let second = engine
            .resolve(&first.state, &Action::wait(ALICE), ALICE)
            .expect("second");
        assert!(second.state.barrier_at(tile).is_none());
        assert!(logged(&second, "The barrier at [2, 5] was destroyed"));
        assert_eq!(health(&second.state, ALICE), 100.0);
        assert_eq!(health(&second.state, BOB), 100.0);
    }

    #[test]
    fn buff_prevent_blocks_new_buffs_and_counts_down() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        let guard = persisted(
            &mut state,
            EffectTemplate::new(EffectKind::BuffPrevent, 100.0).with_rounds(2),
            BOB,
            BOB,
        );

        let outcome = engine
            .resolve(&state, &use_jutsu(5, BOB), ALICE)
            .expect("resolve");
        assert!(logged(&outcome, "bob is protected from statadjust"));
        let remaining: Vec<_> = outcome.state.effects_on(BOB).collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), guard);
        assert_eq!(remaining[0].envelope.rounds, 1);
        assert_eq!(
            outcome.state.user(BOB).map(|u| u.modifiers),
            Some(StatModifiers::default())
        );
    }

    #[test]
    fn debuff_prevent_blocks_new_debuffs_and_counts_down() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        let guard = persisted(
            &mut state,
            EffectTemplate::new(EffectKind::DebuffPrevent, 100.0).with_rounds(2),
            BOB,
            BOB,
        );

        let outcome = engine
            .resolve(&state, &use_jutsu(2, BOB), ALICE)
            .expect("resolve");
        assert!(logged(&outcome, "bob is protected from stun"));
        let remaining: Vec<_> = outcome.state.effects_on(BOB).collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), guard);
        assert_eq!(remaining[0].envelope.rounds, 1);
    }

    #[test]
    fn lingering_heal_lands_before_a_fresh_heal_prevent_takes_hold() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let mut state = duel();
        if let Some(bob) = state.user_mut(BOB) {
            bob.pools.health.current = 50.0;
        }
        let regen = persisted(
            &mut state,
            EffectTemplate::new(EffectKind::Heal, 10.0).with_rounds(3),
            BOB,
            BOB,
        );

        let cursed = engine
            .resolve(&state, &use_jutsu(6, BOB), ALICE)
            .expect("curse");
        assert_eq!(health(&cursed.state, BOB), 60.0);
        assert!(logged(&cursed, "bob cannot be healed for the next 2 rounds"));

        let next = engine
            .resolve(&cursed.state, &Action::wait(ALICE), ALICE)
            .expect("wait");
        assert_eq!(health(&next.state, BOB), 60.0);
        assert!(logged(&next, "bob is prevented from healing"));
        let heal = next.state.effects_on(BOB).find(|e| e.id() == regen);
        assert_eq!(heal.map(|e| e.envelope.rounds), Some(1));
    }

    #[test]
    fn clones_split_the_caster() {
        let catalog = catalog();
        let config = BattleConfig::default();
        let engine = BattleEngine::new(BattleEnv::new(&catalog, &PcgRng, &config));
        let state = duel();
        let tile = Position::new(1, 2);

        let cast = Action::new(ActionId::Jutsu(JutsuId(7)), ActionTarget::Tile(tile));
        let outcome = engine.resolve(&state, &cast, ALICE).expect("resolve");
        assert!(logged(&outcome, "alice creates a clone at [2, 1]"));
        assert_eq!(outcome.state.users.len(), 3);

        let alice = outcome.state.user(ALICE).expect("alice");
        assert_eq!(alice.pools.health.max, 50.0);
        assert_eq!(alice.pools.health.current, 50.0);
        let copy = outcome.state.user(UserId(3)).expect("clone");
        assert_eq!(copy.position, tile);
        assert_eq!(copy.controller_id, ALICE);
        assert!(!copy.flags.contains(UserFlags::IS_ORIGINAL));
        assert!(outcome.state.ground_effects.is_empty());
        assert!(!outcome.state.is_finished());
    }
}
