//! Effect handlers, grouped by the phase they run in.
//!
//! Handlers only read the working state and write into the consequence map,
//! the prevention map and the log. Apart from the modifier layer, which is
//! derived from active effects, nothing reaches combatants before
//! [`RoundPass::commit`](super::pass::RoundPass::commit).

use super::formula;
use super::log::LogLine;
use super::pass::{RoundPass, install_modifiers, modifier_layers};
use super::prevention::Prevented;
use crate::consequence::{DamageRecord, HealRecord, Spawn};
use crate::effect::{Calculation, EffectKind, Polarity, ResolutionPhase, UserEffect};
use crate::state::{PoolKind, Position, UserId};

impl RoundPass<'_> {
    /// Seal and buff/debuff gates shared by every handler.
    ///
    /// Returns `false` when the effect must not apply this pass. Effects cast
    /// this pass that are blocked here are dropped for good.
    fn passes_gates(&mut self, slot: usize) -> bool {
        let effect = &self.effects[slot];
        let target = effect.target;
        let sealed = effect.envelope.source.is_bloodline()
            && self.prevented.has(target, Prevented::BLOODLINE);
        let blocked = match effect.polarity() {
            Polarity::Buff => self.prevented.has(target, Prevented::BUFF),
            Polarity::Debuff => self.prevented.has(target, Prevented::DEBUFF),
            Polarity::Neutral => false,
        };
        if !sealed && !blocked {
            return true;
        }

        let fresh = !effect.envelope.was_active_before();
        let tag = effect.tag();
        let name = self.name(target);
        let text = if sealed {
            format!("{name}'s bloodline is sealed, {tag} has no effect")
        } else {
            format!("{name} is protected from {tag}")
        };
        if fresh {
            self.log.push(LogLine::info(text));
            self.expire(slot);
        }
        false
    }

    /// `"<name> <what> for the next N rounds"`, only when the effect was cast
    /// this pass and lasts.
    fn announce(&mut self, effect: &UserEffect, what: &str) {
        if effect.envelope.was_active_before() || effect.envelope.rounds == 0 {
            return;
        }
        let name = self.name(effect.target);
        self.log.push(LogLine::info(format!(
            "{name} {what} for the next {} rounds",
            effect.envelope.rounds
        )));
    }

    fn is_protected(&self, user: UserId, flag: Prevented) -> bool {
        self.prevented.has(user, flag)
    }

    // ========================================================================
    // (a) Prevention
    // ========================================================================

    pub(super) fn resolve_prevention(&mut self) {
        let slots = self.live_slots(|kind| kind.phase() == ResolutionPhase::Prevention);

        // Only effects active before this pass protect during it.
        for &slot in &slots {
            let effect = &self.effects[slot];
            if !effect.envelope.was_active_before() {
                continue;
            }
            if let Some(flag) = Prevented::for_kind(&effect.kind) {
                self.prevented.insert(effect.target, flag);
            }
        }

        for slot in slots {
            if self.effects[slot].envelope.was_active_before() || !self.passes_gates(slot) {
                continue;
            }
            let effect = self.effects[slot].clone();
            let Some(flag) = Prevented::for_kind(&effect.kind) else {
                continue;
            };
            let name = self.name(effect.target);
            let success = self.roll(effect.id(), effect.tag() as u32, effect.power());

            if flag == Prevented::BLOODLINE {
                if success && self.is_protected(effect.target, Prevented::SEAL) {
                    self.log
                        .push(LogLine::info(format!("{name} resisted bloodline sealing")));
                    self.expire(slot);
                } else if success {
                    self.announce(&effect, flag.describe());
                } else {
                    self.log
                        .push(LogLine::info(format!("{name}'s bloodline was not sealed")));
                    self.expire(slot);
                }
            } else if success {
                self.announce(&effect, flag.describe());
            } else {
                self.expire(slot);
            }
        }
    }

    /// Installs the modifier layer of this pass on every combatant.
    ///
    /// Only stat and armor adjusters that were active before the pass and
    /// pass the buff/debuff gates count. Combatants without one go back to
    /// their base values.
    pub(super) fn resolve_modifiers(&mut self) {
        let mut active = Vec::new();
        for slot in self.live_slots(|kind| {
            matches!(kind, EffectKind::ArmorAdjust | EffectKind::StatAdjust)
        }) {
            if self.effects[slot].envelope.was_active_before() && self.passes_gates(slot) {
                active.push(slot);
            }
        }
        let layers = modifier_layers(active.iter().map(|&slot| &self.effects[slot]));
        install_modifiers(&mut self.state, layers);
    }

    // ========================================================================
    // (b) Damage
    // ========================================================================

    pub(super) fn resolve_damage(&mut self) {
        for slot in self.live_slots(|kind| *kind == EffectKind::Damage) {
            if !self.passes_gates(slot) {
                continue;
            }
            let effect = &self.effects[slot];
            let Some(target) = self.state.user(effect.target) else {
                continue;
            };
            let origin = self.state.user(effect.envelope.creator);
            let raw = formula::raw_damage(effect, origin, target);
            let armor = target.effective_armor().max(0.0) * self.env.config().armor_reduction;
            self.consequences.record_damage(DamageRecord {
                effect: effect.id(),
                slot,
                source: effect.envelope.creator,
                target: effect.target,
                amount: (raw - armor).max(0.0),
            });
            self.consequences.entry(effect.target);
        }

        for slot in self.live_slots(|kind| *kind == EffectKind::OneHitKill) {
            if self.passes_gates(slot) {
                self.one_hit_kill(slot);
            }
        }

        for slot in self.live_slots(|kind| {
            matches!(
                kind,
                EffectKind::DamageGivenAdjust
                    | EffectKind::DamageTakenAdjust
                    | EffectKind::Absorb { .. }
                    | EffectKind::Reflect
            )
        }) {
            if !self.passes_gates(slot) {
                continue;
            }
            let effect = self.effects[slot].clone();
            let what = match effect.kind {
                EffectKind::DamageGivenAdjust => {
                    format!("damage given is {}", adverb(effect.power()))
                }
                EffectKind::DamageTakenAdjust => {
                    format!("damage taken is {}", adverb(effect.power()))
                }
                EffectKind::Absorb { .. } => "absorbs damage".to_owned(),
                _ => "reflects damage".to_owned(),
            };
            self.announce(&effect, &what);
        }

        // Adjusters only work from the pass after they were cast. Given and
        // taken adjustments run before absorb and reflect see the hits.
        let adjusters = |kind: &EffectKind| {
            matches!(
                kind,
                EffectKind::DamageGivenAdjust | EffectKind::DamageTakenAdjust
            )
        };
        for slot in self.live_slots(adjusters) {
            if self.effects[slot].envelope.was_active_before() && self.passes_gates(slot) {
                self.adjust_damage(slot);
            }
        }
        for slot in self.live_slots(|kind| matches!(kind, EffectKind::Absorb { .. })) {
            if self.effects[slot].envelope.was_active_before() && self.passes_gates(slot) {
                self.absorb(slot);
            }
        }
        for slot in self.live_slots(|kind| *kind == EffectKind::Reflect) {
            if self.effects[slot].envelope.was_active_before() && self.passes_gates(slot) {
                self.reflect(slot);
            }
        }

        self.flag_deaths();
    }

    fn one_hit_kill(&mut self, slot: usize) {
        let effect = self.effects[slot].clone();
        let name = self.name(effect.target);
        if !self.roll(effect.id(), effect.tag() as u32, effect.power()) {
            self.log.push(LogLine::info(format!(
                "{name} was lucky not to get killed!"
            )));
            return;
        }
        if self.is_protected(effect.target, Prevented::ONE_HIT_KILL) {
            self.log
                .push(LogLine::info(format!("{name} resisted being killed")));
            self.expire(slot);
            return;
        }
        let Some(target) = self.state.user(effect.target) else {
            return;
        };
        let remaining = self.consequences.projected_health(target).max(0.0);
        self.consequences.entry(effect.target).extra_damage += remaining;
        self.log.push(LogLine::damage(format!("{name} was killed")));
    }

    /// Damage-given and damage-taken adjusters, scaled by how well their
    /// stats match the damaging effect's.
    fn adjust_damage(&mut self, slot: usize) {
        let adjuster = &self.effects[slot];
        let power = adjuster.power();
        let given = adjuster.kind == EffectKind::DamageGivenAdjust;
        for record in self.consequences.damage_records_mut() {
            let relevant = if given {
                record.source == adjuster.target
            } else {
                record.target == adjuster.target
            };
            if !relevant {
                continue;
            }
            let ratio = self.effects[record.slot]
                .envelope
                .filter
                .efficiency_ratio(&adjuster.envelope.filter);
            let change = match adjuster.envelope.calculation {
                Calculation::Static => power,
                _ => record.amount * power / 100.0,
            } * ratio;
            let adjusted = if given {
                record.amount + change
            } else {
                record.amount - change
            };
            record.amount = adjusted.max(0.0);
        }
    }

    /// Share of each incoming hit that the adjuster at `slot` takes out of
    /// the ledger.
    fn intercepted(&mut self, slot: usize) -> Vec<(DamageRecord, f64)> {
        let adjuster = &self.effects[slot];
        let power = adjuster.power();
        let mut taken = Vec::new();
        for record in self.consequences.damage_records_mut() {
            if record.target != adjuster.target || record.amount <= 0.0 {
                continue;
            }
            let ratio = self.effects[record.slot]
                .envelope
                .filter
                .efficiency_ratio(&adjuster.envelope.filter);
            let share = match adjuster.envelope.calculation {
                Calculation::Static => power.min(record.amount),
                _ => record.amount * power / 100.0,
            } * ratio;
            let share = share.clamp(0.0, record.amount);
            record.amount -= share;
            if share > 0.0 {
                taken.push((*record, share));
            }
        }
        taken
    }

    fn absorb(&mut self, slot: usize) {
        let EffectKind::Absorb { pools } = self.effects[slot].kind else {
            return;
        };
        let target = self.effects[slot].target;
        let total: f64 = self.intercepted(slot).iter().map(|(_, share)| share).sum();
        if total <= 0.0 || pools.is_empty() {
            return;
        }
        let per_pool = total / f64::from(pools.len());
        let entry = self.consequences.entry(target);
        for pool in pools.kinds() {
            entry.absorb.add(pool, per_pool);
        }
    }

    fn reflect(&mut self, slot: usize) {
        let target = self.effects[slot].target;
        for (record, share) in self.intercepted(slot) {
            self.consequences.entry(record.source).extra_damage += share;
            let name = self.name(target);
            let source = self.name(record.source);
            self.log.push(LogLine::damage(format!(
                "{name} reflects {share:.2} damage back to {source}"
            )));
        }
    }

    /// Marks everyone whose health would reach zero as died.
    fn flag_deaths(&mut self) {
        for user in self.state.users.iter().filter(|u| u.is_active()) {
            if self.consequences.projected_health(user) <= 0.0 {
                self.consequences.entry(user.user_id).died = true;
                self.deaths.push(user.user_id);
            }
        }
    }

    // ========================================================================
    // (c) Death dependent
    // ========================================================================

    pub(super) fn resolve_lifesteal(&mut self) {
        for slot in self.live_slots(|kind| *kind == EffectKind::Lifesteal) {
            if !self.passes_gates(slot) {
                continue;
            }
            let effect = &self.effects[slot];
            let stealer = effect.target;
            if self.consequences.is_dead(stealer) {
                continue;
            }
            let name = self.name(stealer);
            if self.is_protected(stealer, Prevented::HEAL) {
                self.log
                    .push(LogLine::info(format!("{name}'s lifesteal is prevented")));
                continue;
            }
            let share = effect.power() / 100.0;
            let stolen: f64 = self
                .consequences
                .damage_records()
                .iter()
                .filter(|r| r.source == stealer && !self.consequences.is_dead(r.target))
                .map(|r| r.amount * share)
                .sum();
            if stolen <= 0.0 {
                continue;
            }
            self.consequences.record_heal(HealRecord {
                effect: effect.id(),
                slot,
                source: stealer,
                target: stealer,
                amount: stolen,
            });
            self.log
                .push(LogLine::heal(format!("{name} steals {stolen:.2} HP")));
        }
    }

    // ========================================================================
    // (d) Remaining
    // ========================================================================

    pub(super) fn resolve_remaining(&mut self) {
        for slot in self.live_slots(|kind| *kind == EffectKind::Heal) {
            if self.passes_gates(slot) {
                self.heal(slot);
            }
        }

        for slot in self.live_slots(|kind| *kind == EffectKind::HealAdjust) {
            if self.passes_gates(slot) {
                self.adjust_heal(slot);
            }
        }

        for slot in self.live_slots(|kind| {
            kind.phase() == ResolutionPhase::Remaining
                && !matches!(kind, EffectKind::Heal | EffectKind::HealAdjust)
        }) {
            // An earlier clear in this loop may have expired the slot.
            if !self.is_live(slot) || !self.passes_gates(slot) {
                continue;
            }
            let effect = self.effects[slot].clone();
            match effect.kind {
                EffectKind::ArmorAdjust | EffectKind::StatAdjust => self.adjust_stats(&effect),
                EffectKind::PoolCostAdjust { pools } => {
                    let names: Vec<&str> = pools
                        .kinds()
                        .map(|pool| match pool {
                            PoolKind::Health => "health",
                            PoolKind::Chakra => "chakra",
                            PoolKind::Stamina => "stamina",
                        })
                        .collect();
                    let what = format!("{} cost is {}", names.join(", "), adverb(effect.power()));
                    self.announce(&effect, &what);
                }
                EffectKind::Stealth => self.announce(&effect, "is stealthed"),
                EffectKind::Clear => self.clear(slot, &effect),
                EffectKind::Stun => self.stun(slot, &effect),
                EffectKind::Flee => self.flee(&effect),
                EffectKind::Rob => self.rob(&effect),
                _ => {}
            }
        }
    }

    fn heal(&mut self, slot: usize) {
        let effect = &self.effects[slot];
        let target_id = effect.target;
        if self.consequences.is_dead(target_id) {
            return;
        }
        let Some(target) = self.state.user(target_id) else {
            return;
        };
        if self.is_protected(target_id, Prevented::HEAL) {
            let name = target.username.clone();
            let fresh = !effect.envelope.was_active_before();
            self.log
                .push(LogLine::info(format!("{name} is prevented from healing")));
            if fresh {
                self.expire(slot);
            }
            return;
        }
        let amount = match effect.envelope.calculation {
            Calculation::Static => effect.power(),
            _ => target.pools.health.max * effect.power() / 100.0,
        };
        self.consequences.record_heal(HealRecord {
            effect: effect.id(),
            slot,
            source: effect.envelope.creator,
            target: target_id,
            amount: amount.max(0.0),
        });
        self.consequences.entry(target_id);
    }

    /// Adjusts healing given by the adjuster's target.
    fn adjust_heal(&mut self, slot: usize) {
        let adjuster = self.effects[slot].clone();
        if adjuster.envelope.was_active_before() {
            let power = adjuster.power();
            for record in self.consequences.heal_records_mut() {
                if record.source != adjuster.target {
                    continue;
                }
                let ratio = self.effects[record.slot]
                    .envelope
                    .filter
                    .efficiency_ratio(&adjuster.envelope.filter);
                let change = match adjuster.envelope.calculation {
                    Calculation::Static => power,
                    _ => record.amount * power / 100.0,
                };
                record.amount = (record.amount + change * ratio).max(0.0);
            }
        }
        let what = format!("healing capacity is {}", adverb(adjuster.power()));
        self.announce(&adjuster, &what);
    }

    /// Stat and armor adjusters already sit in the modifier layer built by
    /// [`resolve_modifiers`](Self::resolve_modifiers); this only logs them.
    fn adjust_stats(&mut self, effect: &UserEffect) {
        let power = effect.power();
        let what = if effect.kind == EffectKind::ArmorAdjust {
            format!("armor is {}", adverb(power))
        } else {
            let affected: Vec<String> = effect
                .envelope
                .filter
                .stats
                .iter()
                .map(ToString::to_string)
                .chain(effect.envelope.filter.generals.iter().map(ToString::to_string))
                .collect();
            format!("{} is {}", affected.join(", "), adverb(power))
        };
        self.announce(effect, &what);
    }

    fn clear(&mut self, slot: usize, effect: &UserEffect) {
        if !self.roll(effect.id(), effect.tag() as u32, effect.power()) {
            return;
        }
        for other in 0..self.effects.len() {
            if other != slot && self.effects[other].target == effect.target && self.is_live(other) {
                self.expire(other);
            }
        }
        let name = self.name(effect.target);
        self.log.push(LogLine::info(format!(
            "{name} was cleared of all status effects"
        )));
    }

    fn stun(&mut self, slot: usize, effect: &UserEffect) {
        if effect.envelope.was_active_before() {
            return;
        }
        let name = self.name(effect.target);
        if !self.roll(effect.id(), effect.tag() as u32, effect.power()) {
            self.log.push(LogLine::info(format!(
                "{name} manages not to be stunned!"
            )));
            self.expire(slot);
        } else if self.is_protected(effect.target, Prevented::STUN) {
            self.log
                .push(LogLine::info(format!("{name} resisted being stunned")));
            self.expire(slot);
        } else {
            self.announce(effect, "is stunned");
        }
    }

    fn flee(&mut self, effect: &UserEffect) {
        let name = self.name(effect.target);
        if !self.roll(effect.id(), effect.tag() as u32, effect.power()) {
            self.log
                .push(LogLine::info(format!("{name} fails to flee the battle!")));
        } else if self.is_protected(effect.target, Prevented::FLEE) {
            self.log
                .push(LogLine::info(format!("{name} is prevented from fleeing")));
        } else {
            self.consequences.entry(effect.target).fled = true;
            self.log.push(LogLine::info(format!(
                "{name} manages to flee the battle!"
            )));
        }
    }

    fn rob(&mut self, effect: &UserEffect) {
        let name = self.name(effect.target);
        if self.is_protected(effect.target, Prevented::ROB) {
            self.log
                .push(LogLine::info(format!("{name} resists being robbed")));
            return;
        }
        let creator = effect.envelope.creator;
        let (Some(origin), Some(target)) = (self.state.user(creator), self.state.user(effect.target))
        else {
            return;
        };
        let pending = self.consequences.get(effect.target).map_or(0.0, |c| c.money);
        let available = (target.money + pending).max(0.0);
        let power = effect.power();
        let stolen = match effect.envelope.calculation {
            Calculation::Static => power,
            Calculation::Percentage => available * power / 100.0,
            Calculation::Formula => available * formula::rob_ratio(effect, origin, target) / 100.0,
        }
        .clamp(0.0, available);
        let thief = origin.username.clone();

        self.consequences.entry(effect.target).money -= stolen;
        self.consequences.entry(creator).money += stolen;
        self.log.push(LogLine::info(format!(
            "{thief} stole {stolen:.2} ryo from {name}"
        )));
    }

    // ========================================================================
    // Ground
    // ========================================================================

    pub(super) fn resolve_ground(&mut self) {
        let moves: Vec<(UserId, Position)> = self
            .state
            .ground_effects
            .iter()
            .filter(|g| g.kind == EffectKind::Move && g.envelope.cast_this_round)
            .map(|g| (g.envelope.creator, g.position))
            .collect();
        for (creator, position) in moves {
            if self.consequences.is_dead(creator) {
                continue;
            }
            self.consequences.entry(creator).moved_to = Some(position);
            let name = self.name(creator);
            self.log
                .push(LogLine::info(format!("{name} moves to {position}")));
        }

        let clones: Vec<(UserId, Position, f64)> = self
            .state
            .ground_effects
            .iter()
            .filter(|g| g.kind == EffectKind::Clone && g.envelope.cast_this_round)
            .map(|g| (g.envelope.creator, g.position, g.envelope.power()))
            .collect();
        for (creator, position, power) in clones {
            if power <= 0.0 || self.consequences.is_dead(creator) {
                continue;
            }
            let name = self.name(creator);
            if !self.state.is_empty_tile(position) {
                self.log.push(LogLine::info(format!(
                    "{name} cannot create a clone at {position}"
                )));
                continue;
            }
            self.consequences.record_spawn(Spawn {
                creator,
                position,
                ratio: power / 100.0,
            });
            self.log
                .push(LogLine::info(format!("{name} creates a clone at {position}")));
        }
    }
}

fn adverb(power: f64) -> String {
    let direction = if power > 0.0 { "increased" } else { "decreased" };
    format!("{direction} by {}", power.abs())
}
