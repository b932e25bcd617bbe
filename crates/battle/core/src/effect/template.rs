//! Effect templates: the catalog side of an effect before it is cast.

use super::{
    Calculation, EffectEnvelope, EffectId, EffectKind, EffectSource, FriendlyFire, GroundEffect,
    MalformedEffect, StatFilter, UserEffect, validate_envelope,
};
use crate::state::{Position, UserId};

/// Who a template lands on when its action resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemplateTarget {
    /// The action's target (user or tile).
    #[default]
    Inherit,
    /// The acting user, e.g. lifesteal riding on a damage jutsu.
    Caster,
}

/// One effect a jutsu, item or basic action produces when cast.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectTemplate {
    pub kind: EffectKind,
    pub power: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub power_per_level: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub calculation: Calculation,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rounds: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TemplateTarget,
    #[cfg_attr(feature = "serde", serde(default))]
    pub friendly_fire: FriendlyFire,
    #[cfg_attr(feature = "serde", serde(default))]
    pub filter: StatFilter,
}

impl EffectTemplate {
    pub fn new(kind: EffectKind, power: f64) -> Self {
        Self {
            kind,
            power,
            power_per_level: 0.0,
            calculation: Calculation::Static,
            rounds: 0,
            target: TemplateTarget::Inherit,
            friendly_fire: FriendlyFire::All,
            filter: StatFilter::default(),
        }
    }

    pub fn with_calculation(mut self, calculation: Calculation) -> Self {
        self.calculation = calculation;
        self
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_power_per_level(mut self, power_per_level: f64) -> Self {
        self.power_per_level = power_per_level;
        self
    }

    pub fn on_caster(mut self) -> Self {
        self.target = TemplateTarget::Caster;
        self
    }

    pub fn with_friendly_fire(mut self, friendly_fire: FriendlyFire) -> Self {
        self.friendly_fire = friendly_fire;
        self
    }

    pub fn with_filter(mut self, filter: StatFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Fresh envelope for an effect cast during `round`.
    pub fn envelope(
        &self,
        id: EffectId,
        creator: UserId,
        level: u32,
        round: u32,
        source: EffectSource,
    ) -> EffectEnvelope {
        EffectEnvelope {
            id,
            creator,
            level,
            power: self.power,
            power_per_level: self.power_per_level,
            calculation: self.calculation,
            rounds: self.rounds,
            is_new: true,
            cast_this_round: true,
            created_round: round,
            source,
            friendly_fire: self.friendly_fire,
            filter: self.filter.clone(),
            from_ground: false,
        }
    }

    /// Checks that effects cast from this template will be resolvable.
    pub fn validate(&self) -> Result<(), MalformedEffect> {
        let envelope = self.envelope(EffectId(0), UserId(0), 1, 0, EffectSource::Basic);
        validate_envelope(self.kind.tag(), &envelope)
    }

    /// Kind with its runtime payload initialised from the envelope.
    fn realized_kind(&self, envelope: &EffectEnvelope) -> EffectKind {
        match self.kind {
            EffectKind::Barrier { .. } => EffectKind::Barrier {
                remaining: envelope.power(),
            },
            ref kind => kind.clone(),
        }
    }

    pub fn realize_on_user(&self, envelope: EffectEnvelope, target: UserId) -> UserEffect {
        let kind = self.realized_kind(&envelope);
        UserEffect {
            envelope,
            target,
            kind,
        }
    }

    pub fn realize_on_ground(&self, envelope: EffectEnvelope, position: Position) -> GroundEffect {
        let kind = self.realized_kind(&envelope);
        GroundEffect {
            envelope,
            position,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barrier_health_starts_at_scaled_power() {
        let template = EffectTemplate::new(EffectKind::Barrier { remaining: 0.0 }, 40.0)
            .with_power_per_level(5.0)
            .with_rounds(3);
        let envelope = template.envelope(EffectId(4), UserId(1), 3, 7, EffectSource::Basic);
        let barrier = template.realize_on_ground(envelope, Position::new(1, 1));
        // 40 + 5 * (3 - 1)
        assert_eq!(barrier.kind, EffectKind::Barrier { remaining: 50.0 });
        assert!(barrier.envelope.is_new && barrier.envelope.cast_this_round);
        assert_eq!(barrier.envelope.created_round, 7);
    }

    #[test]
    fn templates_reject_formula_heals() {
        let heal =
            EffectTemplate::new(EffectKind::Heal, 10.0).with_calculation(Calculation::Formula);
        assert_eq!(
            heal.validate(),
            Err(MalformedEffect::FormulaUnsupported {
                tag: crate::effect::EffectTag::Heal
            })
        );
        assert_eq!(EffectTemplate::new(EffectKind::Damage, 10.0).validate(), Ok(()));
    }

    #[test]
    fn barriers_accept_every_calculation() {
        for calculation in [Calculation::Static, Calculation::Percentage, Calculation::Formula] {
            let barrier = EffectTemplate::new(EffectKind::Barrier { remaining: 0.0 }, 60.0)
                .with_calculation(calculation)
                .with_rounds(4);
            assert_eq!(barrier.validate(), Ok(()), "{calculation:?}");
        }
    }
}
