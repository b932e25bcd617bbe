//! Per-target record of what is blocked during a pass.

use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::effect::EffectKind;
use crate::state::UserId;

bitflags! {
    /// Things a combatant is protected from (or, for `BLOODLINE`, locked out of).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Prevented: u16 {
        const BUFF         = 1 << 0;
        const DEBUFF       = 1 << 1;
        const HEAL         = 1 << 2;
        const STUN         = 1 << 3;
        /// New seals are resisted.
        const SEAL         = 1 << 4;
        /// Bloodline-sourced effects on this target are suppressed.
        const BLOODLINE    = 1 << 5;
        const FLEE         = 1 << 6;
        const ONE_HIT_KILL = 1 << 7;
        const ROB          = 1 << 8;
    }
}

impl Prevented {
    /// Flag an active effect of `kind` contributes, if any.
    pub(crate) fn for_kind(kind: &EffectKind) -> Option<Self> {
        let flag = match kind {
            EffectKind::BuffPrevent => Self::BUFF,
            EffectKind::DebuffPrevent => Self::DEBUFF,
            EffectKind::HealPrevent => Self::HEAL,
            EffectKind::StunPrevent => Self::STUN,
            EffectKind::SealPrevent => Self::SEAL,
            EffectKind::Seal => Self::BLOODLINE,
            EffectKind::FleePrevent => Self::FLEE,
            EffectKind::OneHitKillPrevent => Self::ONE_HIT_KILL,
            EffectKind::RobPrevent => Self::ROB,
            _ => return None,
        };
        Some(flag)
    }

    /// Log wording used when a new effect of this flag takes hold.
    pub(crate) fn describe(self) -> &'static str {
        const WORDING: [(Prevented, &str); 9] = [
            (Prevented::BUFF, "cannot be buffed"),
            (Prevented::DEBUFF, "cannot be debuffed"),
            (Prevented::HEAL, "cannot be healed"),
            (Prevented::STUN, "cannot be stunned"),
            (Prevented::SEAL, "bloodline cannot be sealed"),
            (Prevented::BLOODLINE, "bloodline is sealed"),
            (Prevented::FLEE, "cannot flee"),
            (Prevented::ONE_HIT_KILL, "cannot be one-hit-killed"),
            (Prevented::ROB, "cannot be robbed"),
        ];
        WORDING
            .iter()
            .find(|(flag, _)| *flag == self)
            .map_or("is protected", |(_, wording)| wording)
    }
}

/// Built once per pass from effects that were already active before it.
#[derive(Clone, Debug, Default)]
pub(crate) struct PreventionMap {
    flags: BTreeMap<UserId, Prevented>,
}

impl PreventionMap {
    pub(crate) fn insert(&mut self, user: UserId, flag: Prevented) {
        *self.flags.entry(user).or_default() |= flag;
    }

    pub(crate) fn has(&self, user: UserId, flag: Prevented) -> bool {
        self.flags.get(&user).is_some_and(|f| f.contains(flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accumulate_per_user() {
        let mut map = PreventionMap::default();
        map.insert(UserId(1), Prevented::STUN);
        map.insert(UserId(1), Prevented::HEAL);
        assert!(map.has(UserId(1), Prevented::STUN));
        assert!(map.has(UserId(1), Prevented::HEAL));
        assert!(!map.has(UserId(2), Prevented::STUN));
        assert_eq!(
            Prevented::for_kind(&EffectKind::Seal),
            Some(Prevented::BLOODLINE)
        );
        assert_eq!(Prevented::for_kind(&EffectKind::Damage), None);
    }
}
