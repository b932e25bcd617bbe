//! Deterministic combat rules and ladder rating shared by every battle host.
//!
//! `battle-core` defines the canonical effect model, the per-round resolution
//! engine, the legal-action filter and the ranked ladder formulas. All state
//! mutation of a battle flows through [`engine::BattleEngine`]; callers hand
//! it an immutable snapshot and persist the returned one.
pub mod action;
pub mod config;
pub mod consequence;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod ranked;
pub mod state;

pub use action::{
    Action, ActionId, ActionTarget, BasicAction, CombatAction, PoolCosts, Requirements,
    TargetRule, legal_actions,
};
pub use config::BattleConfig;
pub use consequence::{Consequence, ConsequenceMap, DamageRecord};
pub use effect::{
    Calculation, EffectEnvelope, EffectId, EffectKind, EffectSource, EffectTag, EffectTemplate,
    FriendlyFire, GroundEffect, MalformedEffect, Polarity, PoolMask, ResolutionPhase, StatFilter,
    TemplateTarget, UserEffect,
};
pub use engine::{BattleEngine, LogLine, LogTone, ResolveError, RoundOutcome, SkipReason};
pub use env::{ActionCatalog, BattleEnv, CatalogSnapshot, PcgRng, RngOracle, compute_seed};
pub use error::{BattleError, ErrorContext, ErrorSeverity};
pub use ranked::{
    Division, DivisionReward, LadderEntry, Placement, RankedConfig, RankedConfigError,
    RankedSeason, RewardClaim, classify, close_season, daily_decay, lp_delta, settle_match,
    top_players_lp,
};
pub use state::{
    BattleId, BattleState, BattleType, BattleUserState, BloodlineId, Element, GeneralType,
    GridSize, ItemId, JutsuId, LoadoutEntry, Modifier, Pool, PoolKind, Pools, Position,
    StatBlock, StatModifiers, StatType, UserFlags, UserId, UserRank, VillageId,
};
