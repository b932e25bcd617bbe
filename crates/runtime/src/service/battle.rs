//! Battle submission flow: load, resolve, write back, settle ranked results.

use std::collections::BTreeSet;
use std::sync::Arc;

use battle_content::{CatalogLoader, LoadResult, RankedLoader};
use battle_core::{
    Action, BattleConfig, BattleEngine, BattleEnv, BattleId, BattleState, BattleType,
    CatalogSnapshot, LadderEntry, PcgRng, RankedConfig, RoundOutcome, UserFlags, UserId,
    legal_actions, settle_match, top_players_lp,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, RuntimeError};
use crate::repository::{BattleRepository, LadderRepository};

/// LP movement of a finished ranked battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettlement {
    pub winner: LadderEntry,
    pub loser: LadderEntry,
    pub winner_delta: i32,
    pub loser_delta: i32,
}

/// Result of one accepted action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub outcome: RoundOutcome,
    /// Hex SHA-256 of the persisted state. Equal digests mean equal snapshots.
    pub digest: String,
    pub settlement: Option<MatchSettlement>,
}

/// Resolves submitted actions for stored battles.
///
/// The service never holds a lock across resolution. It reads a snapshot,
/// lets the engine compute the next one and writes it back only if the
/// stored version is still the one it read.
pub struct BattleService<B, L> {
    battles: Arc<B>,
    ladder: Arc<L>,
    catalog: CatalogSnapshot,
    config: BattleConfig,
    ranked: RankedConfig,
    rng: PcgRng,
}

impl<B, L> BattleService<B, L>
where
    B: BattleRepository,
    L: LadderRepository,
{
    pub fn new(battles: Arc<B>, ladder: Arc<L>, catalog: CatalogSnapshot) -> Self {
        Self {
            battles,
            ladder,
            catalog,
            config: BattleConfig::default(),
            ranked: RankedConfig::default(),
            rng: PcgRng,
        }
    }

    /// Service backed by the catalog and ladder tables shipped with
    /// `battle-content`.
    pub fn with_embedded_content(battles: Arc<B>, ladder: Arc<L>) -> LoadResult<Self> {
        let catalog = CatalogLoader::embedded()?;
        let ranked = RankedLoader::embedded()?;
        Ok(Self {
            ranked,
            ..Self::new(battles, ladder, catalog)
        })
    }

    pub fn with_battle_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_ranked_config(mut self, ranked: RankedConfig) -> Result<Self> {
        ranked.validate()?;
        self.ranked = ranked;
        Ok(self)
    }

    fn env(&self) -> BattleEnv<'_> {
        BattleEnv::new(&self.catalog, &self.rng, &self.config)
    }

    fn load(&self, battle: BattleId) -> Result<BattleState> {
        self.battles
            .load(battle)?
            .ok_or(RuntimeError::BattleNotFound { battle })
    }

    /// Actions `actor` may submit right now.
    pub fn available_actions(&self, battle: BattleId, actor: UserId) -> Result<BTreeSet<Action>> {
        let state = self.load(battle)?;
        Ok(legal_actions(&state, actor, &self.env()))
    }

    /// Resolves `action` and persists the new round.
    ///
    /// Fails with a concurrency conflict if another submission for the same
    /// battle was saved in the meantime; the caller should reload and retry.
    pub fn submit(&self, battle: BattleId, actor: UserId, action: Action) -> Result<Submission> {
        let state = self.load(battle)?;
        let outcome = BattleEngine::new(self.env()).resolve(&state, &action, actor)?;
        // Nothing may fail between a successful save and the reply.
        let digest = hex::encode(outcome.state.digest().map_err(RuntimeError::Digest)?);
        self.battles.save_if_version(&outcome.state, state.version)?;
        debug!(battle = %battle, version = outcome.state.version, %digest, "battle saved");

        let settlement = if state.battle_type == BattleType::Ranked
            && !state.is_finished()
            && outcome.state.is_finished()
        {
            self.settle(&outcome.state)?
        } else {
            None
        };

        Ok(Submission {
            outcome,
            digest,
            settlement,
        })
    }

    /// Applies the ranked result of a finished battle. Draws settle nothing.
    ///
    /// Clones fight for their controller, so a surviving clone wins for it.
    fn settle(&self, state: &BattleState) -> Result<Option<MatchSettlement>> {
        let Some(winner) = state.survivors().next() else {
            return Ok(None);
        };
        let Some(loser) = state.users.iter().find(|user| {
            user.flags.contains(UserFlags::IS_ORIGINAL) && !user.is_allied_with(winner)
        }) else {
            return Ok(None);
        };

        let before_win = self.ladder.entry(winner.controller_id)?;
        let before_loss = self.ladder.entry(loser.user_id)?;
        let top = top_players_lp(&self.ladder.entries()?, self.ranked.top_tier_size);
        let (won, lost) = settle_match(&self.ranked, &before_win, &before_loss, &top);
        self.ladder.save_entries(&[won, lost])?;

        info!(
            battle = %state.id,
            winner = %won.user_id,
            loser = %lost.user_id,
            winner_lp = won.lp,
            loser_lp = lost.lp,
            "ranked match settled"
        );
        Ok(Some(MatchSettlement {
            winner: won,
            loser: lost,
            winner_delta: won.lp - before_win.lp,
            loser_delta: lost.lp - before_loss.lp,
        }))
    }
}
