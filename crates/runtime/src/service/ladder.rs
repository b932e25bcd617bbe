//! Ladder standings and the scheduled daily tick.

use std::sync::Arc;

use battle_core::{
    LadderEntry, RankedConfig, UserId, classify, close_season, daily_decay, top_players_lp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::repository::{JobLockRepository, LadderRepository};

/// Job-lock name of the daily ladder tick.
pub const DAILY_TICK_JOB: &str = "ranked-daily-tick";

const DAY_SECONDS: i64 = 86_400;

/// What a daily tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Another run already claimed this interval.
    NotDue,
    Decayed { players: usize },
    SeasonClosed { season: u32, claims: usize },
}

/// Where a player currently stands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub entry: LadderEntry,
    pub division: String,
    /// Position on the full ladder, top tier included.
    pub rank_index: usize,
}

pub struct LadderService<L, J> {
    ladder: Arc<L>,
    locks: Arc<J>,
    config: RankedConfig,
}

impl<L, J> LadderService<L, J>
where
    L: LadderRepository,
    J: JobLockRepository,
{
    pub fn new(ladder: Arc<L>, locks: Arc<J>, config: RankedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ladder,
            locks,
            config,
        })
    }

    pub fn standing(&self, user: UserId) -> Result<Standing> {
        let entry = self.ladder.entry(user)?;
        let top = top_players_lp(&self.ladder.entries()?, self.config.top_tier_size);
        let placement = classify(&self.config, entry.lp, &top);
        Ok(Standing {
            entry,
            division: placement.name(&self.config).to_owned(),
            rank_index: placement.rank_index(&self.config),
        })
    }

    pub fn daily_tick(&self) -> Result<TickOutcome> {
        self.daily_tick_at(Utc::now())
    }

    /// Runs the daily tick if no other run claimed the current day.
    ///
    /// Closes the active season once its end has passed, otherwise decays
    /// every positive LP. A failed run releases the day again.
    pub fn daily_tick_at(&self, now: DateTime<Utc>) -> Result<TickOutcome> {
        let now = now.timestamp();
        let Some(lease) = self.locks.try_acquire(DAILY_TICK_JOB, now, DAY_SECONDS)? else {
            return Ok(TickOutcome::NotDue);
        };

        match self.run_tick(now) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(job = DAILY_TICK_JOB, error = %err, "daily tick failed, releasing lock");
                self.locks.rollback(&lease)?;
                Err(err)
            }
        }
    }

    fn run_tick(&self, now: i64) -> Result<TickOutcome> {
        let mut entries = self.ladder.entries()?;

        if let Some(mut season) = self.ladder.active_season()?.filter(|s| s.is_due(now)) {
            let claims = close_season(&self.config, &mut season, &mut entries);
            self.ladder.close_season(&season, &entries, &claims)?;
            return Ok(TickOutcome::SeasonClosed {
                season: season.id,
                claims: claims.len(),
            });
        }

        daily_decay(&self.config, &mut entries);
        self.ladder.save_entries(&entries)?;
        info!(players = entries.len(), "ladder decayed");
        Ok(TickOutcome::Decayed {
            players: entries.len(),
        })
    }
}
