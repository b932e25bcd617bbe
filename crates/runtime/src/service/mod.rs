//! Services that drive the engine and the ladder against repositories.

mod battle;
mod ladder;

pub use battle::{BattleService, MatchSettlement, Submission};
pub use ladder::{DAILY_TICK_JOB, LadderService, Standing, TickOutcome};
