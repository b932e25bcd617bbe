//! Repository contracts for saving and loading mutable battle data.

use battle_core::{BattleId, BattleState, LadderEntry, RankedSeason, RewardClaim, UserId};

use super::Result;

/// Persistence for battle snapshots.
///
/// Writes go through [`save_if_version`](Self::save_if_version): the engine
/// never locks a battle, it resolves against a snapshot and the write fails
/// if someone else got there first.
pub trait BattleRepository: Send + Sync {
    /// Stores a new battle. Fails if the id is taken.
    fn insert(&self, state: &BattleState) -> Result<()>;

    fn load(&self, battle: BattleId) -> Result<Option<BattleState>>;

    /// Replaces the stored battle if its version still equals `expected`.
    fn save_if_version(&self, state: &BattleState, expected: u64) -> Result<()>;

    fn delete(&self, battle: BattleId) -> Result<()>;
}

/// Persistence for ranked standings, seasons and reward claims.
pub trait LadderRepository: Send + Sync {
    /// Standing of `user`; players without one start at zero LP.
    fn entry(&self, user: UserId) -> Result<LadderEntry>;

    fn entries(&self) -> Result<Vec<LadderEntry>>;

    fn save_entries(&self, entries: &[LadderEntry]) -> Result<()>;

    /// Season that has not been closed yet, if any.
    fn active_season(&self) -> Result<Option<RankedSeason>>;

    fn save_season(&self, season: &RankedSeason) -> Result<()>;

    /// Adds reward claims, skipping any player who already holds one for
    /// the same season.
    fn insert_claims(&self, claims: &[RewardClaim]) -> Result<()>;

    /// Stores an ended season together with the reset standings and its
    /// reward claims. Either everything is written or nothing is.
    fn close_season(
        &self,
        season: &RankedSeason,
        entries: &[LadderEntry],
        claims: &[RewardClaim],
    ) -> Result<()>;

    fn claims_for(&self, user: UserId) -> Result<Vec<RewardClaim>>;
}

/// Proof that a scheduled job won its interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobLease {
    pub job: String,
    /// Timestamp written by the acquisition.
    pub acquired_at: i64,
    /// Timestamp stored before the acquisition, restored on rollback.
    pub previous: Option<i64>,
}

/// Timestamp-based lock for scheduled jobs.
///
/// At most one caller acquires a job per interval. A job that fails after
/// acquiring rolls the timestamp back so the next attempt may run.
pub trait JobLockRepository: Send + Sync {
    /// Compare-and-set on the job's last-run timestamp.
    ///
    /// Returns `None` if the job already ran less than `interval` seconds
    /// before `now`.
    fn try_acquire(&self, job: &str, now: i64, interval: i64) -> Result<Option<JobLease>>;

    /// Restores the previous timestamp if `lease` still holds the lock.
    fn rollback(&self, lease: &JobLease) -> Result<()>;

    fn last_run(&self, job: &str) -> Result<Option<i64>>;
}
