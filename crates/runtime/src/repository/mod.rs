//! Repository layer for mutable battle and ladder data.
//!
//! Repositories hold what CHANGES between requests:
//! - Battle snapshots, written with an optimistic version check
//! - Ladder standings, seasons and reward claims
//! - Timestamps of scheduled jobs
//!
//! Static content (jutsu, items, ladder tunables) comes from `battle-content`.

mod error;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use memory::{InMemoryBattleRepo, InMemoryJobLock, InMemoryLadderRepo};
pub use traits::{BattleRepository, JobLease, JobLockRepository, LadderRepository};
