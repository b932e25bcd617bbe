//! In-memory repositories for tests and single-process hosts.

mod battle;
mod job_lock;
mod ladder;

pub use battle::InMemoryBattleRepo;
pub use job_lock::InMemoryJobLock;
pub use ladder::InMemoryLadderRepo;
