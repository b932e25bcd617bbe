//! In-process collaborators around the battle engine.
//!
//! `battle-core` is pure: it takes a snapshot and returns the next one. This
//! crate supplies what a host needs around that:
//! - [`repository`] defines persistence contracts with optimistic version
//!   checks, a timestamp job lock and in-memory implementations
//! - [`service`] drives submissions through the engine and runs the ladder
//!   tick under the job lock
//! - [`telemetry`] installs the tracing subscriber
pub mod error;
pub mod repository;
pub mod service;
pub mod telemetry;

pub use error::{Result, RuntimeError};
pub use repository::{
    BattleRepository, InMemoryBattleRepo, InMemoryJobLock, InMemoryLadderRepo, JobLease,
    JobLockRepository, LadderRepository, RepositoryError,
};
pub use service::{
    BattleService, DAILY_TICK_JOB, LadderService, MatchSettlement, Standing, Submission,
    TickOutcome,
};
pub use telemetry::init_tracing;
