//! Error types raised by repository implementations.

use battle_core::{BattleError, BattleId, ErrorSeverity};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    /// Another writer persisted the battle since it was loaded.
    #[error("battle {battle} is at version {found}, expected {expected}")]
    ConcurrencyConflict {
        battle: BattleId,
        expected: u64,
        found: u64,
    },

    #[error("battle {battle} is not stored")]
    NotFound { battle: BattleId },

    #[error("battle {battle} already exists")]
    AlreadyExists { battle: BattleId },
}

impl BattleError for RepositoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConcurrencyConflict { .. } => ErrorSeverity::Recoverable,
            Self::NotFound { .. } | Self::AlreadyExists { .. } => ErrorSeverity::Validation,
            Self::LockPoisoned => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LockPoisoned => "REPOSITORY_LOCK_POISONED",
            Self::ConcurrencyConflict { .. } => "REPOSITORY_CONCURRENCY_CONFLICT",
            Self::NotFound { .. } => "REPOSITORY_NOT_FOUND",
            Self::AlreadyExists { .. } => "REPOSITORY_ALREADY_EXISTS",
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
