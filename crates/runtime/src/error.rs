//! Unified error type surfaced by the battle services.
//!
//! Wraps repository, resolution and ladder configuration failures so hosts
//! can bubble them up and branch on [`BattleError::severity`].
use battle_core::{BattleError, BattleId, ErrorContext, ErrorSeverity, RankedConfigError, ResolveError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    RankedConfig(#[from] RankedConfigError),

    #[error("battle {battle} does not exist")]
    BattleNotFound { battle: BattleId },

    #[error("failed to digest battle state")]
    Digest(#[source] bincode::Error),
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Repository(err) => err.severity(),
            Self::Resolve(err) => err.severity(),
            Self::RankedConfig(err) => err.severity(),
            Self::BattleNotFound { .. } => ErrorSeverity::Validation,
            Self::Digest(_) => ErrorSeverity::Internal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Resolve(err) => err.context(),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Repository(err) => err.error_code(),
            Self::Resolve(err) => err.error_code(),
            Self::RankedConfig(err) => err.error_code(),
            Self::BattleNotFound { .. } => "RUNTIME_BATTLE_NOT_FOUND",
            Self::Digest(_) => "RUNTIME_DIGEST",
        }
    }
}
