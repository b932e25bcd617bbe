//! Common error infrastructure for battle-core.
//!
//! Domain errors (`ResolveError` in the engine, ladder validation errors) live
//! next to the code that raises them. This module provides the severity
//! classification and context shared by all of them.

use crate::state::{BattleId, UserId};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may retry, usually with fresh state
/// - **Validation**: the request itself is wrong and must change before retrying
/// - **Internal**: an unexpected inconsistency that needs investigation
/// - **Fatal**: configuration or stored data is corrupt; resolution must stop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: action not currently legal, stale version on write.
    Recoverable,

    /// Examples: actor not part of the battle.
    Validation,

    /// Examples: loadout refers to a catalog entry that vanished.
    Internal,

    /// Examples: malformed effect data.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or corrupt data.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    pub battle: Option<BattleId>,

    /// User that submitted the failing action (if applicable).
    pub actor: Option<UserId>,

    /// Battle round at the time of the error.
    pub round: u32,

    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(round: u32) -> Self {
        Self {
            battle: None,
            actor: None,
            round,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_battle(mut self, battle: BattleId) -> Self {
        self.battle = Some(battle);
        self
    }

    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Common trait for all battle errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Include `ErrorContext` in variants that need debugging info
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Not all errors have context (e.g., errors delegated from other crates).
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
