//! Error types for the round resolution pipeline.

use crate::action::{Action, ActionId};
use crate::effect::{EffectId, MalformedEffect};
use crate::error::{BattleError, ErrorContext, ErrorSeverity};

/// Why an individual effect was left out of a pass without failing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// The effect references a user that is not part of the battle.
    UnknownTarget,
    /// The target died, fled or left before this pass.
    TargetInactive,
}

/// Errors surfaced while resolving an action.
///
/// Any error leaves the submitted state untouched: the engine works on a
/// private copy and only returns it on success.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("action {action:?} is not available to the actor")]
    InvalidAction {
        action: Action,
        context: ErrorContext,
    },

    #[error("actor is not part of the battle")]
    ActorNotFound { context: ErrorContext },

    #[error("{effect} cannot be resolved: {source}")]
    MalformedEffect {
        effect: EffectId,
        #[source]
        source: MalformedEffect,
        context: ErrorContext,
    },

    #[error("no catalog definition for {id:?}")]
    MissingDefinition { id: ActionId, context: ErrorContext },
}

impl ResolveError {
    pub fn invalid_action(action: Action, context: ErrorContext) -> Self {
        Self::InvalidAction { action, context }
    }

    pub fn actor_not_found(context: ErrorContext) -> Self {
        Self::ActorNotFound { context }
    }

    pub fn malformed(effect: EffectId, source: MalformedEffect, context: ErrorContext) -> Self {
        Self::MalformedEffect {
            effect,
            source,
            context,
        }
    }
}

impl BattleError for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidAction { .. } => ErrorSeverity::Recoverable,
            Self::ActorNotFound { .. } => ErrorSeverity::Validation,
            Self::MalformedEffect { .. } => ErrorSeverity::Fatal,
            Self::MissingDefinition { .. } => ErrorSeverity::Internal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::InvalidAction { context, .. }
            | Self::ActorNotFound { context }
            | Self::MalformedEffect { context, .. }
            | Self::MissingDefinition { context, .. } => Some(context),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAction { .. } => "RESOLVE_INVALID_ACTION",
            Self::ActorNotFound { .. } => "RESOLVE_ACTOR_NOT_FOUND",
            Self::MalformedEffect { .. } => "RESOLVE_MALFORMED_EFFECT",
            Self::MissingDefinition { .. } => "RESOLVE_MISSING_DEFINITION",
        }
    }
}
