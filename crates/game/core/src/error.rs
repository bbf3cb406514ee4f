//! Common error infrastructure for tactics-core.
//!
//! Domain errors (`QueueError`, `SpatialError`, `CombatError`, `TurnError`)
//! live next to the subsystem that raises them. This module holds the pieces
//! they share: a severity classification and an optional context payload.
//!
//! # Severity taxonomy
//!
//! - Precondition violations (e.g. a non-positive action cost) are `Fatal`:
//!   the operation is aborted untouched and the caller should treat it as a bug.
//! - Not-found conditions are `Recoverable`: the caller decides retry vs. skip.
//! - Rule violations (out of range, already acted) are `Validation`.
//! - Desynchronised records are `Internal`.

use crate::state::{EntityId, Position};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can retry with same or alternative action.
    ///
    /// Examples: entity not at the expected cell, squad not on the map
    Recoverable,

    /// Invalid request, should not retry without changes.
    ///
    /// Examples: target out of range, squad already acted
    Validation,

    /// Unexpected state inconsistency; indicates a bug.
    ///
    /// Examples: map position without action state
    Internal,

    /// Programmer error; the current step must be aborted.
    ///
    /// Examples: non-positive action cost
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

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Contextual information attached to errors for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Entity that triggered the error (if applicable).
    pub entity: Option<EntityId>,

    /// Position where the error occurred (if applicable).
    pub position: Option<Position>,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entity: None,
            position: None,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all tactics-core errors.
///
/// Implementors use `#[derive(thiserror::Error)]` for `Display`/`Error` and
/// classify severity by recoverability, not by gameplay impact.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Context for this error, if the variant carries one.
    fn context(&self) -> Option<ErrorContext> {
        None
    }

    /// Static identifier for the error variant, useful for metrics and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builder_collects_fields() {
        let ctx = ErrorContext::new()
            .with_entity(EntityId(7))
            .with_position(Position::new(1, 2))
            .with_message("context note");

        assert_eq!(ctx.entity, Some(EntityId(7)));
        assert_eq!(ctx.position, Some(Position::new(1, 2)));
        assert_eq!(ctx.message, Some("context note"));
    }

    #[test]
    fn only_recoverable_is_recoverable() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_fatal());
        assert_eq!(ErrorSeverity::Internal.as_str(), "internal");
    }
}
