//! Errors surfaced by [`crate::CombatSession`].
use tactics_core::{CombatError, EntityId, ErrorSeverity, GameError, QueueError, TurnError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("combat has not been started")]
    NotStarted,

    #[error("squad {0} has no action queue")]
    NoQueue(EntityId),
}

impl SessionError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Combat(err) => err.severity(),
            Self::Turn(err) => err.severity(),
            Self::Queue(err) => err.severity(),
            Self::NotStarted | Self::NoQueue(_) => ErrorSeverity::Validation,
        }
    }

    /// A fatal error means the caller broke a scheduling invariant.
    pub fn is_fatal(&self) -> bool {
        self.severity().is_fatal()
    }
}
