//! Errors raised by the faction, turn, movement and attack services.

use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::spatial::SpatialError;
use crate::state::{EntityId, FactionId, Position};
use crate::store::StoreError;

/// Why a squad-level request was refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("squad {0} does not exist")]
    SquadNotFound(EntityId),

    #[error("faction {0} does not exist")]
    FactionNotFound(FactionId),

    #[error("squad {0} is not on the map")]
    NotOnMap(EntityId),

    #[error("squad {0} has no action state")]
    ActionStateNotFound(EntityId),

    #[error("squad {squad} does not belong to {faction}")]
    NotInFaction { squad: EntityId, faction: FactionId },

    #[error("squad {0} has already acted this turn")]
    AlreadyActed(EntityId),

    #[error("squad {0} has no movement remaining")]
    NoMovementRemaining(EntityId),

    #[error("squad {squad} needs {needed} movement but has {remaining}")]
    InsufficientMovement {
        squad: EntityId,
        needed: u32,
        remaining: u32,
    },

    #[error("squad {squad} cannot enter {position}")]
    DestinationBlocked { squad: EntityId, position: Position },

    #[error("squad {attacker} cannot attack its own faction's squad {defender}")]
    FriendlyTarget {
        attacker: EntityId,
        defender: EntityId,
    },

    #[error("target {defender} is {distance} tiles away, range is {range}")]
    OutOfRange {
        defender: EntityId,
        distance: u32,
        range: u32,
    },

    #[error("it is not {faction}'s turn")]
    NotFactionsTurn { faction: FactionId },

    #[error("no item {item} at {position}")]
    ItemNotFound { item: EntityId, position: Position },

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SquadNotFound(_)
            | Self::FactionNotFound(_)
            | Self::NotOnMap(_)
            | Self::ActionStateNotFound(_)
            | Self::ItemNotFound { .. }
            | Self::Store(_) => ErrorSeverity::Recoverable,
            Self::NotInFaction { .. }
            | Self::AlreadyActed(_)
            | Self::NoMovementRemaining(_)
            | Self::InsufficientMovement { .. }
            | Self::DestinationBlocked { .. }
            | Self::FriendlyTarget { .. }
            | Self::OutOfRange { .. }
            | Self::NotFactionsTurn { .. } => ErrorSeverity::Validation,
            Self::Spatial(_) => ErrorSeverity::Internal,
        }
    }

    fn context(&self) -> Option<ErrorContext> {
        let ctx = ErrorContext::new();
        match self {
            Self::SquadNotFound(squad)
            | Self::NotOnMap(squad)
            | Self::ActionStateNotFound(squad)
            | Self::AlreadyActed(squad)
            | Self::NoMovementRemaining(squad)
            | Self::InsufficientMovement { squad, .. }
            | Self::NotInFaction { squad, .. } => Some(ctx.with_entity(*squad)),
            Self::DestinationBlocked { squad, position } => {
                Some(ctx.with_entity(*squad).with_position(*position))
            }
            Self::ItemNotFound { item, position } => {
                Some(ctx.with_entity(*item).with_position(*position))
            }
            Self::FriendlyTarget { attacker, .. } => Some(ctx.with_entity(*attacker)),
            Self::OutOfRange { defender, .. } => Some(ctx.with_entity(*defender)),
            Self::Spatial(err) => err.context(),
            Self::FactionNotFound(_) | Self::NotFactionsTurn { .. } | Self::Store(_) => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SquadNotFound(_) => "COMBAT_SQUAD_NOT_FOUND",
            Self::FactionNotFound(_) => "COMBAT_FACTION_NOT_FOUND",
            Self::NotOnMap(_) => "COMBAT_NOT_ON_MAP",
            Self::ActionStateNotFound(_) => "COMBAT_ACTION_STATE_NOT_FOUND",
            Self::NotInFaction { .. } => "COMBAT_NOT_IN_FACTION",
            Self::AlreadyActed(_) => "COMBAT_ALREADY_ACTED",
            Self::NoMovementRemaining(_) => "COMBAT_NO_MOVEMENT",
            Self::InsufficientMovement { .. } => "COMBAT_INSUFFICIENT_MOVEMENT",
            Self::DestinationBlocked { .. } => "COMBAT_DESTINATION_BLOCKED",
            Self::FriendlyTarget { .. } => "COMBAT_FRIENDLY_TARGET",
            Self::OutOfRange { .. } => "COMBAT_OUT_OF_RANGE",
            Self::NotFactionsTurn { .. } => "COMBAT_NOT_FACTIONS_TURN",
            Self::ItemNotFound { .. } => "COMBAT_ITEM_NOT_FOUND",
            Self::Spatial(err) => err.error_code(),
            Self::Store(err) => err.error_code(),
        }
    }
}

/// Errors raised by the turn state machine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("combat needs at least one faction")]
    NoFactions,

    #[error("a combat is already in progress")]
    AlreadyActive,

    #[error("no combat is in progress")]
    NotActive,

    #[error("combat is resolving; end it before advancing turns")]
    Resolving,

    #[error(transparent)]
    Combat(#[from] CombatError),
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoFactions | Self::AlreadyActive | Self::NotActive | Self::Resolving => {
                ErrorSeverity::Validation
            }
            Self::Combat(err) => err.severity(),
        }
    }

    fn context(&self) -> Option<ErrorContext> {
        match self {
            Self::Combat(err) => err.context(),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoFactions => "TURN_NO_FACTIONS",
            Self::AlreadyActive => "TURN_ALREADY_ACTIVE",
            Self::NotActive => "TURN_NOT_ACTIVE",
            Self::Resolving => "TURN_RESOLVING",
            Self::Combat(err) => err.error_code(),
        }
    }
}
