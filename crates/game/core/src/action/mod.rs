//! Action domain - queued, executable actor intents.
//!
//! An [`Action`] is a closed sum over the three shapes the combat layer
//! schedules. Each variant carries the typed handles its behavior needs plus
//! a plain function pointer to invoke. The context type `C` is whatever the
//! behaviors mutate (the runtime uses [`crate::combat::Battlefield`]); the
//! action layer itself has no dependency on the scheduler.
//!
//! # Module Structure
//!
//! - `kind`: [`ActionKind`] dedup tags
//! - `queue`: per-actor [`ActionQueue`] with its action-point ledger

pub mod kind;
pub mod queue;

pub use kind::ActionKind;
pub use queue::{ActionQueue, QueueEntry, QueueError, Submission};

use std::fmt;

use crate::state::{EntityId, Position};

/// Moves `actor` to `destination`.
pub type MoveBehavior<C> = fn(&mut C, EntityId, Position);

/// `attacker` strikes `defender`.
pub type AttackBehavior<C> = fn(&mut C, EntityId, EntityId);

/// Free-form player command: actor, optional target entity, target tile.
pub type PlayerBehavior<C> = fn(&mut C, EntityId, Option<EntityId>, Position);

/// Movement intent.
pub struct MoveAction<C> {
    actor: EntityId,
    destination: Position,
    behavior: Option<MoveBehavior<C>>,
}

impl<C> MoveAction<C> {
    pub fn new(actor: EntityId, destination: Position, behavior: Option<MoveBehavior<C>>) -> Self {
        Self {
            actor,
            destination,
            behavior,
        }
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn destination(&self) -> Position {
        self.destination
    }
}

/// Single-target attack intent.
pub struct AttackAction<C> {
    attacker: EntityId,
    defender: EntityId,
    behavior: Option<AttackBehavior<C>>,
}

impl<C> AttackAction<C> {
    pub fn new(
        attacker: EntityId,
        defender: EntityId,
        behavior: Option<AttackBehavior<C>>,
    ) -> Self {
        Self {
            attacker,
            defender,
            behavior,
        }
    }

    pub fn attacker(&self) -> EntityId {
        self.attacker
    }

    pub fn defender(&self) -> EntityId {
        self.defender
    }
}

/// Multi-parameter player command (item pickups, targeted abilities).
pub struct PlayerAction<C> {
    actor: EntityId,
    target: Option<EntityId>,
    position: Position,
    behavior: Option<PlayerBehavior<C>>,
}

impl<C> PlayerAction<C> {
    pub fn new(
        actor: EntityId,
        target: Option<EntityId>,
        position: Position,
        behavior: Option<PlayerBehavior<C>>,
    ) -> Self {
        Self {
            actor,
            target,
            position,
            behavior,
        }
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// Executable action. Immutable once built and consumed by [`Action::execute`].
pub enum Action<C> {
    Movement(MoveAction<C>),
    SingleTargetAttack(AttackAction<C>),
    Player(PlayerAction<C>),
}

impl<C> Action<C> {
    pub fn movement(actor: EntityId, destination: Position, behavior: MoveBehavior<C>) -> Self {
        Self::Movement(MoveAction::new(actor, destination, Some(behavior)))
    }

    pub fn attack(attacker: EntityId, defender: EntityId, behavior: AttackBehavior<C>) -> Self {
        Self::SingleTargetAttack(AttackAction::new(attacker, defender, Some(behavior)))
    }

    pub fn player(
        actor: EntityId,
        target: Option<EntityId>,
        position: Position,
        behavior: PlayerBehavior<C>,
    ) -> Self {
        Self::Player(PlayerAction::new(actor, target, position, Some(behavior)))
    }

    /// Entity on whose behalf the action runs.
    pub fn actor(&self) -> EntityId {
        match self {
            Self::Movement(action) => action.actor,
            Self::SingleTargetAttack(action) => action.attacker,
            Self::Player(action) => action.actor,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Movement(_) => "movement",
            Self::SingleTargetAttack(_) => "single_target_attack",
            Self::Player(_) => "player",
        }
    }

    /// Invokes the embedded behavior with the embedded arguments.
    ///
    /// An action built without a behavior logs a warning and does nothing.
    pub fn execute(self, ctx: &mut C) {
        let actor = self.actor();
        let variant = self.variant_name();

        let ran = match self {
            Self::Movement(MoveAction {
                actor,
                destination,
                behavior,
            }) => behavior.map(|run| run(ctx, actor, destination)),
            Self::SingleTargetAttack(AttackAction {
                attacker,
                defender,
                behavior,
            }) => behavior.map(|run| run(ctx, attacker, defender)),
            Self::Player(PlayerAction {
                actor,
                target,
                position,
                behavior,
            }) => behavior.map(|run| run(ctx, actor, target, position)),
        };

        if ran.is_none() {
            tracing::warn!(%actor, variant, "action has no behavior; skipping");
        }
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movement(action) => f
                .debug_struct("Movement")
                .field("actor", &action.actor)
                .field("destination", &action.destination)
                .field("has_behavior", &action.behavior.is_some())
                .finish(),
            Self::SingleTargetAttack(action) => f
                .debug_struct("SingleTargetAttack")
                .field("attacker", &action.attacker)
                .field("defender", &action.defender)
                .field("has_behavior", &action.behavior.is_some())
                .finish(),
            Self::Player(action) => f
                .debug_struct("Player")
                .field("actor", &action.actor)
                .field("target", &action.target)
                .field("position", &action.position)
                .field("has_behavior", &action.behavior.is_some())
                .finish(),
        }
    }
}
