//! Deterministic action scheduling and squad combat rules.
//!
//! `tactics-core` owns the canonical combat rules: queued actions with an
//! action-point ledger, the [`engine::ActionController`] that decides who acts
//! next, a grid [`spatial::SpatialIndex`], and the faction turn state machine
//! in [`combat`]. It performs no I/O; hosts install a `tracing` subscriber and
//! drive the scheduler one step at a time.
pub mod action;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod rng;
pub mod spatial;
pub mod state;
pub mod store;

pub use action::{
    Action, ActionKind, ActionQueue, AttackAction, MoveAction, PlayerAction, QueueEntry,
    QueueError, Submission,
};
pub use combat::{
    Battlefield, CombatActionSystem, CombatError, CombatMovementSystem, CombatPhase, CombatResult,
    DamageReport, DamageResolver, FactionManager, TurnAdvance, TurnError, TurnManager,
    VictoryCheck,
};
pub use config::CombatConfig;
pub use engine::{ActionController, QueueHandle, StepOutcome};
pub use error::{ErrorContext, ErrorSeverity, GameError};
pub use rng::{PcgRng, RngOracle};
pub use spatial::{SpatialError, SpatialIndex};
pub use state::{EntityId, FactionId, Position};
pub use store::{Component, StoreError, World};
