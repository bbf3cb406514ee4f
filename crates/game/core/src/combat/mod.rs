//! Squad combat on a grid: factions, turns, movement and attacks.
//!
//! Every service borrows a [`Battlefield`] for the duration of one call
//! sequence, the same way queued actions receive it as their context.
//!
//! # Module Structure
//!
//! - `components`: records stored on squad, faction and turn entities
//! - `queries`: record lookups and eligibility predicates
//! - `faction`: [`FactionManager`]
//! - `turn`: [`TurnManager`] state machine and [`VictoryCheck`]
//! - `movement`: [`CombatMovementSystem`]
//! - `attack`: [`CombatActionSystem`] and the [`DamageResolver`] seam
//! - `behaviors`: functions queued actions invoke

pub mod attack;
pub mod battlefield;
pub mod behaviors;
pub mod components;
pub mod error;
pub mod faction;
pub mod movement;
pub mod queries;
pub mod turn;

pub use attack::{CombatActionSystem, CombatResult, DamageReport, DamageResolver};
pub use battlefield::Battlefield;
pub use components::{
    ActionState, AttackRange, CombatPhase, Faction, HeldBy, Item, MapPosition, MovementSpeed,
    Squad, TurnState,
};
pub use error::{CombatError, TurnError};
pub use faction::FactionManager;
pub use movement::{CombatMovementSystem, MoveOutcome};
pub use turn::{TurnAdvance, TurnManager, VictoryCheck};
