//! Session orchestration for the tactical combat core.
//!
//! This crate wires a [`tactics_core::Battlefield`], an action controller and
//! the faction turn cycle into a single [`CombatSession`] that hosts drive one
//! step at a time.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the orchestrator
//! - [`config`] loads session settings from the environment
//! - [`planner`] issues orders for computer-controlled factions
//! - [`resolver`] provides the unit-count damage model
//! - [`report`] holds the serializable end-of-session summary
pub mod config;
pub mod error;
pub mod planner;
pub mod report;
pub mod resolver;
pub mod session;

pub use config::{ActionCosts, SessionConfig};
pub use error::{Result, SessionError};
pub use report::{FactionSummary, SessionReport};
pub use resolver::{SquadStrength, UnitDamageResolver};
pub use session::CombatSession;
