//! Step-driven action scheduling.
//!
//! The [`ActionController`] is the single simulation primitive: every call
//! to [`ActionController::execute_first`] resolves exactly one queued action
//! for the actor with the most banked action points. One controller belongs
//! to one combat; independent combats build their own.

mod controller;

pub use controller::{ActionController, QueueHandle, StepOutcome};
