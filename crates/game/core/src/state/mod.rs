//! Identifier and grid primitives shared by every subsystem.
//!
//! These are plain `Copy` values. Entity and faction identifiers are minted
//! by the component store; positions are tile coordinates on the combat grid.
pub mod common;

pub use common::{EntityId, FactionId, Position};
