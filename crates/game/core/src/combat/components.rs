//! Data records the combat layer stores in the [`World`](crate::store::World).
//!
//! Records are plain data. Squad-scoped records (`MapPosition`,
//! `ActionState`, `MovementSpeed`, `AttackRange`) are attached to the squad
//! entity itself; `Faction` lives on its own entity and `TurnState` on a
//! single turn entity per combat.

use crate::state::{EntityId, FactionId, Position};
use crate::store::Component;

/// Marker for entities that are squads, with a display name.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Squad {
    pub name: String,
}

/// A side in combat.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Faction {
    pub faction_id: FactionId,
    pub name: String,
    pub mana: u32,
    pub max_mana: u32,
    pub is_player_controlled: bool,
}

impl Faction {
    pub const STARTING_MANA: u32 = 100;
}

/// Lifecycle of one combat session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CombatPhase {
    #[default]
    Inactive,
    Active,
    /// Termination detected; waiting for the host to close the combat.
    Resolving,
}

/// Turn bookkeeping for the active combat.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    pub combat_active: bool,
    pub phase: CombatPhase,
    /// 1-based round counter.
    pub current_round: u32,
    /// Rounds in which every faction has had its turn.
    pub rounds_completed: u32,
    /// Faction visiting order, fixed at combat start.
    pub turn_order: Vec<FactionId>,
    pub current_turn_index: usize,
}

impl TurnState {
    pub fn current_faction(&self) -> Option<FactionId> {
        if self.phase != CombatPhase::Active {
            return None;
        }
        self.turn_order.get(self.current_turn_index).copied()
    }
}

/// Where a squad stands and which faction owns it.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapPosition {
    pub squad_id: EntityId,
    pub faction_id: FactionId,
    pub position: Position,
}

/// Per-turn action budget of a squad.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionState {
    pub squad_id: EntityId,
    pub has_acted: bool,
    pub has_moved: bool,
    pub movement_remaining: u32,
}

impl ActionState {
    pub fn new(squad_id: EntityId) -> Self {
        Self {
            squad_id,
            has_acted: false,
            has_moved: false,
            movement_remaining: 0,
        }
    }

    /// Acted and out of movement: nothing left to do this turn.
    pub fn is_exhausted(&self) -> bool {
        self.has_acted && self.movement_remaining == 0
    }
}

/// Tiles per turn, published by the stat collaborator.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementSpeed(pub u32);

/// Maximum Chebyshev reach of the squad's attack.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRange(pub u32);

/// Item lying on the grid.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub name: String,
}

/// Item picked up by a squad.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeldBy(pub EntityId);
