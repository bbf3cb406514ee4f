//! Grid-keyed spatial index.
//!
//! Maps each occupied cell to the ordered list of entity ids standing on it,
//! plus the reverse entity-to-cell map. Point lookups are a single hash lookup;
//! radius queries walk the bounding square and filter by Chebyshev distance.
//!
//! # Invariants
//!
//! - An entity id appears in at most one cell at a time. Adding an id that is
//!   already indexed elsewhere relocates it.
//! - A cell with no occupants is never kept in the map.

use std::collections::HashMap;

use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::state::{EntityId, Position};

/// Errors raised when the index is asked to remove something it does not hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpatialError {
    #[error("no entities at position {position}")]
    EmptyCell { entity: EntityId, position: Position },

    #[error("entity {entity} not found at position {position}")]
    EntityNotFound { entity: EntityId, position: Position },
}

impl SpatialError {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::EmptyCell { entity, .. } | Self::EntityNotFound { entity, .. } => *entity,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::EmptyCell { position, .. } | Self::EntityNotFound { position, .. } => *position,
        }
    }
}

impl GameError for SpatialError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn context(&self) -> Option<ErrorContext> {
        Some(
            ErrorContext::new()
                .with_entity(self.entity())
                .with_position(self.position()),
        )
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyCell { .. } => "SPATIAL_EMPTY_CELL",
            Self::EntityNotFound { .. } => "SPATIAL_ENTITY_NOT_FOUND",
        }
    }
}

/// O(1) position-to-entity lookup backed by a hash grid.
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex {
    grid: HashMap<Position, Vec<EntityId>>,
    cells: HashMap<EntityId, Position>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// First entity at `pos`, or `None` for an unoccupied cell.
    pub fn entity_at(&self, pos: Position) -> Option<EntityId> {
        self.grid.get(&pos).and_then(|ids| ids.first().copied())
    }

    /// Every entity at `pos` in arrival order; empty for an unoccupied cell.
    pub fn entities_at(&self, pos: Position) -> &[EntityId] {
        self.grid.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cell currently holding `id`.
    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        self.cells.get(&id).copied()
    }

    /// Registers `id` at `pos`. A no-op if it is already registered there;
    /// an id registered at another cell is relocated.
    pub fn add_entity(&mut self, id: EntityId, pos: Position) {
        match self.cells.get(&id).copied() {
            Some(current) if current == pos => return,
            Some(current) => {
                tracing::debug!(%id, from = %current, to = %pos, "re-adding indexed entity relocates it");
                self.detach(id, current);
            }
            None => {}
        }

        self.grid.entry(pos).or_default().push(id);
        self.cells.insert(id, pos);
    }

    /// Unregisters `id` from `pos`, deleting the cell once it is empty.
    pub fn remove_entity(&mut self, id: EntityId, pos: Position) -> Result<(), SpatialError> {
        let occupants = self.grid.get_mut(&pos).ok_or(SpatialError::EmptyCell {
            entity: id,
            position: pos,
        })?;

        let index = occupants
            .iter()
            .position(|occupant| *occupant == id)
            .ok_or(SpatialError::EntityNotFound {
                entity: id,
                position: pos,
            })?;

        occupants.remove(index);
        if occupants.is_empty() {
            self.grid.remove(&pos);
        }
        self.cells.remove(&id);

        Ok(())
    }

    fn detach(&mut self, id: EntityId, pos: Position) {
        if let Some(occupants) = self.grid.get_mut(&pos) {
            occupants.retain(|occupant| *occupant != id);
            if occupants.is_empty() {
                self.grid.remove(&pos);
            }
        }
        self.cells.remove(&id);
    }

    /// Relocates `id` from `old` to `new`.
    ///
    /// Same-cell moves are no-ops. If `id` is not at `old`, nothing changes.
    pub fn move_entity(
        &mut self,
        id: EntityId,
        old: Position,
        new: Position,
    ) -> Result<(), SpatialError> {
        if old == new {
            return Ok(());
        }

        self.remove_entity(id, old)?;
        self.add_entity(id, new);
        Ok(())
    }

    /// Every entity within Chebyshev distance `radius` of `center`, in
    /// cell order (x, then y).
    ///
    /// Walks the bounding square, O(radius²). Once that square holds more
    /// cells than are occupied, the occupied cells are filtered instead.
    pub fn entities_in_radius(&self, center: Position, radius: u32) -> Vec<EntityId> {
        let side = 2 * u64::from(radius) + 1;
        if side.saturating_mul(side) > self.grid.len() as u64 {
            let mut cells: Vec<_> = self
                .grid
                .iter()
                .filter(|(pos, _)| center.chebyshev_distance(**pos) <= radius)
                .collect();
            cells.sort_unstable_by_key(|(pos, _)| **pos);
            return cells
                .into_iter()
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect();
        }

        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let mut found = Vec::new();
        for x in center.x.saturating_sub(r)..=center.x.saturating_add(r) {
            for y in center.y.saturating_sub(r)..=center.y.saturating_add(r) {
                found.extend_from_slice(self.entities_at(Position::new(x, y)));
            }
        }
        found
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.grid.contains_key(&pos)
    }

    /// Total number of registrations across all cells.
    pub fn entity_count(&self) -> usize {
        self.cells.len()
    }

    pub fn occupied_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.grid.keys().copied()
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.grid = HashMap::new();
        self.cells = HashMap::new();
    }
}
