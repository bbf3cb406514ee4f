//! Squad movement under a per-turn Chebyshev budget.

use super::battlefield::Battlefield;
use super::components::MapPosition;
use super::error::CombatError;
use super::queries;
use crate::state::{EntityId, Position};

/// Result of a successful move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: Position,
    pub to: Position,
    pub cost: u32,
    pub remaining: u32,
}

/// Validates and performs squad movement.
pub struct CombatMovementSystem<'a> {
    field: &'a mut Battlefield,
}

impl<'a> CombatMovementSystem<'a> {
    pub fn new(field: &'a mut Battlefield) -> Self {
        Self { field }
    }

    pub fn squad_movement_speed(&self, squad: EntityId) -> u32 {
        self.field.movement_speed(squad)
    }

    pub fn squad_position(&self, squad: EntityId) -> Result<Position, CombatError> {
        queries::squad_position(&self.field.world, squad).ok_or(CombatError::NotOnMap(squad))
    }

    /// A tile is enterable when no squad of another faction stands on it.
    /// Items and friendly squads do not block.
    pub fn can_move_to(&self, squad: EntityId, target: Position) -> bool {
        let world = &self.field.world;
        let Some(mover) = queries::faction_of(world, squad) else {
            return false;
        };

        self.field
            .spatial
            .entities_at(target)
            .iter()
            .filter_map(|occupant| queries::faction_of(world, *occupant))
            .all(|owner| owner == mover)
    }

    /// Moves `squad` to `target`, paying the Chebyshev distance from its
    /// movement budget. Nothing changes on failure.
    pub fn move_squad(
        &mut self,
        squad: EntityId,
        target: Position,
    ) -> Result<MoveOutcome, CombatError> {
        let world = &self.field.world;
        let state = queries::find_action_state(world, squad)
            .ok_or(CombatError::ActionStateNotFound(squad))?;
        if state.movement_remaining == 0 {
            return Err(CombatError::NoMovementRemaining(squad));
        }
        let remaining = state.movement_remaining;

        let from = queries::squad_position(world, squad).ok_or(CombatError::NotOnMap(squad))?;
        let cost = from.chebyshev_distance(target);
        if cost > remaining {
            return Err(CombatError::InsufficientMovement {
                squad,
                needed: cost,
                remaining,
            });
        }
        if !self.can_move_to(squad, target) {
            return Err(CombatError::DestinationBlocked {
                squad,
                position: target,
            });
        }

        self.field.spatial.move_entity(squad, from, target)?;
        if let Some(record) = self.field.world.get_mut::<MapPosition>(squad) {
            record.position = target;
        }
        let remaining = queries::decrement_movement_remaining(&mut self.field.world, squad, cost)?;
        queries::mark_squad_as_moved(&mut self.field.world, squad)?;

        tracing::debug!(%squad, %from, to = %target, cost, remaining, "squad moved");
        Ok(MoveOutcome {
            from,
            to: target,
            cost,
            remaining,
        })
    }

    /// Every tile the squad could enter with its remaining movement,
    /// excluding the tile it stands on.
    pub fn valid_movement_tiles(&self, squad: EntityId) -> Vec<Position> {
        let world = &self.field.world;
        let (Some(from), Some(state)) = (
            queries::squad_position(world, squad),
            queries::find_action_state(world, squad),
        ) else {
            return Vec::new();
        };

        let reach = i32::try_from(state.movement_remaining).unwrap_or(i32::MAX);
        let mut tiles = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let tile = from.offset(dx, dy);
                if tile != from && self.can_move_to(squad, tile) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::components::ActionState;
    use crate::combat::testing::skirmish;

    #[test]
    fn diagonal_steps_cost_one() {
        let (mut field, [a, _]) = skirmish(Position::new(0, 0), Position::new(9, 9));
        let outcome = CombatMovementSystem::new(&mut field)
            .move_squad(a, Position::new(2, 2))
            .unwrap();

        assert_eq!(outcome.cost, 2);
        assert_eq!(outcome.remaining, 1);
        assert_eq!(field.spatial.entity_at(Position::new(2, 2)), Some(a));
        let state = field.world.get::<ActionState>(a).unwrap();
        assert!(state.has_moved);
        assert_eq!(
            field.world.get::<MapPosition>(a).unwrap().position,
            Position::new(2, 2)
        );
    }

    #[test]
    fn over_budget_move_changes_nothing() {
        let (mut field, [a, _]) = skirmish(Position::new(0, 0), Position::new(9, 9));
        let mut movement = CombatMovementSystem::new(&mut field);

        assert_eq!(
            movement.move_squad(a, Position::new(4, 0)),
            Err(CombatError::InsufficientMovement {
                squad: a,
                needed: 4,
                remaining: 3
            })
        );
        assert_eq!(field.spatial.entity_at(Position::new(0, 0)), Some(a));
        assert!(!field.world.get::<ActionState>(a).unwrap().has_moved);
    }

    #[test]
    fn enemies_block_tiles_and_budget_runs_out() {
        let (mut field, [a, b]) = skirmish(Position::new(0, 0), Position::new(1, 0));
        let mut movement = CombatMovementSystem::new(&mut field);

        assert!(!movement.can_move_to(a, Position::new(1, 0)));
        assert!(movement.can_move_to(a, Position::new(0, 1)));
        assert_eq!(
            movement.move_squad(a, Position::new(1, 0)),
            Err(CombatError::DestinationBlocked {
                squad: a,
                position: Position::new(1, 0)
            })
        );

        movement.move_squad(a, Position::new(0, 3)).unwrap();
        assert_eq!(
            movement.move_squad(a, Position::new(0, 2)),
            Err(CombatError::NoMovementRemaining(a))
        );
        assert!(movement.can_move_to(b, Position::new(2, 0)));
    }

    #[test]
    fn items_do_not_block() {
        let (mut field, [a, _]) = skirmish(Position::new(0, 0), Position::new(9, 9));
        field.spawn_item("Potion", Position::new(1, 0));
        let mut movement = CombatMovementSystem::new(&mut field);
        assert!(movement.move_squad(a, Position::new(1, 0)).is_ok());
        assert_eq!(field.spatial.entities_at(Position::new(1, 0)).len(), 2);
    }

    #[test]
    fn reachable_tiles_cover_the_budget_square() {
        let (mut field, [a, _]) = skirmish(Position::new(0, 0), Position::new(9, 9));
        field.world.get_mut::<ActionState>(a).unwrap().movement_remaining = 1;
        let tiles = CombatMovementSystem::new(&mut field).valid_movement_tiles(a);
        assert_eq!(tiles.len(), 8);
        assert!(!tiles.contains(&Position::new(0, 0)));
    }
}
