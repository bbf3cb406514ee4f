//! Record lookups and per-squad eligibility predicates.
//!
//! Lookups return `Option`; the mutating helpers return a [`CombatError`] when
//! the squad has no record to update. Predicates on a missing record are
//! simply false.

use super::components::{ActionState, Faction, MapPosition, Squad, TurnState};
use super::error::CombatError;
use crate::state::{EntityId, FactionId, Position};
use crate::store::World;

// ===== lookups =====

pub fn find_squad(world: &World, squad: EntityId) -> Option<&Squad> {
    world.get::<Squad>(squad)
}

pub fn find_faction(world: &World, faction: FactionId) -> Option<&Faction> {
    world.get::<Faction>(faction.into())
}

/// Every faction in creation order.
pub fn factions(world: &World) -> impl Iterator<Item = &Faction> + '_ {
    world.query::<Faction>().map(|(_, faction)| faction)
}

pub fn find_map_position(world: &World, squad: EntityId) -> Option<&MapPosition> {
    world.get::<MapPosition>(squad)
}

pub fn find_action_state(world: &World, squad: EntityId) -> Option<&ActionState> {
    world.get::<ActionState>(squad)
}

/// Faction owning `squad`, if the squad is on the map.
pub fn faction_of(world: &World, squad: EntityId) -> Option<FactionId> {
    find_map_position(world, squad).map(|record| record.faction_id)
}

pub fn squad_position(world: &World, squad: EntityId) -> Option<Position> {
    find_map_position(world, squad).map(|record| record.position)
}

/// Squads on the map for `faction`, in entity order.
pub fn squads_for_faction(world: &World, faction: FactionId) -> Vec<EntityId> {
    world
        .query::<MapPosition>()
        .filter(|(_, record)| record.faction_id == faction)
        .map(|(squad, _)| squad)
        .collect()
}

/// The single turn record, if a combat was ever started.
pub fn find_turn_state(world: &World) -> Option<(EntityId, &TurnState)> {
    world.query::<TurnState>().next()
}

pub fn find_turn_state_mut(world: &mut World) -> Option<(EntityId, &mut TurnState)> {
    let id = world.first::<TurnState>()?;
    world.get_mut::<TurnState>(id).map(|state| (id, state))
}

// ===== predicates =====

pub fn can_squad_act(world: &World, squad: EntityId) -> bool {
    find_action_state(world, squad).is_some_and(|state| !state.has_acted)
}

pub fn can_squad_move(world: &World, squad: EntityId) -> bool {
    find_action_state(world, squad).is_some_and(|state| state.movement_remaining > 0)
}

/// A squad with no action state is treated as exhausted.
pub fn is_squad_exhausted(world: &World, squad: EntityId) -> bool {
    find_action_state(world, squad).is_none_or(ActionState::is_exhausted)
}

// ===== mutations =====

fn action_state_mut(world: &mut World, squad: EntityId) -> Result<&mut ActionState, CombatError> {
    world
        .get_mut::<ActionState>(squad)
        .ok_or(CombatError::ActionStateNotFound(squad))
}

pub fn mark_squad_as_acted(world: &mut World, squad: EntityId) -> Result<(), CombatError> {
    action_state_mut(world, squad)?.has_acted = true;
    Ok(())
}

pub fn mark_squad_as_moved(world: &mut World, squad: EntityId) -> Result<(), CombatError> {
    action_state_mut(world, squad)?.has_moved = true;
    Ok(())
}

/// Spends movement, flooring at zero. Returns what is left.
pub fn decrement_movement_remaining(
    world: &mut World,
    squad: EntityId,
    amount: u32,
) -> Result<u32, CombatError> {
    let state = action_state_mut(world, squad)?;
    state.movement_remaining = state.movement_remaining.saturating_sub(amount);
    Ok(state.movement_remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_squad(movement: u32) -> (World, EntityId) {
        let mut world = World::new();
        let squad = world.spawn();
        let mut state = ActionState::new(squad);
        state.movement_remaining = movement;
        world.insert(squad, state).unwrap();
        (world, squad)
    }

    #[test]
    fn movement_never_goes_below_zero() {
        let (mut world, squad) = world_with_squad(2);
        assert_eq!(decrement_movement_remaining(&mut world, squad, 1), Ok(1));
        assert_eq!(decrement_movement_remaining(&mut world, squad, 5), Ok(0));
        assert_eq!(decrement_movement_remaining(&mut world, squad, 5), Ok(0));
        assert!(!can_squad_move(&world, squad));
    }

    #[test]
    fn acting_and_moving_flags_drive_exhaustion() {
        let (mut world, squad) = world_with_squad(1);
        assert!(can_squad_act(&world, squad));
        assert!(!is_squad_exhausted(&world, squad));

        mark_squad_as_acted(&mut world, squad).unwrap();
        mark_squad_as_moved(&mut world, squad).unwrap();
        assert!(!can_squad_act(&world, squad));
        assert!(!is_squad_exhausted(&world, squad));

        decrement_movement_remaining(&mut world, squad, 1).unwrap();
        assert!(is_squad_exhausted(&world, squad));
    }

    #[test]
    fn missing_records_are_reported() {
        let mut world = World::new();
        let ghost = world.spawn();
        assert!(!can_squad_act(&world, ghost));
        assert!(is_squad_exhausted(&world, ghost));
        assert_eq!(
            mark_squad_as_acted(&mut world, ghost),
            Err(CombatError::ActionStateNotFound(ghost))
        );
    }
}
