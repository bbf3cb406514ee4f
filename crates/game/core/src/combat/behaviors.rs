//! Behaviors that queued actions run against a [`Battlefield`].
//!
//! A behavior cannot report back through the scheduler, so refusals are
//! logged and the battlefield is left unchanged.

use super::attack::CombatActionSystem;
use super::battlefield::Battlefield;
use super::components::{HeldBy, Item};
use super::error::CombatError;
use super::movement::CombatMovementSystem;
use super::queries;
use crate::action::Action;
use crate::error::GameError;
use crate::state::{EntityId, Position};

pub fn move_squad(field: &mut Battlefield, squad: EntityId, destination: Position) {
    if let Err(err) = CombatMovementSystem::new(field).move_squad(squad, destination) {
        tracing::warn!(%squad, %destination, code = err.error_code(), "move refused: {err}");
    }
}

pub fn attack_squad(field: &mut Battlefield, attacker: EntityId, defender: EntityId) {
    if let Err(err) = CombatActionSystem::new(field).execute_attack(attacker, defender) {
        tracing::warn!(%attacker, %defender, code = err.error_code(), "attack refused: {err}");
    }
}

/// Picks up `item` from an adjacent or shared tile.
pub fn pickup_item(field: &mut Battlefield, squad: EntityId, item: Option<EntityId>, at: Position) {
    if let Err(err) = try_pickup(field, squad, item, at) {
        tracing::warn!(%squad, %at, code = err.error_code(), "pickup refused: {err}");
    }
}

fn try_pickup(
    field: &mut Battlefield,
    squad: EntityId,
    item: Option<EntityId>,
    at: Position,
) -> Result<EntityId, CombatError> {
    let from = queries::squad_position(&field.world, squad).ok_or(CombatError::NotOnMap(squad))?;
    if from.chebyshev_distance(at) > 1 {
        return Err(CombatError::OutOfRange {
            defender: item.unwrap_or(squad),
            distance: from.chebyshev_distance(at),
            range: 1,
        });
    }

    let item = match item {
        Some(item) => item,
        None => field
            .spatial
            .entities_at(at)
            .iter()
            .copied()
            .find(|id| field.world.has::<Item>(*id))
            .ok_or(CombatError::ItemNotFound {
                item: squad,
                position: at,
            })?,
    };
    if !field.world.has::<Item>(item) || !field.spatial.entities_at(at).contains(&item) {
        return Err(CombatError::ItemNotFound { item, position: at });
    }

    field.spatial.remove_entity(item, at)?;
    field.world.insert(item, HeldBy(squad))?;
    tracing::info!(%squad, %item, %at, "item picked up");
    Ok(item)
}

pub fn movement(squad: EntityId, destination: Position) -> Action<Battlefield> {
    Action::movement(squad, destination, move_squad)
}

pub fn attack(attacker: EntityId, defender: EntityId) -> Action<Battlefield> {
    Action::attack(attacker, defender, attack_squad)
}

pub fn pickup(squad: EntityId, item: Option<EntityId>, at: Position) -> Action<Battlefield> {
    Action::player(squad, item, at, pickup_item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::components::ActionState;
    use crate::combat::testing::skirmish;

    #[test]
    fn queued_move_runs_through_the_movement_system() {
        let (mut field, [a, _]) = skirmish(Position::new(0, 0), Position::new(9, 9));
        movement(a, Position::new(1, 1)).execute(&mut field);
        assert_eq!(field.spatial.entity_at(Position::new(1, 1)), Some(a));
    }

    #[test]
    fn refused_attack_leaves_battlefield_untouched() {
        let (mut field, [a, b]) = skirmish(Position::new(0, 0), Position::new(9, 9));
        attack(a, b).execute(&mut field);
        assert!(!field.world.get::<ActionState>(a).unwrap().has_acted);
        assert!(field.drain_combat_log().is_empty());
    }

    #[test]
    fn pickup_finds_item_on_adjacent_tile() {
        let (mut field, [a, _]) = skirmish(Position::new(0, 0), Position::new(9, 9));
        let potion = field.spawn_item("Potion", Position::new(1, 0));
        let decoy = field.spawn_item("Rock", Position::new(3, 0));

        pickup(a, None, Position::new(1, 0)).execute(&mut field);
        assert_eq!(field.world.get::<HeldBy>(potion), Some(&HeldBy(a)));
        assert!(!field.spatial.contains(Position::new(1, 0)));

        pickup(a, Some(decoy), Position::new(3, 0)).execute(&mut field);
        assert!(field.world.get::<HeldBy>(decoy).is_none());
    }
}
