//! Greedy order planner for computer-controlled factions.
//!
//! Each squad attacks the nearest enemy in range; otherwise it closes in on
//! the nearest enemy and attacks if the move brought it into range.

use tactics_core::combat::{MapPosition, queries};
use tactics_core::{CombatActionSystem, EntityId, Position, TurnAdvance};

use crate::error::{Result, SessionError};
use crate::session::CombatSession;

/// Tile reached walking from `from` toward `target` for at most `budget`
/// steps, stopping adjacent to the target.
pub fn step_toward(from: Position, target: Position, budget: u32) -> Position {
    let distance = from.chebyshev_distance(target);
    let steps = budget.min(distance.saturating_sub(1)) as i32;
    let axis = |here: i32, there: i32| {
        let delta = there - here;
        delta.signum() * delta.abs().min(steps)
    };
    from.offset(axis(from.x, target.x), axis(from.y, target.y))
}

/// Nearest squad of another faction. Ties prefer the straighter line, then
/// the lower entity id.
pub fn nearest_enemy(session: &CombatSession, squad: EntityId) -> Option<(EntityId, Position)> {
    let world = &session.battlefield().world;
    let here = queries::find_map_position(world, squad)?.position;
    let faction = queries::faction_of(world, squad)?;

    world
        .query::<MapPosition>()
        .filter(|(_, other)| other.faction_id != faction)
        .min_by_key(|(id, other)| {
            let there = other.position;
            let manhattan = here.x.abs_diff(there.x) + here.y.abs_diff(there.y);
            (here.chebyshev_distance(there), manhattan, *id)
        })
        .map(|(id, other)| (id, other.position))
}

/// Result of one planned turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnSummary {
    /// Actions resolved during the turn.
    pub executed: usize,
    /// How the turn ended.
    pub advance: TurnAdvance,
}

/// Plans, resolves and closes one full turn for the current faction.
///
/// The turn ends on its own once every squad is exhausted; otherwise it is
/// closed after the last squad's orders resolve.
pub fn play_turn(session: &mut CombatSession) -> Result<TurnSummary> {
    let faction = session.current_faction().ok_or(SessionError::NotStarted)?;
    let squads = queries::squads_for_faction(&session.battlefield().world, faction);
    let mut executed = 0;
    session.take_handover();

    for squad in squads {
        if session.current_faction() != Some(faction) {
            break;
        }
        // Earlier squads may have destroyed the last enemy.
        if queries::find_map_position(&session.battlefield().world, squad).is_none() {
            continue;
        }

        if !try_attack(session, squad)? {
            if let Some((_, target)) = nearest_enemy(session, squad) {
                let from = queries::squad_position(&session.battlefield().world, squad)
                    .ok_or(tactics_core::CombatError::NotOnMap(squad))?;
                let budget = session.battlefield().movement_speed(squad);
                let destination = step_toward(from, target, budget);
                if destination != from {
                    let _ = session.submit_move(squad, destination)?;
                }
            }
            executed += session.run_until_idle().len();
            try_attack(session, squad)?;
        }
        executed += session.run_until_idle().len();
    }

    let advance = match session.take_handover() {
        Some(advance) => advance,
        None => session.end_faction_turn()?,
    };
    Ok(TurnSummary { executed, advance })
}

fn try_attack(session: &mut CombatSession, squad: EntityId) -> Result<bool> {
    if !queries::can_squad_act(&session.battlefield().world, squad) {
        return Ok(false);
    }
    let Some(&target) = CombatActionSystem::new(session.battlefield_mut())
        .squads_in_range(squad)
        .first()
    else {
        return Ok(false);
    };
    Ok(session.submit_attack(squad, target)?.is_accepted())
}
