//! Faction turn state machine.
//!
//! ```text
//! Inactive --initialize_combat--> Active(round 1, first faction)
//! Active   --end_turn-->          Active(next faction)
//! Active   --end_turn (wrap)-->   Active(round + 1) | Resolving
//! Active | Resolving --end_combat--> Inactive
//! ```
//!
//! Termination is checked when the last faction of a round ends its turn: if
//! at most one faction still has squads on the map, the combat moves to
//! `Resolving` instead of starting a new round.

use super::battlefield::Battlefield;
use super::components::{ActionState, CombatPhase, TurnState};
use super::error::{CombatError, TurnError};
use super::queries;
use crate::action::ActionKind;
use crate::rng::{PcgRng, RngOracle, shuffle};
use crate::state::{EntityId, FactionId};

/// What [`TurnManager::end_turn`] advanced to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnAdvance {
    NextFaction(FactionId),
    NewRound { round: u32, faction: FactionId },
    Resolving,
}

/// Outcome of the termination check.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VictoryCheck {
    pub battle_over: bool,
    pub victor: Option<FactionId>,
    pub defeated: Vec<FactionId>,
    pub rounds_completed: u32,
}

/// Drives the combat lifecycle over a [`Battlefield`].
pub struct TurnManager<'a, R: RngOracle = PcgRng> {
    field: &'a mut Battlefield,
    rng: R,
}

impl<'a> TurnManager<'a> {
    pub fn new(field: &'a mut Battlefield) -> Self {
        Self::with_rng(field, PcgRng)
    }
}

impl<'a, R: RngOracle> TurnManager<'a, R> {
    pub fn with_rng(field: &'a mut Battlefield, rng: R) -> Self {
        Self { field, rng }
    }

    // ===== lifecycle =====

    /// Starts a combat between `factions`.
    ///
    /// The visiting order is a seeded shuffle of `factions`. Every squad on
    /// the map for those factions gets an action state, and the first
    /// faction's squads are reset to a full budget.
    pub fn initialize_combat(&mut self, factions: &[FactionId]) -> Result<FactionId, TurnError> {
        if factions.is_empty() {
            return Err(TurnError::NoFactions);
        }
        if let Some(&unknown) = factions
            .iter()
            .find(|f| queries::find_faction(&self.field.world, **f).is_none())
        {
            return Err(CombatError::FactionNotFound(unknown).into());
        }
        let existing =
            queries::find_turn_state(&self.field.world).map(|(id, state)| (id, state.phase));
        match existing {
            Some((_, phase)) if phase != CombatPhase::Inactive => {
                return Err(TurnError::AlreadyActive);
            }
            Some((stale, _)) => {
                self.field.world.despawn(stale);
            }
            None => {}
        }

        let mut turn_order = factions.to_vec();
        shuffle(&mut turn_order, &self.rng, self.field.config.turn_order_seed);

        for &faction in &turn_order {
            for squad in queries::squads_for_faction(&self.field.world, faction) {
                self.field
                    .world
                    .insert(squad, ActionState::new(squad))
                    .map_err(CombatError::from)?;
            }
        }

        let first = turn_order[0];
        let turn_entity = self.field.world.spawn();
        self.field
            .world
            .insert(
                turn_entity,
                TurnState {
                    combat_active: true,
                    phase: CombatPhase::Active,
                    current_round: 1,
                    rounds_completed: 0,
                    turn_order,
                    current_turn_index: 0,
                },
            )
            .map_err(CombatError::from)?;
        self.reset_squad_actions(first)?;

        tracing::info!(first_faction = %first, factions = factions.len(), "combat started");
        Ok(first)
    }

    /// Hands the turn to the next faction in order.
    pub fn end_turn(&mut self) -> Result<TurnAdvance, TurnError> {
        let (next_index, wrapped) = {
            let state = self.active_state()?;
            let next = state.current_turn_index + 1;
            if next >= state.turn_order.len() {
                (0, true)
            } else {
                (next, false)
            }
        };

        if wrapped && self.check_victory().battle_over {
            let state = self.turn_state_mut()?;
            state.rounds_completed += 1;
            state.phase = CombatPhase::Resolving;
            tracing::info!(round = state.current_round, "combat resolving");
            return Ok(TurnAdvance::Resolving);
        }

        let state = self.turn_state_mut()?;
        state.current_turn_index = next_index;
        if wrapped {
            state.rounds_completed += 1;
            state.current_round += 1;
        }
        let round = state.current_round;
        let faction = state.turn_order[next_index];

        self.reset_squad_actions(faction)?;
        tracing::debug!(%faction, round, "turn passed");

        Ok(if wrapped {
            tracing::info!(round, "new round");
            TurnAdvance::NewRound { round, faction }
        } else {
            TurnAdvance::NextFaction(faction)
        })
    }

    /// Ends the current faction's turn once all its squads are exhausted.
    pub fn advance_if_exhausted(&mut self) -> Result<Option<TurnAdvance>, TurnError> {
        let faction = self
            .active_state()?
            .current_faction()
            .ok_or(TurnError::NotActive)?;
        let world = &self.field.world;
        let done = queries::squads_for_faction(world, faction)
            .into_iter()
            .all(|squad| queries::is_squad_exhausted(world, squad));

        if done {
            self.end_turn().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Closes the combat from either `Active` or `Resolving`.
    pub fn end_combat(&mut self) -> Result<VictoryCheck, TurnError> {
        let result = self.check_victory();
        let state = self.turn_state_mut()?;
        if state.phase == CombatPhase::Inactive {
            return Err(TurnError::NotActive);
        }
        state.phase = CombatPhase::Inactive;
        state.combat_active = false;

        tracing::info!(
            victor = ?result.victor,
            rounds = result.rounds_completed,
            "combat ended"
        );
        Ok(result)
    }

    // ===== squad budgets =====

    /// Clears the acted/moved flags of every squad of `faction` and refills
    /// movement from its published speed.
    pub fn reset_squad_actions(&mut self, faction: FactionId) -> Result<(), CombatError> {
        for squad in queries::squads_for_faction(&self.field.world, faction) {
            let speed = self.field.movement_speed(squad);
            let state = self
                .field
                .world
                .get_mut::<ActionState>(squad)
                .ok_or(CombatError::ActionStateNotFound(squad))?;
            state.has_acted = false;
            state.has_moved = false;
            state.movement_remaining = speed;
        }
        Ok(())
    }

    // ===== queries =====

    pub fn phase(&self) -> CombatPhase {
        queries::find_turn_state(&self.field.world).map_or(CombatPhase::Inactive, |(_, s)| s.phase)
    }

    pub fn current_faction(&self) -> Option<FactionId> {
        queries::find_turn_state(&self.field.world).and_then(|(_, state)| state.current_faction())
    }

    /// 1-based round number, 0 outside combat.
    pub fn current_round(&self) -> u32 {
        queries::find_turn_state(&self.field.world)
            .filter(|(_, state)| state.phase != CombatPhase::Inactive)
            .map_or(0, |(_, state)| state.current_round)
    }

    pub fn turn_order(&self) -> Vec<FactionId> {
        queries::find_turn_state(&self.field.world)
            .map(|(_, state)| state.turn_order.clone())
            .unwrap_or_default()
    }

    /// Whether `squad` may be given orders right now: its faction holds the
    /// turn and it has not acted.
    pub fn is_squad_activatable(&self, squad: EntityId) -> bool {
        let world = &self.field.world;
        self.current_faction().is_some()
            && queries::faction_of(world, squad) == self.current_faction()
            && queries::can_squad_act(world, squad)
    }

    /// Gate for queueing an action of `kind` for `squad`.
    pub fn authorize(&self, squad: EntityId, kind: ActionKind) -> Result<(), CombatError> {
        let world = &self.field.world;
        let faction = queries::faction_of(world, squad).ok_or(CombatError::NotOnMap(squad))?;
        if self.current_faction() != Some(faction) {
            return Err(CombatError::NotFactionsTurn { faction });
        }

        match kind {
            ActionKind::Movement if !queries::can_squad_move(world, squad) => {
                Err(CombatError::NoMovementRemaining(squad))
            }
            kind if kind.is_attack() && !queries::can_squad_act(world, squad) => {
                Err(CombatError::AlreadyActed(squad))
            }
            _ => Ok(()),
        }
    }

    /// Termination check: the battle is over once at most one faction in the
    /// turn order still has squads on the map.
    pub fn check_victory(&self) -> VictoryCheck {
        let world = &self.field.world;
        let Some((_, state)) = queries::find_turn_state(world) else {
            return VictoryCheck::default();
        };

        let (standing, defeated): (Vec<_>, Vec<_>) = state
            .turn_order
            .iter()
            .copied()
            .partition(|faction| !queries::squads_for_faction(world, *faction).is_empty());
        let battle_over = standing.len() <= 1;

        VictoryCheck {
            battle_over,
            victor: if battle_over { standing.first().copied() } else { None },
            defeated,
            rounds_completed: state.rounds_completed,
        }
    }

    fn active_state(&self) -> Result<&TurnState, TurnError> {
        let (_, state) = queries::find_turn_state(&self.field.world).ok_or(TurnError::NotActive)?;
        match state.phase {
            CombatPhase::Active => Ok(state),
            CombatPhase::Resolving => Err(TurnError::Resolving),
            CombatPhase::Inactive => Err(TurnError::NotActive),
        }
    }

    fn turn_state_mut(&mut self) -> Result<&mut TurnState, TurnError> {
        queries::find_turn_state_mut(&mut self.field.world)
            .map(|(_, state)| state)
            .ok_or(TurnError::NotActive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::faction::FactionManager;
    use crate::combat::testing::{field, skirmish};
    use crate::state::Position;

    fn three_factions() -> (Battlefield, Vec<FactionId>) {
        let mut field = field();
        let squads: Vec<_> = (0..3).map(|i| field.spawn_squad(format!("S{i}"))).collect();
        let mut manager = FactionManager::new(&mut field);
        let factions: Vec<_> = ["Red", "Blue", "Green"]
            .into_iter()
            .map(|name| manager.create_faction(name, false))
            .collect();
        for (i, (&faction, &squad)) in factions.iter().zip(&squads).enumerate() {
            manager
                .add_squad_to_faction(faction, squad, Position::new(i as i32 * 5, 0))
                .unwrap();
        }
        (field, factions)
    }

    #[test]
    fn combat_needs_factions_and_cannot_start_twice() {
        let (mut field, factions) = three_factions();
        let mut turns = TurnManager::new(&mut field);
        assert_eq!(turns.initialize_combat(&[]), Err(TurnError::NoFactions));
        turns.initialize_combat(&factions).unwrap();
        assert_eq!(turns.initialize_combat(&factions), Err(TurnError::AlreadyActive));
    }

    #[test]
    fn turn_order_is_a_permutation_and_rounds_wrap() {
        let (mut field, factions) = three_factions();
        let mut turns = TurnManager::new(&mut field);
        let first = turns.initialize_combat(&factions).unwrap();

        let order = turns.turn_order();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(sorted, factions);
        assert_eq!(order[0], first);
        assert_eq!(turns.current_round(), 1);

        assert_eq!(turns.end_turn(), Ok(TurnAdvance::NextFaction(order[1])));
        assert_eq!(turns.end_turn(), Ok(TurnAdvance::NextFaction(order[2])));
        assert_eq!(
            turns.end_turn(),
            Ok(TurnAdvance::NewRound {
                round: 2,
                faction: order[0]
            })
        );
        assert_eq!(turns.current_faction(), Some(order[0]));
    }

    #[test]
    fn turn_start_refills_only_that_factions_squads() {
        let (mut field, [a, b]) = skirmish(Position::new(0, 0), Position::new(5, 0));
        field.world.get_mut::<ActionState>(a).unwrap().has_acted = true;
        field.world.get_mut::<ActionState>(b).unwrap().has_acted = true;

        let mut turns = TurnManager::new(&mut field);
        let current = turns.current_faction().unwrap();
        turns.end_turn().unwrap();
        let next = turns.current_faction().unwrap();
        assert_ne!(current, next);

        let (fresh, stale) = if queries::faction_of(&field.world, a) == Some(next) {
            (a, b)
        } else {
            (b, a)
        };
        assert!(!field.world.get::<ActionState>(fresh).unwrap().has_acted);
        assert!(field.world.get::<ActionState>(stale).unwrap().has_acted);
        assert_eq!(field.world.get::<ActionState>(fresh).unwrap().movement_remaining, 3);
    }

    #[test]
    fn only_the_current_faction_is_authorized() {
        let (mut field, [a, b]) = skirmish(Position::new(0, 0), Position::new(5, 0));
        let turns = TurnManager::new(&mut field);
        let (mover, waiter) = if turns.is_squad_activatable(a) { (a, b) } else { (b, a) };

        assert!(turns.authorize(mover, ActionKind::Movement).is_ok());
        assert!(!turns.is_squad_activatable(waiter));
        assert!(matches!(
            turns.authorize(waiter, ActionKind::Attack),
            Err(CombatError::NotFactionsTurn { .. })
        ));
    }

    #[test]
    fn exhausted_faction_hands_over() {
        let (mut field, [a, b]) = skirmish(Position::new(0, 0), Position::new(5, 0));
        let mut turns = TurnManager::new(&mut field);
        assert_eq!(turns.advance_if_exhausted(), Ok(None));

        let current = turns.current_faction().unwrap();
        for squad in [a, b] {
            if queries::faction_of(&field.world, squad) == Some(current) {
                let state = field.world.get_mut::<ActionState>(squad).unwrap();
                state.has_acted = true;
                state.movement_remaining = 0;
            }
        }

        let mut turns = TurnManager::new(&mut field);
        assert!(matches!(
            turns.advance_if_exhausted(),
            Ok(Some(TurnAdvance::NextFaction(_)))
        ));
        assert_ne!(turns.current_faction(), Some(current));
    }

    #[test]
    fn last_faction_standing_resolves_at_round_end() {
        let (mut field, [a, b]) = skirmish(Position::new(0, 0), Position::new(5, 0));
        let loser_faction = queries::faction_of(&field.world, b).unwrap();
        FactionManager::new(&mut field)
            .remove_squad_from_faction(loser_faction, b)
            .unwrap();

        let check = TurnManager::new(&mut field).check_victory();
        assert!(check.battle_over);
        assert_eq!(check.victor, queries::faction_of(&field.world, a));
        assert_eq!(check.defeated, vec![loser_faction]);

        let mut turns = TurnManager::new(&mut field);
        turns.end_turn().unwrap();
        assert_eq!(turns.end_turn(), Ok(TurnAdvance::Resolving));
        assert_eq!(turns.phase(), CombatPhase::Resolving);
        assert_eq!(turns.current_faction(), None);
        assert_eq!(turns.end_turn(), Err(TurnError::Resolving));

        let result = turns.end_combat().unwrap();
        assert_eq!(result.rounds_completed, 1);
        assert_eq!(turns.phase(), CombatPhase::Inactive);
        assert_eq!(turns.end_combat(), Err(TurnError::NotActive));
    }

    #[test]
    fn rounds_count_only_once_every_faction_has_played() {
        let (mut field, _) = skirmish(Position::new(0, 0), Position::new(5, 0));
        let mut turns = TurnManager::new(&mut field);
        assert_eq!(turns.check_victory().rounds_completed, 0);

        turns.end_turn().unwrap();
        assert_eq!(turns.check_victory().rounds_completed, 0);
        assert!(matches!(turns.end_turn(), Ok(TurnAdvance::NewRound { round: 2, .. })));
        assert_eq!(turns.check_victory().rounds_completed, 1);

        turns.end_turn().unwrap();
        let result = turns.end_combat().unwrap();
        assert_eq!(result.rounds_completed, 1);
        assert_eq!(turns.check_victory().rounds_completed, 1);
    }

    #[test]
    fn combat_can_restart_after_it_ends() {
        let (mut field, factions) = three_factions();
        let mut turns = TurnManager::new(&mut field);
        turns.initialize_combat(&factions).unwrap();
        turns.end_combat().unwrap();
        assert_eq!(turns.current_round(), 0);
        assert!(turns.initialize_combat(&factions).is_ok());
        assert_eq!(field.world.count::<TurnState>(), 1);
    }
}
