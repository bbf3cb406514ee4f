//! Combat session: one battlefield, one action controller, one turn cycle.
//!
//! Orders are validated against the turn state when submitted, queued on the
//! squad's action queue, and resolved one at a time by [`CombatSession::step`].
//! Empty queues are unscheduled before every step and at every turn
//! boundary, so a step always resolves a pending action when one exists.
//! Once every squad of the current faction is exhausted, the step that
//! exhausted them also hands the turn to the next faction.

use tactics_core::combat::{behaviors, queries};
use tactics_core::{
    ActionController, ActionKind, Battlefield, CombatPhase, CombatResult, DamageResolver,
    EntityId, FactionId, FactionManager, Position, QueueHandle, StepOutcome, Submission,
    TurnAdvance, TurnManager, VictoryCheck,
};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::report::{FactionSummary, SessionReport};

pub struct CombatSession {
    config: SessionConfig,
    field: Battlefield,
    controller: ActionController<Battlefield>,
    attacks: Vec<CombatResult>,
    steps_executed: usize,
    handover: Option<TurnAdvance>,
}

impl CombatSession {
    pub fn new(config: SessionConfig, resolver: Box<dyn DamageResolver>) -> Self {
        let field = Battlefield::new(config.combat.clone(), resolver);
        Self {
            config,
            field,
            controller: ActionController::new(),
            attacks: Vec::new(),
            steps_executed: 0,
            handover: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn battlefield(&self) -> &Battlefield {
        &self.field
    }

    /// Direct access for scenario setup (spawning squads, publishing stats).
    pub fn battlefield_mut(&mut self) -> &mut Battlefield {
        &mut self.field
    }

    pub fn factions(&mut self) -> FactionManager<'_> {
        FactionManager::new(&mut self.field)
    }

    pub fn controller(&self) -> &ActionController<Battlefield> {
        &self.controller
    }

    // ===== lifecycle =====

    /// Starts combat between `factions` and gives every participating squad
    /// an action queue. Returns the faction that moves first.
    pub fn start(&mut self, factions: &[FactionId]) -> Result<FactionId> {
        let first = TurnManager::new(&mut self.field).initialize_combat(factions)?;

        for &faction in factions {
            for squad in queries::squads_for_faction(&self.field.world, faction) {
                self.ensure_queue(squad);
            }
        }
        self.refill_faction(first);

        tracing::info!(%first, seed = self.config.combat.turn_order_seed, "session started");
        Ok(first)
    }

    /// Closes the current faction's turn.
    ///
    /// Orders the faction left unexecuted are discarded, empty queues are
    /// unscheduled, and the next faction's ledgers are refilled.
    pub fn end_faction_turn(&mut self) -> Result<TurnAdvance> {
        let faction = self.current_faction().ok_or(SessionError::NotStarted)?;
        self.discard_orders(faction);
        let advance = TurnManager::new(&mut self.field).end_turn()?;
        self.open_turn(advance);
        Ok(advance)
    }

    /// Turn change made by the last automatic handover, if the host has not
    /// collected it yet.
    pub fn take_handover(&mut self) -> Option<TurnAdvance> {
        self.handover.take()
    }

    /// Closes the combat and returns the final termination check.
    pub fn end_combat(&mut self) -> Result<VictoryCheck> {
        let result = TurnManager::new(&mut self.field).end_combat()?;
        self.controller.reset_all();
        self.controller.clean_controller();
        Ok(result)
    }

    // ===== orders =====

    pub fn submit_move(&mut self, squad: EntityId, destination: Position) -> Result<Submission> {
        let cost = self.config.costs.movement;
        self.submit(squad, ActionKind::Movement, cost, |squad| {
            behaviors::movement(squad, destination)
        })
    }

    pub fn submit_attack(&mut self, attacker: EntityId, defender: EntityId) -> Result<Submission> {
        let cost = self.config.costs.attack;
        self.submit(attacker, ActionKind::Attack, cost, |attacker| {
            behaviors::attack(attacker, defender)
        })
    }

    pub fn submit_pickup(
        &mut self,
        squad: EntityId,
        item: Option<EntityId>,
        at: Position,
    ) -> Result<Submission> {
        let cost = self.config.costs.pickup;
        self.submit(squad, ActionKind::PickupItem, cost, |squad| {
            behaviors::pickup(squad, item, at)
        })
    }

    fn submit(
        &mut self,
        squad: EntityId,
        kind: ActionKind,
        cost: i32,
        build: impl FnOnce(EntityId) -> tactics_core::Action<Battlefield>,
    ) -> Result<Submission> {
        TurnManager::new(&mut self.field).authorize(squad, kind)?;
        let handle = self
            .controller
            .find_queue(squad)
            .ok_or(SessionError::NoQueue(squad))?;

        let submission = self.controller.submit(handle, build(squad), cost, kind)?;
        tracing::debug!(%squad, %kind, cost, ?submission, "order submitted");
        Ok(submission)
    }

    // ===== stepping =====

    /// Resolves one queued action. `None` once nothing is pending.
    pub fn step(&mut self) -> Option<StepOutcome> {
        self.controller.clean_controller();
        let outcome = self.controller.execute_first(&mut self.field)?;
        if outcome.executed.is_some() {
            self.steps_executed += 1;
        }

        self.attacks.extend(self.field.drain_combat_log());
        for squad in self.field.drain_casualties() {
            self.controller.remove_queue_for_entity(squad);
            tracing::info!(%squad, "squad destroyed");
        }

        if outcome.executed.is_some() {
            self.hand_over_if_exhausted();
        }
        Some(outcome)
    }

    /// Steps until no scheduled queue has anything pending.
    pub fn run_until_idle(&mut self) -> Vec<StepOutcome> {
        std::iter::from_fn(|| self.step()).collect()
    }

    // ===== queries =====

    pub fn phase(&self) -> CombatPhase {
        queries::find_turn_state(&self.field.world).map_or(CombatPhase::Inactive, |(_, s)| s.phase)
    }

    pub fn current_faction(&self) -> Option<FactionId> {
        queries::find_turn_state(&self.field.world).and_then(|(_, state)| state.current_faction())
    }

    pub fn current_round(&self) -> u32 {
        queries::find_turn_state(&self.field.world)
            .filter(|(_, state)| state.phase != CombatPhase::Inactive)
            .map_or(0, |(_, state)| state.current_round)
    }

    pub fn queue_for(&self, squad: EntityId) -> Option<QueueHandle> {
        self.controller.find_queue(squad)
    }

    /// Action points left in the squad's ledger.
    pub fn action_points(&self, squad: EntityId) -> Option<i32> {
        let handle = self.controller.find_queue(squad)?;
        self.controller
            .queue(handle)
            .map(|queue| queue.total_action_points())
    }

    pub fn check_victory(&mut self) -> VictoryCheck {
        TurnManager::new(&mut self.field).check_victory()
    }

    pub fn attacks(&self) -> &[CombatResult] {
        &self.attacks
    }

    pub fn report(&mut self) -> SessionReport {
        let victory = self.check_victory();
        let factions = queries::factions(&self.field.world)
            .map(|faction| FactionSummary {
                faction_id: faction.faction_id,
                name: faction.name.clone(),
                is_player_controlled: faction.is_player_controlled,
                squads_remaining: queries::squads_for_faction(&self.field.world, faction.faction_id)
                    .len(),
            })
            .collect();

        SessionReport {
            seed: self.config.combat.turn_order_seed,
            phase: self.phase(),
            round: self.current_round(),
            steps_executed: self.steps_executed,
            factions,
            attacks: self.attacks.clone(),
            victory,
        }
    }

    fn ensure_queue(&mut self, squad: EntityId) -> QueueHandle {
        self.controller.find_queue(squad).unwrap_or_else(|| {
            self.controller
                .create_queue(squad, self.config.combat.action_points_per_turn)
        })
    }

    fn hand_over_if_exhausted(&mut self) {
        let Some(faction) = self.current_faction() else {
            return;
        };
        let handed_over = TurnManager::new(&mut self.field).advance_if_exhausted();
        match handed_over {
            Ok(Some(advance)) => {
                tracing::info!(%faction, ?advance, "faction exhausted, turn handed over");
                self.discard_orders(faction);
                self.open_turn(advance);
                self.handover = Some(advance);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%faction, %err, "automatic turn handover failed"),
        }
    }

    /// Drops the orders `faction` left unexecuted and unschedules empty queues.
    fn discard_orders(&mut self, faction: FactionId) {
        for squad in queries::squads_for_faction(&self.field.world, faction) {
            if let Some(queue) = self
                .controller
                .find_queue(squad)
                .and_then(|handle| self.controller.queue_mut(handle))
            {
                if !queue.is_empty() {
                    tracing::debug!(%squad, dropped = queue.num_of_actions(), "discarding unexecuted orders");
                }
                queue.reset_queue();
            }
        }
        self.controller.clean_controller();
    }

    fn open_turn(&mut self, advance: TurnAdvance) {
        match advance {
            TurnAdvance::NextFaction(next) | TurnAdvance::NewRound { faction: next, .. } => {
                self.refill_faction(next);
            }
            TurnAdvance::Resolving => {}
        }
    }

    fn refill_faction(&mut self, faction: FactionId) {
        let points = self.config.combat.action_points_per_turn;
        for squad in queries::squads_for_faction(&self.field.world, faction) {
            let handle = self.ensure_queue(squad);
            self.controller.refill(handle, points);
        }
    }
}

impl std::fmt::Debug for CombatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatSession")
            .field("phase", &self.phase())
            .field("round", &self.current_round())
            .field("controller", &self.controller)
            .field("steps_executed", &self.steps_executed)
            .finish()
    }
}
