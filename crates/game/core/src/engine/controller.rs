//! Action controller: the priority scheduler over every live action queue.
//!
//! Queues live in a generational slot map owned by the controller. Callers
//! hold [`QueueHandle`]s, so identity is the handle rather than a pointer and
//! a removed queue can never be reached through an old handle.
//!
//! Scheduled queues are ordered by banked action points, highest first. On a
//! tie the queue registered more recently goes first.

use slotmap::{SlotMap, new_key_type};

use crate::action::{Action, ActionKind, ActionQueue, QueueError, Submission};
use crate::state::EntityId;

new_key_type! {
    /// Stable reference to a queue owned by an [`ActionController`].
    pub struct QueueHandle;
}

/// What a single [`ActionController::execute_first`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// Queue that held the top priority.
    pub handle: QueueHandle,
    /// Actor that owns that queue.
    pub owner: EntityId,
    /// Kind that ran, or `None` if the top queue had nothing pending.
    pub executed: Option<ActionKind>,
    /// Ledger balance after the step.
    pub remaining_points: i32,
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    handle: QueueHandle,
    /// Monotonic registration stamp; larger means more recent.
    registered: u64,
}

/// Owns all action queues of one combat and decides who acts next.
pub struct ActionController<C> {
    queues: SlotMap<QueueHandle, ActionQueue<C>>,
    schedule: Vec<Scheduled>,
    registrations: u64,
}

impl<C> ActionController<C> {
    pub fn new() -> Self {
        Self {
            queues: SlotMap::with_key(),
            schedule: Vec::new(),
            registrations: 0,
        }
    }

    // ===== arena =====

    /// Allocates a queue for `owner`. It is not scheduled until
    /// [`ActionController::add_action_queue`] is called.
    pub fn create_queue(&mut self, owner: EntityId, action_points: i32) -> QueueHandle {
        self.queues.insert(ActionQueue::new(owner, action_points))
    }

    pub fn queue(&self, handle: QueueHandle) -> Option<&ActionQueue<C>> {
        self.queues.get(handle)
    }

    pub fn queue_mut(&mut self, handle: QueueHandle) -> Option<&mut ActionQueue<C>> {
        self.queues.get_mut(handle)
    }

    pub fn contains(&self, handle: QueueHandle) -> bool {
        self.queues.contains_key(handle)
    }

    /// First live queue owned by `owner`.
    pub fn find_queue(&self, owner: EntityId) -> Option<QueueHandle> {
        self.queues
            .iter()
            .find(|(_, queue)| queue.owner() == owner)
            .map(|(handle, _)| handle)
    }

    /// Frees a queue and unschedules it. Old handles become stale.
    pub fn remove_queue(&mut self, handle: QueueHandle) -> Option<ActionQueue<C>> {
        let queue = self.queues.remove(handle)?;
        self.schedule.retain(|entry| entry.handle != handle);
        Some(queue)
    }

    /// Frees the queue owned by `owner`, e.g. when the squad dies.
    pub fn remove_queue_for_entity(&mut self, owner: EntityId) -> bool {
        match self.find_queue(owner) {
            Some(handle) => self.remove_queue(handle).is_some(),
            None => false,
        }
    }

    // ===== scheduling =====

    /// Schedules a queue unless it is already scheduled, then re-sorts.
    ///
    /// Returns false for stale handles and for queues already scheduled.
    pub fn add_action_queue(&mut self, handle: QueueHandle) -> bool {
        if !self.contains(handle) {
            tracing::warn!(?handle, "ignoring stale queue handle");
            return false;
        }
        if self.is_scheduled(handle) {
            return false;
        }

        self.registrations += 1;
        self.schedule.push(Scheduled {
            handle,
            registered: self.registrations,
        });
        self.reorder();
        true
    }

    pub fn is_scheduled(&self, handle: QueueHandle) -> bool {
        self.schedule.iter().any(|entry| entry.handle == handle)
    }

    /// Adds an action to a queue without touching the schedule.
    ///
    /// Stale handles are ignored and reported as deduplicated.
    pub fn add_action(
        &mut self,
        handle: QueueHandle,
        action: Action<C>,
        cost: i32,
        kind: ActionKind,
    ) -> Result<Submission, QueueError> {
        match self.queue_mut(handle) {
            Some(queue) => queue.add_action(action, cost, kind),
            None => {
                tracing::warn!(?handle, %kind, "action submitted to stale queue handle");
                Ok(Submission::Deduplicated)
            }
        }
    }

    /// [`ActionController::add_action`] followed by scheduling the queue
    /// when the action was accepted.
    pub fn submit(
        &mut self,
        handle: QueueHandle,
        action: Action<C>,
        cost: i32,
        kind: ActionKind,
    ) -> Result<Submission, QueueError> {
        let submission = self.add_action(handle, action, cost, kind)?;
        if submission.is_accepted() {
            self.add_action_queue(handle);
        }
        Ok(submission)
    }

    /// Unschedules every queue with nothing pending, keeping the others in
    /// their current relative order. Returns how many were dropped.
    ///
    /// Queues stay in the slot map, so a later submission re-schedules them
    /// with their ledger intact.
    pub fn clean_controller(&mut self) -> usize {
        let before = self.schedule.len();
        let queues = &self.queues;
        self.schedule.retain(|entry| {
            queues
                .get(entry.handle)
                .is_some_and(|queue| queue.num_of_actions() > 0)
        });
        before - self.schedule.len()
    }

    /// Runs the head action of the highest-priority queue, then re-sorts.
    ///
    /// Returns `None` when nothing is scheduled. If the top queue is empty the
    /// step is a no-op reported with `executed: None`.
    pub fn execute_first(&mut self, ctx: &mut C) -> Option<StepOutcome> {
        let handle = self.schedule.first()?.handle;
        let queue = self.queues.get_mut(handle)?;

        let executed = queue.execute_action(ctx);
        let outcome = StepOutcome {
            handle,
            owner: queue.owner(),
            executed,
            remaining_points: queue.total_action_points(),
        };

        tracing::debug!(
            owner = %outcome.owner,
            executed = ?outcome.executed,
            remaining = outcome.remaining_points,
            "controller step"
        );

        self.reorder();
        Some(outcome)
    }

    /// Scheduled queues in priority order.
    pub fn scheduled(&self) -> impl Iterator<Item = QueueHandle> + '_ {
        self.schedule.iter().map(|entry| entry.handle)
    }

    /// Handle that the next [`ActionController::execute_first`] would use.
    pub fn peek_first(&self) -> Option<QueueHandle> {
        self.schedule.first().map(|entry| entry.handle)
    }

    /// Number of scheduled queues.
    pub fn len(&self) -> usize {
        self.schedule.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    /// Total entries pending across every scheduled queue.
    pub fn pending_actions(&self) -> usize {
        self.schedule
            .iter()
            .filter_map(|entry| self.queues.get(entry.handle))
            .map(ActionQueue::num_of_actions)
            .sum()
    }

    // ===== bulk ledger operations =====

    /// Refills every live queue's ledger, then re-sorts.
    pub fn reset_action_points(&mut self, points: i32) {
        for queue in self.queues.values_mut() {
            queue.reset_action_points(points);
        }
        self.reorder();
    }

    /// Refills one queue's ledger, then re-sorts. False for stale handles.
    pub fn refill(&mut self, handle: QueueHandle, points: i32) -> bool {
        let Some(queue) = self.queues.get_mut(handle) else {
            return false;
        };
        queue.reset_action_points(points);
        self.reorder();
        true
    }

    /// Drops every pending entry of every live queue.
    pub fn reset_all(&mut self) {
        for queue in self.queues.values_mut() {
            queue.reset_queue();
        }
    }

    /// Tears the controller down to its freshly built state.
    pub fn clear(&mut self) {
        self.queues.clear();
        self.schedule.clear();
        self.registrations = 0;
    }

    /// Points descending, then registration stamp descending.
    ///
    /// Ties are broken by when a queue was scheduled, not by its position in
    /// the schedule before the sort, so a tie keeps the same winner across
    /// repeated re-sorts.
    fn reorder(&mut self) {
        let queues = &self.queues;
        let points = |entry: &Scheduled| {
            queues
                .get(entry.handle)
                .map_or(i32::MIN, ActionQueue::total_action_points)
        };
        self.schedule.sort_by(|a, b| {
            points(b)
                .cmp(&points(a))
                .then_with(|| b.registered.cmp(&a.registered))
        });
    }
}

impl<C> Default for ActionController<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for ActionController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order: Vec<_> = self
            .schedule
            .iter()
            .filter_map(|entry| self.queues.get(entry.handle))
            .map(|queue| (queue.owner(), queue.total_action_points(), queue.num_of_actions()))
            .collect();
        f.debug_struct("ActionController")
            .field("scheduled", &order)
            .field("allocated", &self.queues.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Position;

    #[derive(Default)]
    struct Ledger(Vec<(EntityId, &'static str)>);

    fn log_move(ledger: &mut Ledger, actor: EntityId, _to: Position) {
        ledger.0.push((actor, "move"));
    }

    fn log_attack(ledger: &mut Ledger, attacker: EntityId, _defender: EntityId) {
        ledger.0.push((attacker, "attack"));
    }

    fn mv(actor: EntityId) -> Action<Ledger> {
        Action::movement(actor, Position::ORIGIN, log_move)
    }

    fn hit(actor: EntityId) -> Action<Ledger> {
        Action::attack(actor, EntityId(99), log_attack)
    }

    fn scheduled_owners(controller: &ActionController<Ledger>) -> Vec<EntityId> {
        controller
            .scheduled()
            .filter_map(|h| controller.queue(h).map(ActionQueue::owner))
            .collect()
    }

    #[test]
    fn empty_controller_step_is_noop() {
        let mut controller: ActionController<Ledger> = ActionController::new();
        let mut ledger = Ledger::default();
        assert_eq!(controller.execute_first(&mut ledger), None);
        assert_eq!(controller.clean_controller(), 0);
    }

    #[test]
    fn registration_is_deduplicated_by_handle() {
        let mut controller: ActionController<Ledger> = ActionController::new();
        let a = controller.create_queue(EntityId(1), 10);
        let b = controller.create_queue(EntityId(1), 10);

        assert!(controller.add_action_queue(a));
        assert!(!controller.add_action_queue(a));
        assert!(controller.add_action_queue(b));
        assert_eq!(controller.len(), 2);
    }

    #[test]
    fn equal_points_favor_later_registration() {
        let mut controller = ActionController::new();
        let first = controller.create_queue(EntityId(1), 10);
        let second = controller.create_queue(EntityId(2), 10);
        let third = controller.create_queue(EntityId(3), 5);
        for (handle, actor) in [(first, 1), (second, 2), (third, 3)] {
            let _ = controller
                .submit(handle, mv(EntityId(actor)), 1, ActionKind::Movement)
                .unwrap();
        }

        assert_eq!(
            scheduled_owners(&controller),
            vec![EntityId(2), EntityId(1), EntityId(3)]
        );

        let mut ledger = Ledger::default();
        let step = controller.execute_first(&mut ledger).unwrap();
        assert_eq!(step.owner, EntityId(2));
        assert_eq!(ledger.0, vec![(EntityId(2), "move")]);
    }

    #[test]
    fn higher_points_run_first_then_tie_goes_to_later_queue() {
        let mut controller = ActionController::new();
        let a = controller.create_queue(EntityId(1), 20);
        let b = controller.create_queue(EntityId(2), 15);
        let _ = controller.submit(a, mv(EntityId(1)), 5, ActionKind::Movement).unwrap();
        let _ = controller.submit(b, hit(EntityId(2)), 8, ActionKind::Attack).unwrap();

        let mut ledger = Ledger::default();
        let step = controller.execute_first(&mut ledger).unwrap();
        assert_eq!(step.owner, EntityId(1));
        assert_eq!(step.executed, Some(ActionKind::Movement));
        assert_eq!(step.remaining_points, 15);
        assert_eq!(controller.queue(b).unwrap().num_of_actions(), 1);

        let step = controller.execute_first(&mut ledger).unwrap();
        assert_eq!(step.owner, EntityId(2));
        assert_eq!(step.executed, Some(ActionKind::Attack));
        assert_eq!(controller.queue(b).unwrap().total_action_points(), 7);
        assert_eq!(
            ledger.0,
            vec![(EntityId(1), "move"), (EntityId(2), "attack")]
        );
    }

    #[test]
    fn empty_top_queue_stalls_until_cleaned() {
        let mut controller = ActionController::new();
        let idle = controller.create_queue(EntityId(1), 50);
        let busy = controller.create_queue(EntityId(2), 5);
        controller.add_action_queue(idle);
        let _ = controller.submit(busy, mv(EntityId(2)), 1, ActionKind::Movement).unwrap();

        let mut ledger = Ledger::default();
        let step = controller.execute_first(&mut ledger).unwrap();
        assert_eq!(step.owner, EntityId(1));
        assert_eq!(step.executed, None);
        assert!(ledger.0.is_empty());

        assert_eq!(controller.clean_controller(), 1);
        let step = controller.execute_first(&mut ledger).unwrap();
        assert_eq!(step.owner, EntityId(2));
        assert_eq!(step.executed, Some(ActionKind::Movement));
    }

    #[test]
    fn cleanup_drops_only_empty_queues_and_keeps_order() {
        let mut controller = ActionController::new();
        let handles: Vec<_> = (1..=5)
            .map(|i| controller.create_queue(EntityId(i), 100 - i as i32))
            .collect();
        for (i, handle) in handles.iter().enumerate() {
            controller.add_action_queue(*handle);
            if i % 2 == 0 {
                let _ = controller
                    .add_action(*handle, mv(EntityId(i as u32 + 1)), 1, ActionKind::Movement)
                    .unwrap();
            }
        }
        let before: Vec<_> = scheduled_owners(&controller)
            .into_iter()
            .filter(|owner| owner.0 % 2 == 1)
            .collect();

        assert_eq!(controller.clean_controller(), 2);
        assert_eq!(scheduled_owners(&controller), before);
        assert!(controller.contains(handles[1]));
    }

    #[test]
    fn cleaned_queue_is_rescheduled_on_submit_with_ledger_intact() {
        let mut controller = ActionController::new();
        let handle = controller.create_queue(EntityId(1), 10);
        let _ = controller.submit(handle, mv(EntityId(1)), 4, ActionKind::Movement).unwrap();

        let mut ledger = Ledger::default();
        controller.execute_first(&mut ledger);
        controller.clean_controller();
        assert!(controller.is_empty());

        let _ = controller.submit(handle, hit(EntityId(1)), 4, ActionKind::Attack).unwrap();
        assert_eq!(controller.peek_first(), Some(handle));
        assert_eq!(controller.queue(handle).unwrap().total_action_points(), 6);
    }

    #[test]
    fn removed_handles_go_stale() {
        let mut controller: ActionController<Ledger> = ActionController::new();
        let old = controller.create_queue(EntityId(1), 10);
        controller.add_action_queue(old);
        assert!(controller.remove_queue(old).is_some());
        assert!(controller.is_empty());

        let reused = controller.create_queue(EntityId(2), 10);
        assert_ne!(old, reused);
        assert!(controller.queue(old).is_none());
        assert!(!controller.add_action_queue(old));
        assert_eq!(
            controller.add_action(old, mv(EntityId(1)), 1, ActionKind::Movement),
            Ok(Submission::Deduplicated)
        );
    }

    #[test]
    fn remove_by_owner() {
        let mut controller: ActionController<Ledger> = ActionController::new();
        let handle = controller.create_queue(EntityId(7), 10);
        controller.add_action_queue(handle);

        assert_eq!(controller.find_queue(EntityId(7)), Some(handle));
        assert!(controller.remove_queue_for_entity(EntityId(7)));
        assert!(!controller.remove_queue_for_entity(EntityId(7)));
    }

    #[test]
    fn ledger_reset_reorders_schedule() {
        let mut controller: ActionController<Ledger> = ActionController::new();
        let low = controller.create_queue(EntityId(1), 1);
        let high = controller.create_queue(EntityId(2), 9);
        controller.add_action_queue(low);
        controller.add_action_queue(high);
        assert_eq!(controller.peek_first(), Some(high));

        controller.reset_action_points(5);
        // Tie: the later registration (high) stays first.
        assert_eq!(controller.peek_first(), Some(high));
        assert_eq!(controller.queue(low).unwrap().total_action_points(), 5);
    }

    #[test]
    fn single_refill_moves_queue_to_front() {
        let mut controller: ActionController<Ledger> = ActionController::new();
        let low = controller.create_queue(EntityId(1), 1);
        let high = controller.create_queue(EntityId(2), 9);
        controller.add_action_queue(low);
        controller.add_action_queue(high);

        assert!(controller.refill(low, 20));
        assert_eq!(controller.peek_first(), Some(low));
        controller.remove_queue(low);
        assert!(!controller.refill(low, 5));
    }

    #[test]
    fn fatal_cost_propagates_through_submit() {
        let mut controller = ActionController::new();
        let handle = controller.create_queue(EntityId(1), 10);
        assert!(controller.submit(handle, mv(EntityId(1)), 0, ActionKind::Movement).is_err());
        assert!(controller.is_empty());
    }
}
