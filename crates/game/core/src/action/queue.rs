//! Per-actor action queue and action-point ledger.
//!
//! # Invariants
//!
//! - At most one entry per [`ActionKind`]; a second submission of a queued
//!   kind is dropped, never replaced.
//! - Every entry has a strictly positive cost.
//! - `total_action_points` is never clamped. Executing more than the actor has
//!   banked leaves it in debt until the turn layer refills it.

use arrayvec::ArrayVec;
use strum::EnumCount;

use super::{Action, ActionKind};
use crate::config::CombatConfig;
use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::state::EntityId;

const _: () = assert!(CombatConfig::MAX_QUEUED_ACTIONS == ActionKind::COUNT);

/// Outcome of a well-formed submission.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    /// Appended at the tail.
    Accepted,
    /// An entry of the same kind was already queued; nothing changed.
    Deduplicated,
}

impl Submission {
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Errors rejected before the queue is touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("{kind} action for {actor} has non-positive cost {cost}")]
    NonPositiveCost {
        actor: EntityId,
        kind: ActionKind,
        cost: i32,
    },
}

impl GameError for QueueError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn context(&self) -> Option<ErrorContext> {
        match self {
            Self::NonPositiveCost { actor, .. } => Some(
                ErrorContext::new()
                    .with_entity(*actor)
                    .with_message("action cost must be positive"),
            ),
        }
    }

    fn error_code(&self) -> &'static str {
        "QUEUE_NON_POSITIVE_COST"
    }
}

/// One pending action with its price and dedup tag.
pub struct QueueEntry<C> {
    action: Action<C>,
    cost: i32,
    kind: ActionKind,
}

impl<C> QueueEntry<C> {
    pub fn action(&self) -> &Action<C> {
        &self.action
    }

    pub fn cost(&self) -> i32 {
        self.cost
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

impl<C> std::fmt::Debug for QueueEntry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueEntry")
            .field("kind", &self.kind)
            .field("cost", &self.cost)
            .field("action", &self.action)
            .finish()
    }
}

/// Ordered pending actions for a single actor plus its banked action points.
pub struct ActionQueue<C> {
    owner: EntityId,
    total_action_points: i32,
    entries: ArrayVec<QueueEntry<C>, { CombatConfig::MAX_QUEUED_ACTIONS }>,
}

impl<C> ActionQueue<C> {
    pub fn new(owner: EntityId, total_action_points: i32) -> Self {
        Self {
            owner,
            total_action_points,
            entries: ArrayVec::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn total_action_points(&self) -> i32 {
        self.total_action_points
    }

    pub fn num_of_actions(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_kind(&self, kind: ActionKind) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }

    pub fn head(&self) -> Option<&QueueEntry<C>> {
        self.entries.first()
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueueEntry<C>> {
        self.entries.iter()
    }

    /// Appends an action unless one of the same kind is already pending.
    ///
    /// A non-positive `cost` is rejected with a fatal [`QueueError`] and the
    /// queue is left untouched.
    pub fn add_action(
        &mut self,
        action: Action<C>,
        cost: i32,
        kind: ActionKind,
    ) -> Result<Submission, QueueError> {
        if cost <= 0 {
            return Err(QueueError::NonPositiveCost {
                actor: self.owner,
                kind,
                cost,
            });
        }

        if self.has_kind(kind) {
            tracing::debug!(owner = %self.owner, %kind, "duplicate action kind dropped");
            return Ok(Submission::Deduplicated);
        }

        // One entry per kind keeps us within capacity.
        self.entries.push(QueueEntry { action, cost, kind });
        Ok(Submission::Accepted)
    }

    /// Charges the head's cost, runs it, and pops it. No-op on an empty queue.
    pub fn execute_action(&mut self, ctx: &mut C) -> Option<ActionKind> {
        let entry = self.entries.pop_at(0)?;
        self.total_action_points -= entry.cost;

        tracing::debug!(
            owner = %self.owner,
            kind = %entry.kind,
            cost = entry.cost,
            remaining = self.total_action_points,
            "executing queued action"
        );

        entry.action.execute(ctx);
        Some(entry.kind)
    }

    /// Discards the head without running it. Idempotent on an empty queue.
    pub fn pop(&mut self) -> Option<ActionKind> {
        self.entries.pop_at(0).map(|entry| entry.kind)
    }

    /// Drops every pending entry; the ledger is kept.
    pub fn reset_queue(&mut self) {
        self.entries.clear();
    }

    /// Overwrites the ledger, e.g. at the start of the owner's turn.
    pub fn reset_action_points(&mut self, points: i32) {
        self.total_action_points = points;
    }

    /// Adds regenerated points to the ledger.
    pub fn restore_action_points(&mut self, amount: i32) {
        self.total_action_points += amount;
    }
}

impl<C> std::fmt::Debug for ActionQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionQueue")
            .field("owner", &self.owner)
            .field("total_action_points", &self.total_action_points)
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Position;

    #[derive(Default)]
    struct Trace(Vec<(EntityId, Position)>);

    fn trace_move(trace: &mut Trace, actor: EntityId, to: Position) {
        trace.0.push((actor, to));
    }

    fn step(x: i32) -> Action<Trace> {
        Action::movement(EntityId(1), Position::new(x, 0), trace_move)
    }

    #[test]
    fn duplicate_kind_is_dropped_not_replaced() {
        let mut queue = ActionQueue::new(EntityId(1), 10);

        assert_eq!(
            queue.add_action(step(1), 3, ActionKind::Movement),
            Ok(Submission::Accepted)
        );
        assert_eq!(
            queue.add_action(step(2), 3, ActionKind::Movement),
            Ok(Submission::Deduplicated)
        );
        assert_eq!(queue.num_of_actions(), 1);

        let mut trace = Trace::default();
        queue.execute_action(&mut trace);
        assert_eq!(trace.0, vec![(EntityId(1), Position::new(1, 0))]);
    }

    #[test]
    fn dedup_holds_for_every_kind() {
        use strum::IntoEnumIterator;

        for kind in ActionKind::iter() {
            let mut queue = ActionQueue::new(EntityId(1), 10);
            let before = queue.num_of_actions();
            let _ = queue.add_action(step(0), 1, kind).unwrap();
            let _ = queue.add_action(step(0), 1, kind).unwrap();
            assert!(queue.num_of_actions() <= before + 1);
        }
    }

    #[test]
    fn non_positive_cost_is_fatal_and_leaves_entries_alone() {
        let mut queue = ActionQueue::new(EntityId(1), 10);
        let _ = queue.add_action(step(0), 2, ActionKind::Attack).unwrap();

        for cost in [0, -1, i32::MIN] {
            let err = queue
                .add_action(step(1), cost, ActionKind::Movement)
                .unwrap_err();
            assert_eq!(err.severity(), ErrorSeverity::Fatal);
            assert_eq!(queue.num_of_actions(), 1);
            assert!(!queue.has_kind(ActionKind::Movement));
        }
    }

    #[test]
    fn execution_charges_cost_without_floor() {
        let mut queue = ActionQueue::new(EntityId(1), 4);
        let _ = queue.add_action(step(1), 3, ActionKind::Movement).unwrap();
        let _ = queue.add_action(step(2), 5, ActionKind::Attack).unwrap();

        let mut trace = Trace::default();
        assert_eq!(queue.execute_action(&mut trace), Some(ActionKind::Movement));
        assert_eq!(queue.total_action_points(), 1);
        assert_eq!(queue.execute_action(&mut trace), Some(ActionKind::Attack));
        assert_eq!(queue.total_action_points(), -4);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_queue_operations_are_noops() {
        let mut queue: ActionQueue<Trace> = ActionQueue::new(EntityId(1), 7);
        let mut trace = Trace::default();

        assert_eq!(queue.execute_action(&mut trace), None);
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.total_action_points(), 7);
    }

    #[test]
    fn pop_discards_head_without_running_it() {
        let mut queue = ActionQueue::new(EntityId(1), 7);
        let _ = queue.add_action(step(1), 2, ActionKind::Movement).unwrap();
        let _ = queue.add_action(step(2), 2, ActionKind::PickupItem).unwrap();

        assert_eq!(queue.pop(), Some(ActionKind::Movement));
        assert_eq!(queue.head().map(QueueEntry::kind), Some(ActionKind::PickupItem));
        assert_eq!(queue.total_action_points(), 7);
    }

    #[test]
    fn popped_kind_can_be_queued_again() {
        let mut queue = ActionQueue::new(EntityId(1), 7);
        let _ = queue.add_action(step(1), 2, ActionKind::Movement).unwrap();
        queue.pop();
        assert_eq!(
            queue.add_action(step(2), 2, ActionKind::Movement),
            Ok(Submission::Accepted)
        );
    }

    #[test]
    fn ledger_resets_and_restores() {
        let mut queue: ActionQueue<Trace> = ActionQueue::new(EntityId(1), -3);
        queue.restore_action_points(5);
        assert_eq!(queue.total_action_points(), 2);
        queue.reset_action_points(10);
        assert_eq!(queue.total_action_points(), 10);
    }
}
