/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Movement budget for squads that publish no `MovementSpeed`.
    pub default_movement_speed: u32,

    /// Attack reach for squads that publish no `AttackRange`.
    pub default_attack_range: u32,

    /// Action points each squad's queue is refilled to at the start of its faction turn.
    pub action_points_per_turn: i32,

    /// Seed for the faction turn-order shuffle.
    pub turn_order_seed: u64,
}

impl CombatConfig {
    // ===== compile-time constants =====
    /// Upper bound on queued entries per actor: one per action kind.
    pub const MAX_QUEUED_ACTIONS: usize = 5;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MOVEMENT_SPEED: u32 = 3;
    pub const DEFAULT_ATTACK_RANGE: u32 = 1;
    pub const DEFAULT_ACTION_POINTS: i32 = 10;

    pub fn new() -> Self {
        Self {
            default_movement_speed: Self::DEFAULT_MOVEMENT_SPEED,
            default_attack_range: Self::DEFAULT_ATTACK_RANGE,
            action_points_per_turn: Self::DEFAULT_ACTION_POINTS,
            turn_order_seed: 0,
        }
    }

    #[must_use]
    pub fn with_default_movement_speed(mut self, speed: u32) -> Self {
        self.default_movement_speed = speed;
        self
    }

    #[must_use]
    pub fn with_default_attack_range(mut self, range: u32) -> Self {
        self.default_attack_range = range;
        self
    }

    #[must_use]
    pub fn with_action_points_per_turn(mut self, points: i32) -> Self {
        self.action_points_per_turn = points;
        self
    }

    #[must_use]
    pub fn with_turn_order_seed(mut self, seed: u64) -> Self {
        self.turn_order_seed = seed;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
