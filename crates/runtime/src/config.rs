//! Session configuration and environment loaders.
use std::env;

use tactics_core::CombatConfig;

/// Action-point price of each kind of queued order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionCosts {
    pub movement: i32,
    pub attack: i32,
    pub pickup: i32,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            movement: 3,
            attack: 5,
            pickup: 1,
        }
    }
}

/// Everything a [`crate::CombatSession`] needs besides its damage resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub combat: CombatConfig,
    pub costs: ActionCosts,
    /// Rounds after which a scripted run gives up.
    pub max_rounds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            costs: ActionCosts::default(),
            max_rounds: 20,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.combat.turn_order_seed = seed;
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TACTICS_SEED` - Turn-order seed (default: random)
    /// - `TACTICS_ACTION_POINTS` - Ledger refill per faction turn (default: 10)
    /// - `TACTICS_DEFAULT_SPEED` - Movement for squads without a speed stat (default: 3)
    /// - `TACTICS_MAX_ROUNDS` - Round limit for scripted runs (default: 20)
    /// - `TACTICS_MOVE_COST` / `TACTICS_ATTACK_COST` - Action-point prices (default: 3 / 5)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.combat.turn_order_seed = read_env::<u64>("TACTICS_SEED").unwrap_or_else(rand::random);

        if let Some(points) = read_env::<i32>("TACTICS_ACTION_POINTS") {
            config.combat.action_points_per_turn = points.max(1);
        }
        if let Some(speed) = read_env::<u32>("TACTICS_DEFAULT_SPEED") {
            config.combat.default_movement_speed = speed;
        }
        if let Some(rounds) = read_env::<u32>("TACTICS_MAX_ROUNDS") {
            config.max_rounds = rounds.max(1);
        }

        // Costs must stay positive or the queue rejects every submission.
        if let Some(cost) = read_env::<i32>("TACTICS_MOVE_COST") {
            config.costs.movement = cost.max(1);
        }
        if let Some(cost) = read_env::<i32>("TACTICS_ATTACK_COST") {
            config.costs.attack = cost.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
