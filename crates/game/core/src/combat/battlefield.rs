//! Mutable context shared by every combat service and queued behavior.

use super::attack::{CombatResult, DamageResolver};
use super::components::{AttackRange, Item, MovementSpeed, Squad};
use crate::config::CombatConfig;
use crate::spatial::SpatialIndex;
use crate::state::{EntityId, Position};
use crate::store::{StoreError, World};

/// Record store, spatial index and damage collaborator of one combat.
///
/// Queued actions run with `&mut Battlefield` as their context, so every
/// behavior sees the same world and grid.
pub struct Battlefield {
    pub world: World,
    pub spatial: SpatialIndex,
    pub config: CombatConfig,
    pub(crate) resolver: Box<dyn DamageResolver>,
    combat_log: Vec<CombatResult>,
    casualties: Vec<EntityId>,
}

impl Battlefield {
    pub fn new(config: CombatConfig, resolver: Box<dyn DamageResolver>) -> Self {
        Self {
            world: World::new(),
            spatial: SpatialIndex::new(),
            config,
            resolver,
            combat_log: Vec::new(),
            casualties: Vec::new(),
        }
    }

    /// Spawns a squad that is not yet on the map or in any faction.
    pub fn spawn_squad(&mut self, name: impl Into<String>) -> EntityId {
        let squad = self.world.spawn();
        let inserted = self.world.insert(squad, Squad { name: name.into() });
        debug_assert!(inserted.is_ok(), "freshly spawned squad rejected its record");
        squad
    }

    /// Publishes stat-derived movement speed and attack range for a squad.
    pub fn set_squad_stats(
        &mut self,
        squad: EntityId,
        speed: u32,
        range: u32,
    ) -> Result<(), StoreError> {
        self.world.insert(squad, MovementSpeed(speed))?;
        self.world.insert(squad, AttackRange(range))?;
        Ok(())
    }

    /// Drops an item on the grid.
    pub fn spawn_item(&mut self, name: impl Into<String>, at: Position) -> EntityId {
        let item = self.world.spawn();
        let inserted = self.world.insert(item, Item { name: name.into() });
        debug_assert!(inserted.is_ok(), "freshly spawned item rejected its record");
        self.spatial.add_entity(item, at);
        item
    }

    pub fn movement_speed(&self, squad: EntityId) -> u32 {
        self.world
            .get::<MovementSpeed>(squad)
            .map_or(self.config.default_movement_speed, |speed| speed.0)
    }

    pub fn attack_range(&self, squad: EntityId) -> u32 {
        self.world
            .get::<AttackRange>(squad)
            .map_or(self.config.default_attack_range, |range| range.0)
    }

    pub(crate) fn record_attack(&mut self, result: CombatResult) {
        self.combat_log.push(result);
    }

    pub(crate) fn record_casualty(&mut self, squad: EntityId) {
        self.casualties.push(squad);
    }

    /// Attack results since the last drain, oldest first.
    pub fn drain_combat_log(&mut self) -> Vec<CombatResult> {
        std::mem::take(&mut self.combat_log)
    }

    /// Squads removed from the map since the last drain.
    pub fn drain_casualties(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.casualties)
    }
}

impl std::fmt::Debug for Battlefield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battlefield")
            .field("world", &self.world)
            .field("spatial", &self.spatial)
            .field("config", &self.config)
            .field("pending_log", &self.combat_log.len())
            .field("pending_casualties", &self.casualties.len())
            .finish()
    }
}
