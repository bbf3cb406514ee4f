//! Unit-count damage model used by the scripted skirmish.
//!
//! Each squad fields a number of identical units. An attack deals
//! `damage_per_unit` for every attacking unit; wounds spill over unit by unit
//! and a squad with no units left is destroyed.

use bevy_ecs::component::Component;
use tactics_core::{DamageReport, DamageResolver, EntityId, World};

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SquadStrength {
    pub units: u32,
    pub unit_health: u32,
    /// Damage absorbed by the front unit so far.
    pub wounds: u32,
}

impl SquadStrength {
    pub fn new(units: u32, unit_health: u32) -> Self {
        Self {
            units,
            unit_health: unit_health.max(1),
            wounds: 0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct UnitDamageResolver {
    pub damage_per_unit: u32,
}

impl Default for UnitDamageResolver {
    fn default() -> Self {
        Self { damage_per_unit: 4 }
    }
}

impl DamageResolver for UnitDamageResolver {
    fn resolve(&mut self, world: &mut World, attacker: EntityId, defender: EntityId) -> DamageReport {
        let attackers = world.get::<SquadStrength>(attacker).map_or(1, |s| s.units);
        let total_damage = attackers.saturating_mul(self.damage_per_unit);

        let Some(target) = world.get_mut::<SquadStrength>(defender) else {
            return DamageReport {
                total_damage,
                ..DamageReport::default()
            };
        };

        let pool = target.wounds.saturating_add(total_damage);
        let units_killed = (pool / target.unit_health).min(target.units);
        target.units -= units_killed;
        target.wounds = if target.units == 0 {
            0
        } else {
            pool % target.unit_health
        };

        tracing::debug!(%attacker, %defender, total_damage, units_killed, left = target.units, "damage applied");
        DamageReport {
            total_damage,
            units_killed,
            defender_destroyed: target.units == 0,
        }
    }
}
