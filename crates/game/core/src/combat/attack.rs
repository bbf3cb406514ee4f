//! Attack validation and execution.
//!
//! Damage numbers come from a [`DamageResolver`] collaborator; this module
//! only decides whether an attack may happen and applies its bookkeeping.

use super::battlefield::Battlefield;
use super::error::CombatError;
use super::faction::remove_squad_from_map;
use super::queries;
use crate::state::EntityId;
use crate::store::World;

/// Damage dealt by one attack, as computed by the resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageReport {
    pub total_damage: u32,
    pub units_killed: u32,
    pub defender_destroyed: bool,
}

/// Stat-driven damage computation supplied by the host.
pub trait DamageResolver {
    fn resolve(&mut self, world: &mut World, attacker: EntityId, defender: EntityId)
    -> DamageReport;
}

/// Resolved attack, published on the battlefield's combat log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatResult {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub distance: u32,
    pub total_damage: u32,
    pub units_killed: u32,
    pub defender_destroyed: bool,
}

/// Validates and performs squad-versus-squad attacks.
pub struct CombatActionSystem<'a> {
    field: &'a mut Battlefield,
}

impl<'a> CombatActionSystem<'a> {
    pub fn new(field: &'a mut Battlefield) -> Self {
        Self { field }
    }

    pub fn squad_attack_range(&self, squad: EntityId) -> u32 {
        self.field.attack_range(squad)
    }

    /// Returns the attack distance if `attacker` may strike `defender` now.
    pub fn can_squad_attack(
        &self,
        attacker: EntityId,
        defender: EntityId,
    ) -> Result<u32, CombatError> {
        let world = &self.field.world;

        if !queries::can_squad_act(world, attacker) {
            return Err(CombatError::AlreadyActed(attacker));
        }

        let from = queries::find_map_position(world, attacker)
            .ok_or(CombatError::NotOnMap(attacker))?;
        let to = queries::find_map_position(world, defender)
            .ok_or(CombatError::NotOnMap(defender))?;

        if from.faction_id == to.faction_id {
            return Err(CombatError::FriendlyTarget { attacker, defender });
        }

        let distance = from.position.chebyshev_distance(to.position);
        let range = self.squad_attack_range(attacker);
        if distance > range {
            return Err(CombatError::OutOfRange {
                defender,
                distance,
                range,
            });
        }

        Ok(distance)
    }

    /// Resolves an attack, marks the attacker as acted and removes a
    /// destroyed defender from the map.
    pub fn execute_attack(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
    ) -> Result<CombatResult, CombatError> {
        let distance = self.can_squad_attack(attacker, defender)?;

        let field = &mut *self.field;
        let report = field.resolver.resolve(&mut field.world, attacker, defender);
        queries::mark_squad_as_acted(&mut field.world, attacker)?;

        if report.defender_destroyed {
            remove_squad_from_map(field, defender)?;
            field.record_casualty(defender);
        }

        let result = CombatResult {
            attacker,
            defender,
            distance,
            total_damage: report.total_damage,
            units_killed: report.units_killed,
            defender_destroyed: report.defender_destroyed,
        };
        tracing::info!(
            %attacker,
            %defender,
            damage = result.total_damage,
            killed = result.units_killed,
            destroyed = result.defender_destroyed,
            "attack resolved"
        );
        field.record_attack(result);
        Ok(result)
    }

    /// Enemy squads within the attacker's range, nearest cells first.
    pub fn squads_in_range(&self, attacker: EntityId) -> Vec<EntityId> {
        let world = &self.field.world;
        let Some(origin) = queries::find_map_position(world, attacker) else {
            return Vec::new();
        };

        let mut targets: Vec<_> = self
            .field
            .spatial
            .entities_in_radius(origin.position, self.field.attack_range(attacker))
            .into_iter()
            .filter_map(|id| {
                let record = queries::find_map_position(world, id)?;
                (record.faction_id != origin.faction_id)
                    .then(|| (origin.position.chebyshev_distance(record.position), id))
            })
            .collect();
        targets.sort_unstable();
        targets.into_iter().map(|(_, id)| id).collect()
    }
}
