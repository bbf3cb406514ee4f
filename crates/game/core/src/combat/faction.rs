//! Faction creation and squad membership.

use super::battlefield::Battlefield;
use super::components::{ActionState, Faction, MapPosition, Squad};
use super::error::CombatError;
use super::queries;
use crate::state::{EntityId, FactionId, Position};

/// Creates factions and places squads on the map under them.
pub struct FactionManager<'a> {
    field: &'a mut Battlefield,
}

impl<'a> FactionManager<'a> {
    pub fn new(field: &'a mut Battlefield) -> Self {
        Self { field }
    }

    pub fn create_faction(&mut self, name: impl Into<String>, is_player: bool) -> FactionId {
        let entity = self.field.world.spawn();
        let faction_id = FactionId::from(entity);
        let faction = Faction {
            faction_id,
            name: name.into(),
            mana: Faction::STARTING_MANA,
            max_mana: Faction::STARTING_MANA,
            is_player_controlled: is_player,
        };
        tracing::info!(%faction_id, name = %faction.name, is_player, "faction created");
        let inserted = self.field.world.insert(entity, faction);
        debug_assert!(inserted.is_ok(), "freshly spawned faction entity rejected its record");
        faction_id
    }

    /// Puts `squad` on the map at `position` under `faction`.
    ///
    /// A squad already on the map is relocated and re-assigned. A squad that
    /// joins without an action state gets an empty one; it becomes usable at
    /// its faction's next turn reset.
    pub fn add_squad_to_faction(
        &mut self,
        faction: FactionId,
        squad: EntityId,
        position: Position,
    ) -> Result<(), CombatError> {
        if queries::find_faction(&self.field.world, faction).is_none() {
            return Err(CombatError::FactionNotFound(faction));
        }
        if !self.field.world.has::<Squad>(squad) {
            return Err(CombatError::SquadNotFound(squad));
        }

        match queries::squad_position(&self.field.world, squad) {
            Some(old) => self.field.spatial.move_entity(squad, old, position)?,
            None => self.field.spatial.add_entity(squad, position),
        }

        self.field.world.insert(
            squad,
            MapPosition {
                squad_id: squad,
                faction_id: faction,
                position,
            },
        )?;
        if !self.field.world.has::<ActionState>(squad) {
            self.field.world.insert(squad, ActionState::new(squad))?;
        }

        tracing::debug!(%squad, %faction, %position, "squad placed");
        Ok(())
    }

    /// Takes `squad` off the map. It must belong to `faction`.
    pub fn remove_squad_from_faction(
        &mut self,
        faction: FactionId,
        squad: EntityId,
    ) -> Result<(), CombatError> {
        let record = *queries::find_map_position(&self.field.world, squad)
            .ok_or(CombatError::NotOnMap(squad))?;
        if record.faction_id != faction {
            return Err(CombatError::NotInFaction { squad, faction });
        }
        remove_squad_from_map(self.field, squad)
    }

    pub fn faction_squads(&self, faction: FactionId) -> Vec<EntityId> {
        queries::squads_for_faction(&self.field.world, faction)
    }

    /// `(mana, max_mana)` of a faction.
    pub fn faction_mana(&self, faction: FactionId) -> Option<(u32, u32)> {
        queries::find_faction(&self.field.world, faction).map(|f| (f.mana, f.max_mana))
    }

    pub fn faction_name(&self, faction: FactionId) -> Option<&str> {
        queries::find_faction(&self.field.world, faction).map(|f| f.name.as_str())
    }

    pub fn factions(&self) -> Vec<FactionId> {
        queries::factions(&self.field.world)
            .map(|faction| faction.faction_id)
            .collect()
    }
}

/// Detaches a squad from the grid and drops its map and action records.
///
/// The grid entry goes first; if it is missing nothing is detached.
pub(crate) fn remove_squad_from_map(
    field: &mut Battlefield,
    squad: EntityId,
) -> Result<(), CombatError> {
    let record = *queries::find_map_position(&field.world, squad)
        .ok_or(CombatError::NotOnMap(squad))?;
    field.spatial.remove_entity(squad, record.position)?;
    field.world.remove::<MapPosition>(squad);
    field.world.remove::<ActionState>(squad);
    tracing::debug!(%squad, position = %record.position, "squad removed from map");
    Ok(())
}
