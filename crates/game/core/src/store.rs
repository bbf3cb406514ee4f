//! Entity-component store backed by `bevy_ecs`.
//!
//! The combat core needs three primitives from its store: mint opaque entity
//! ids, attach/detach typed components, and iterate every entity that has a
//! given component. [`World`] wraps a `bevy_ecs` world and keeps its own
//! [`EntityId`] allocator plus an id-ordered map to the backing entities, so
//! queries are deterministic and ids are never reused.

use std::collections::BTreeMap;

use bevy_ecs::change_detection::Mut;
use bevy_ecs::component::Mutable;
use bevy_ecs::entity::Entity;

pub use bevy_ecs::component::Component;

use crate::error::{ErrorSeverity, GameError};
use crate::state::EntityId;

/// Errors raised by the component store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("entity {0} does not exist")]
    EntityNotFound(EntityId),
}

impl GameError for StoreError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EntityNotFound(_) => "STORE_ENTITY_NOT_FOUND",
        }
    }
}

/// Component storage keyed by [`EntityId`].
pub struct World {
    inner: bevy_ecs::world::World,
    next_id: u32,
    entities: BTreeMap<EntityId, Entity>,
}

impl World {
    pub fn new() -> Self {
        Self {
            inner: bevy_ecs::world::World::new(),
            // 0 is never handed out so callers can treat it as "nobody".
            next_id: 1,
            entities: BTreeMap::new(),
        }
    }

    /// Allocates a fresh entity with no components.
    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let entity = self.inner.spawn_empty().id();
        self.entities.insert(id, entity);
        id
    }

    /// Destroys an entity and every component attached to it.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.remove(&id) else {
            return false;
        };
        if let Ok(entity) = self.inner.get_entity_mut(entity) {
            entity.despawn();
        }
        true
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Attaches a component, returning the one it replaced.
    pub fn insert<C: Component>(
        &mut self,
        id: EntityId,
        component: C,
    ) -> Result<Option<C>, StoreError> {
        let entity = self.entity(id).ok_or(StoreError::EntityNotFound(id))?;
        let mut entity = self
            .inner
            .get_entity_mut(entity)
            .map_err(|_| StoreError::EntityNotFound(id))?;

        let previous = entity.take::<C>();
        entity.insert(component);
        Ok(previous)
    }

    /// Detaches a component, returning it if it was present.
    pub fn remove<C: Component>(&mut self, id: EntityId) -> Option<C> {
        let entity = self.entity(id)?;
        self.inner.get_entity_mut(entity).ok()?.take::<C>()
    }

    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.inner.get::<C>(self.entity(id)?)
    }

    pub fn get_mut<C: Component<Mutability = Mutable>>(&mut self, id: EntityId) -> Option<&mut C> {
        let entity = self.entity(id)?;
        self.inner.get_mut::<C>(entity).map(Mut::into_inner)
    }

    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.get::<C>(id).is_some()
    }

    /// Iterates every entity carrying `C`, in id order.
    pub fn query<C: Component>(&self) -> impl Iterator<Item = (EntityId, &C)> + '_ {
        self.entities
            .iter()
            .filter_map(|(id, entity)| self.inner.get::<C>(*entity).map(|c| (*id, c)))
    }

    /// First entity carrying `C`, in id order.
    pub fn first<C: Component>(&self) -> Option<EntityId> {
        self.query::<C>().map(|(id, _)| id).next()
    }

    /// Number of entities carrying `C`.
    pub fn count<C: Component>(&self) -> usize {
        self.query::<C>().count()
    }

    fn entity(&self, id: EntityId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
