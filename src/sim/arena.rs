//! Generational entity storage
//!
//! Backed by a `SlotMap`: slots never move while an entity is alive, so an
//! `EntityId` stays valid across insertions and deletions within a tick.
//! Freed slots are reused with a bumped version, which makes stale handles
//! resolve to `None`.

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use super::entity::Entity;

new_key_type! {
    /// Stable handle for entities backed by a generational slot map.
    pub struct EntityId;
}

/// Entity store with stable handles, iterated in slot order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    entities: SlotMap<EntityId, Entity>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, entity: Entity) -> EntityId {
        self.entities.insert(entity)
    }

    /// Entity behind a handle, including ones marked for deletion this tick
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Handle resolves and the entity has not been flagged for removal
    pub fn is_live(&self, id: EntityId) -> bool {
        self.live(id).is_some()
    }

    /// Live (not flagged) entity behind a handle
    pub fn live(&self, id: EntityId) -> Option<&Entity> {
        self.get(id).filter(|e| !e.marked_for_deletion)
    }

    /// Two disjoint mutable borrows in argument order; `None` if either is
    /// missing or `a == b`
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        self.entities
            .get_disjoint_mut([a, b])
            .map(|[first, second]| (first, second))
    }

    /// All stored entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.entities.iter_mut()
    }

    /// Handles of all stored entities, in slot order
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().collect()
    }

    /// Number of stored entities (flagged ones included until compaction)
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drop every entity flagged for deletion; returns how many were removed
    pub fn compact(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| !e.marked_for_deletion);
        before - self.entities.len()
    }
}
