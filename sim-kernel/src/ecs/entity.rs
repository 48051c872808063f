// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Entity management
//!
//! Two notions of identity live here:
//!
//! - [`Entity`]: the store's id. Monotonically allocated, never reused. Its
//!   meaning comes entirely from the components attached to it.
//! - [`EntityHandle`]: a slot in the [`EntityTable`], the game-side registry
//!   that links an entity to its physics body. Slots are reused after
//!   destruction; generations keep stale handles from resolving.

use crate::arena::{Handle, SlotArena};
use crate::physics::{BodyHandle, PhysicsWorld};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for an entity in the component store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u64);

impl Entity {
    /// Create an Entity from a raw u64 value
    pub fn new(id: u64) -> Self {
        Entity(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// A managed game entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    flags: u16,
    body: Option<BodyHandle>,
}

impl EntityRecord {
    /// Game-defined flag bits
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Replace the flag bits
    pub fn set_flags(&mut self, flags: u16) {
        self.flags = flags;
    }

    /// Physics body owned by this entity, if any
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }
}

/// Handle to a slot in the [`EntityTable`]
pub type EntityHandle = Handle<EntityRecord>;

/// Slot-based registry of game entities and their physics bodies
#[derive(Debug, Default)]
pub struct EntityTable {
    entities: SlotArena<EntityRecord>,
    body_to_entity: HashMap<BodyHandle, EntityHandle>,
}

impl EntityTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity in the lowest free slot, optionally owning `body`
    pub fn create(&mut self, body: Option<BodyHandle>, flags: u16) -> EntityHandle {
        let handle = self.entities.insert(EntityRecord { flags, body });
        if let Some(body) = body {
            self.body_to_entity.insert(body, handle);
        }
        log::debug!("created entity {} (body: {:?})", handle, body);
        handle
    }

    /// Get an entity record
    pub fn get(&self, entity: EntityHandle) -> Option<&EntityRecord> {
        self.entities.get(entity)
    }

    /// Get an entity record mutably
    pub fn get_mut(&mut self, entity: EntityHandle) -> Option<&mut EntityRecord> {
        self.entities.get_mut(entity)
    }

    /// Physics body linked to `entity`
    pub fn body_of(&self, entity: EntityHandle) -> Option<BodyHandle> {
        self.get(entity)?.body
    }

    /// Entity that owns `body`
    pub fn entity_of_body(&self, body: BodyHandle) -> Option<EntityHandle> {
        self.body_to_entity
            .get(&body)
            .copied()
            .filter(|entity| self.entities.contains(*entity))
    }

    /// Destroy `entity` and free the physics body it owns
    ///
    /// Returns false if the handle is stale.
    pub fn destroy(&mut self, entity: EntityHandle, physics: &mut PhysicsWorld) -> bool {
        let Some(record) = self.entities.remove(entity) else {
            log::warn!("destroy of unknown entity {}", entity);
            return false;
        };
        if let Some(body) = record.body {
            self.body_to_entity.remove(&body);
            physics.destroy_body(body);
        }
        log::debug!("destroyed entity {}", entity);
        true
    }

    /// Number of slots, live or free
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check whether no slot was ever allocated
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of live entities
    pub fn active_count(&self) -> usize {
        self.entities.active_count()
    }

    /// Iterate over live entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &EntityRecord)> + '_ {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyDesc;
    use glam::Vec2;

    #[test]
    fn test_entity_id() {
        let entity = Entity::new(42);
        assert_eq!(entity.raw(), 42);
        assert_eq!(entity.to_string(), "Entity(42)");
    }

    #[test]
    fn test_create_links_body() {
        let mut physics = PhysicsWorld::default();
        let body = physics
            .create_body(BodyDesc::new(Vec2::ZERO, Vec2::ONE))
            .unwrap();

        let mut table = EntityTable::new();
        let entity = table.create(Some(body), 0b101);
        assert_eq!(table.body_of(entity), Some(body));
        assert_eq!(table.entity_of_body(body), Some(entity));
        assert_eq!(table.get(entity).unwrap().flags(), 0b101);
    }

    #[test]
    fn test_destroy_frees_body() {
        let mut physics = PhysicsWorld::default();
        let body = physics
            .create_body(BodyDesc::new(Vec2::ZERO, Vec2::ONE))
            .unwrap();

        let mut table = EntityTable::new();
        let entity = table.create(Some(body), 0);
        assert!(table.destroy(entity, &mut physics));
        assert!(!physics.is_active(body));
        assert!(table.entity_of_body(body).is_none());
        assert!(!table.destroy(entity, &mut physics));
    }

    #[test]
    fn test_slot_reuse() {
        let mut physics = PhysicsWorld::default();
        let mut table = EntityTable::new();
        let first = table.create(None, 0);
        let second = table.create(None, 0);
        table.destroy(first, &mut physics);

        let reused = table.create(None, 1);
        assert_eq!(reused.index(), first.index());
        assert!(table.get(first).is_none());
        assert_eq!(table.create(None, 0).index(), 2);
        assert_eq!(table.active_count(), 3);
        assert!(table.get(second).is_some());
    }
}
