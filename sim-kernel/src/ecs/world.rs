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
//! World management
//!
//! The World is the central store for entities, their components, and
//! resources. A single reader/writer lock guards both maps: structural
//! writes are exclusive, while any number of systems may read at once.
//! Entity allocation is a lock-free atomic increment.

use crate::ecs::component::{tag_of, Component, ComponentRef, Resource};
use crate::ecs::Entity;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct Storage {
    /// Ordered by id so query results are deterministic
    pub(crate) components: BTreeMap<Entity, Vec<ComponentRef>>,
    pub(crate) resources: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

/// The component/resource store
///
/// All methods take `&self`, so a `World` can be shared by systems running
/// on several threads.
pub struct World {
    next_entity: AtomicU64,
    pub(crate) storage: RwLock<Storage>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        World {
            next_entity: AtomicU64::new(0),
            storage: RwLock::new(Storage::default()),
        }
    }

    /// Allocate a new entity id
    ///
    /// Ids start at 1 and are never reused.
    pub fn create_entity(&self) -> Entity {
        Entity::new(self.next_entity.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Append `component` to the entity's component sequence
    pub fn add_component<C: Component>(&self, entity: Entity, component: C) {
        let component = ComponentRef::new(component);
        self.storage
            .write()
            .components
            .entry(entity)
            .or_default()
            .push(component);
    }

    /// Snapshot of the entity's components in attachment order
    pub fn get_components(&self, entity: Entity) -> Option<Vec<ComponentRef>> {
        self.storage.read().components.get(&entity).cloned()
    }

    /// First component of type `C` attached to `entity`
    pub fn get_component<C: Component>(&self, entity: Entity) -> Option<Arc<C>> {
        let storage = self.storage.read();
        storage
            .components
            .get(&entity)?
            .iter()
            .find_map(ComponentRef::downcast::<C>)
    }

    /// Remove every component of `entity`
    ///
    /// The id itself is not recycled. Returns false if the entity had no
    /// components.
    pub fn destroy_entity(&self, entity: Entity) -> bool {
        let removed = self.storage.write().components.remove(&entity).is_some();
        if removed {
            log::debug!("destroyed {}", entity);
        }
        removed
    }

    /// Insert or replace the resource of this type
    ///
    /// Returns true if a previous value was replaced.
    pub fn register_resource<R: Resource>(&self, resource: R) -> bool {
        let tag = tag_of::<R>();
        self.storage
            .write()
            .resources
            .insert(tag, Arc::new(resource))
            .is_some()
    }

    /// Get the resource of type `R`
    pub fn get_resource<R: Resource>(&self) -> Option<Arc<R>> {
        let resource = self
            .storage
            .read()
            .resources
            .get(&tag_of::<R>())
            .cloned()?;
        resource.downcast::<R>().ok()
    }

    /// Check whether a resource with this tag is registered
    pub fn has_resource(&self, tag: TypeId) -> bool {
        self.storage.read().resources.contains_key(&tag)
    }

    /// Number of entities holding at least one component
    pub fn entity_count(&self) -> usize {
        self.storage.read().components.len()
    }

    /// Number of registered resources
    pub fn resource_count(&self) -> usize {
        self.storage.read().resources.len()
    }

    /// Remove every entity and resource
    ///
    /// The id counter keeps running so old ids stay unique.
    pub fn clear(&self) {
        let mut storage = self.storage.write();
        storage.components.clear();
        storage.resources.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::TypeTag;
    use crate::ecs::QueryFilter;
    use std::sync::atomic::AtomicU32;
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct Position(f32, f32);
    impl Component for Position {}

    #[derive(Debug, PartialEq)]
    struct Name(&'static str);
    impl Component for Name {}

    #[derive(Debug, Default)]
    struct Score(AtomicU32);
    impl Resource for Score {}

    #[derive(Debug, PartialEq)]
    struct GameState(u8);
    impl Resource for GameState {}

    #[test]
    fn test_entity_ids_start_at_one() {
        let world = World::new();
        assert_eq!(world.create_entity().raw(), 1);
        assert_eq!(world.create_entity().raw(), 2);
    }

    #[test]
    fn test_concurrent_entity_creation() {
        let world = World::new();
        let mut ids: Vec<u64> = thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        (0..250)
                            .map(|_| world.create_entity().raw())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect()
        });
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_components_keep_attachment_order() {
        let world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Name("crate"));
        world.add_component(entity, Position(1.0, 2.0));

        let components = world.get_components(entity).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].tag(), tag_of::<Name>());
        assert_eq!(components[1].tag(), tag_of::<Position>());
        assert_eq!(
            *world.get_component::<Position>(entity).unwrap(),
            Position(1.0, 2.0)
        );
    }

    #[test]
    fn test_missing_entity() {
        let world = World::new();
        let entity = world.create_entity();
        assert!(world.get_components(entity).is_none());
        assert!(world.get_component::<Name>(entity).is_none());
    }

    #[test]
    fn test_destroy_entity() {
        let world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Name("gone"));
        assert_eq!(world.entity_count(), 1);

        assert!(world.destroy_entity(entity));
        assert!(!world.destroy_entity(entity));
        assert_eq!(world.entity_count(), 0);
        assert_ne!(world.create_entity(), entity);
    }

    #[test]
    fn test_resources_replace_by_type() {
        let world = World::new();
        assert!(!world.register_resource(GameState(1)));
        assert!(world.register_resource(GameState(2)));
        assert_eq!(*world.get_resource::<GameState>().unwrap(), GameState(2));
        assert_eq!(world.resource_count(), 1);
        assert!(world.has_resource(tag_of::<GameState>()));
        assert!(world.get_resource::<Score>().is_none());
    }

    #[derive(Debug, PartialEq)]
    struct Marker(u8);
    impl Component for Marker {}
    impl Resource for Marker {}

    #[test]
    fn test_identity_agrees_across_lookups() {
        let world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Marker(1));
        world.register_resource(Marker(2));

        let tag = Marker(0).type_tag();
        assert_eq!(tag, tag_of::<Marker>());
        assert!(world.has_resource(tag));
        assert_eq!(*world.get_resource::<Marker>().unwrap(), Marker(2));
        assert_eq!(*world.get_component::<Marker>(entity).unwrap(), Marker(1));
        assert_eq!(world.get_components(entity).unwrap()[0].tag(), tag);
        let filter = QueryFilter::new().with::<Marker>();
        assert_eq!(world.query::<Marker>(&QueryFilter::new()).len(), 1);
        assert_eq!(world.query_entities(&filter), vec![entity]);
    }

    #[test]
    fn test_resource_interior_mutability() {
        let world = World::new();
        world.register_resource(Score::default());

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let score = world.get_resource::<Score>().unwrap();
                    score.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                });
            }
        });

        let score = world.get_resource::<Score>().unwrap();
        assert_eq!(score.0.load(std::sync::atomic::Ordering::SeqCst), 4);
    }

    #[test]
    fn test_clear() {
        let world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Name("a"));
        world.register_resource(GameState(0));
        world.clear();
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.resource_count(), 0);
        assert_eq!(world.create_entity().raw(), 2);
    }
}
